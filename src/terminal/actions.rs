/// External programs: browser, media players, clipboard
use anyhow::{anyhow, Result};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Clipboard programs tried in order
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("clip", &[]),
];

/// Program and arguments that open `url` in the default browser
pub fn browser_command(url: &str) -> (String, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("open".to_string(), vec![url.to_string()])
    } else if cfg!(target_os = "windows") {
        (
            "cmd".to_string(),
            vec!["/C".to_string(), "start".to_string(), String::new(), url.to_string()],
        )
    } else {
        ("xdg-open".to_string(), vec![url.to_string()])
    }
}

/// Program arguments for one player. Only mpv understands the audio-only flag.
pub fn player_args(player: &str, url: &str, audio_only_arg: Option<&str>) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(arg) = audio_only_arg {
        if player == "mpv" {
            args.push(arg.to_string());
        }
    }
    args.push(url.to_string());
    args
}

pub async fn open_in_browser(url: &str) -> Result<()> {
    let (program, args) = browser_command(url);
    debug!("Opening {} with {}", url, program);

    let status = Command::new(&program)
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| anyhow!("Failed to launch {}: {}", program, e))?;

    if !status.success() {
        return Err(anyhow!("{} exited with {}", program, status));
    }
    Ok(())
}

/// Play with the first installed player; returns the player used
pub async fn play(url: &str, players: &[String], audio_only_arg: Option<&str>) -> Result<String> {
    for player in players {
        let args = player_args(player, url, audio_only_arg);
        info!("Playing {} with {}", url, player);

        match Command::new(player).args(&args).status().await {
            Ok(status) if status.success() => return Ok(player.clone()),
            Ok(status) => return Err(anyhow!("{} exited with {}", player, status)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} not installed", player);
                continue;
            }
            Err(e) => return Err(anyhow!("Failed to launch {}: {}", player, e)),
        }
    }

    Err(anyhow!("No media player found (tried: {})", players.join(", ")))
}

/// Copy text with the first available clipboard program; returns the program used
pub async fn copy_to_clipboard(text: &str) -> Result<&'static str> {
    for (program, args) in CLIPBOARD_COMMANDS {
        let mut child = match Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(anyhow!("Failed to launch {}: {}", program, e)),
        };

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }

        let status = child.wait().await?;
        if status.success() {
            return Ok(*program);
        }
        debug!("{} exited with {}", program, status);
    }

    Err(anyhow!("No clipboard program available"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_command_passes_url() {
        let (program, args) = browser_command("https://youtube.com/watch?v=abc");
        assert!(!program.is_empty());
        assert_eq!(args.last().map(String::as_str), Some("https://youtube.com/watch?v=abc"));
    }

    #[test]
    fn test_audio_flag_only_for_mpv() {
        let url = "https://youtube.com/watch?v=abc";
        assert_eq!(player_args("mpv", url, Some("--no-video")), vec!["--no-video", url]);
        assert_eq!(player_args("vlc", url, Some("--no-video")), vec![url]);
        assert_eq!(player_args("mpv", url, None), vec![url]);
    }

    #[tokio::test]
    async fn test_play_without_players() {
        let players = vec!["definitely-not-a-player-binary".to_string()];
        let err = play("https://youtube.com/watch?v=abc", &players, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No media player found"));
    }
}
