/// Interactive command loop over a search session
use super::actions;
use super::table::{render_info, render_table, TableOptions};
use super::theme::Theme;
use super::help_text;
use crate::config::Config;
use crate::search::{sort_by_views, BatchReport, PageFetcher, SearchError, SearchSession, VideoRecord};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// One parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Search(String),
    Exact(String),
    Refine(String),
    Filter { key: String, value: String },
    ClearFilters,
    Next,
    /// Sort the displayed list by views
    Sort,
    /// Toggle description lines
    Descriptions,
    Open(usize),
    Play(usize),
    Audio(usize),
    Url(usize),
    Info(usize),
    History,
    Help,
    Quit,
    /// Malformed command, with the expected form
    Usage(&'static str),
}

impl ReplCommand {
    /// Parse a line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "search" | "s" => text_arg(rest, "search <query>", ReplCommand::Search),
            "exact" => text_arg(rest, "exact <query>", ReplCommand::Exact),
            "refine" => text_arg(rest, "refine <terms>", ReplCommand::Refine),
            "filter" => {
                if rest.is_empty() {
                    ReplCommand::Usage("filter <duration|date|sort|hd|exact|channel> [value]")
                } else {
                    let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                    ReplCommand::Filter {
                        key: key.to_string(),
                        value: value.trim().to_string(),
                    }
                }
            }
            "clear" if rest.eq_ignore_ascii_case("filters") => ReplCommand::ClearFilters,
            "next" | "more" if rest.is_empty() => ReplCommand::Next,
            "sort" if rest.is_empty() => ReplCommand::Sort,
            "desc" if rest.is_empty() => ReplCommand::Descriptions,
            "open" | "o" => index_arg(rest, "open <n>", ReplCommand::Open),
            "play" | "p" => index_arg(rest, "play <n>", ReplCommand::Play),
            "audio" | "a" => index_arg(rest, "audio <n>", ReplCommand::Audio),
            "url" | "u" => index_arg(rest, "url <n>", ReplCommand::Url),
            "info" | "i" => index_arg(rest, "info <n>", ReplCommand::Info),
            "history" if rest.is_empty() => ReplCommand::History,
            "help" | "h" | "?" if rest.is_empty() => ReplCommand::Help,
            "quit" | "exit" | "q" if rest.is_empty() => ReplCommand::Quit,
            _ => ReplCommand::Search(line.to_string()),
        };
        Some(command)
    }
}

fn text_arg(rest: &str, usage: &'static str, make: fn(String) -> ReplCommand) -> ReplCommand {
    if rest.is_empty() {
        ReplCommand::Usage(usage)
    } else {
        make(rest.to_string())
    }
}

/// Indices are 1-based as shown in the table
fn index_arg(rest: &str, usage: &'static str, make: fn(usize) -> ReplCommand) -> ReplCommand {
    match rest.parse::<usize>() {
        Ok(n) if n > 0 => make(n),
        _ => ReplCommand::Usage(usage),
    }
}

/// Run the interactive loop on stdin/stdout until `quit` or end of input
pub async fn run_interactive<F: PageFetcher>(
    session: &mut SearchSession<F>,
    config: &Config,
    theme: &Theme,
) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_loop(session, config, theme, stdin, &mut stdout).await
}

/// Command loop over arbitrary input and output
pub async fn run_loop<F, R, W>(
    session: &mut SearchSession<F>,
    config: &Config,
    theme: &Theme,
    input: R,
    out: &mut W,
) -> Result<()>
where
    F: PageFetcher,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut view = TableOptions::from_config(&config.display);
    // Set when `exact <q>` turned on exact matching for a single search
    let mut exact_once = false;
    let mut lines = input.lines();

    loop {
        write!(out, "{} ", theme.accent("yt>"))?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let Some(command) = ReplCommand::parse(&line) else {
            continue;
        };
        debug!("Command: {:?}", command);

        if command == ReplCommand::Quit {
            break;
        }
        execute(command, session, config, theme, &mut view, &mut exact_once, out).await?;
    }

    writeln!(out, "{}", theme.accent("Goodbye!"))?;
    Ok(())
}

async fn execute<F: PageFetcher, W: Write>(
    command: ReplCommand,
    session: &mut SearchSession<F>,
    config: &Config,
    theme: &Theme,
    view: &mut TableOptions,
    exact_once: &mut bool,
    out: &mut W,
) -> Result<()> {
    match command {
        ReplCommand::Search(query) => {
            // A stored `filter exact` stays; a one-off `exact <q>` does not
            let mut filters = session.filters().clone();
            if *exact_once {
                filters.exact = false;
                *exact_once = false;
            }
            let report = session.search(&query, Some(filters)).await;
            show_report(&report, session, theme, view, out)?;
        }
        ReplCommand::Exact(query) => {
            let mut filters = session.filters().clone();
            *exact_once = !filters.exact;
            filters.exact = true;
            let report = session.search(&query, Some(filters)).await;
            show_report(&report, session, theme, view, out)?;
        }
        ReplCommand::Refine(terms) => {
            if session.query().is_empty() {
                writeln!(out, "{}", theme.error("Nothing to refine; search first"))?;
            } else {
                let report = session.refine(&terms).await;
                show_report(&report, session, theme, view, out)?;
            }
        }
        ReplCommand::Filter { key, value } => match session.set_filter(&key, &value).await {
            Ok(report) if key.eq_ignore_ascii_case("exact") => {
                *exact_once = false;
                match report {
                    Some(report) => show_report(&report, session, theme, view, out)?,
                    None => writeln!(out, "Filters for next search: {}", session.filters())?,
                }
            }
            Ok(Some(report)) => show_report(&report, session, theme, view, out)?,
            Ok(None) => writeln!(out, "Filters for next search: {}", session.filters())?,
            Err(e) => writeln!(out, "{}", theme.error(&e.to_string()))?,
        },
        ReplCommand::ClearFilters => {
            session.clear_filters();
            *exact_once = false;
            writeln!(out, "Filters cleared")?;
        }
        ReplCommand::Next => match session.load_more().await {
            Ok(report) => show_report(&report, session, theme, view, out)?,
            Err(e) => writeln!(out, "{}", theme.error(&e.to_string()))?,
        },
        ReplCommand::Sort => {
            view.sorted_by_views = !view.sorted_by_views;
            let state = if view.sorted_by_views { "on" } else { "off" };
            writeln!(out, "Sort by views: {}", state)?;
            show_table(session, theme, view, out)?;
        }
        ReplCommand::Descriptions => {
            view.show_descriptions = !view.show_descriptions;
            let state = if view.show_descriptions { "on" } else { "off" };
            writeln!(out, "Descriptions: {}", state)?;
            show_table(session, theme, view, out)?;
        }
        ReplCommand::Open(n) => {
            if let Some(record) = pick(session, view, n, theme, out)? {
                match actions::open_in_browser(&record.canonical_url).await {
                    Ok(()) => writeln!(out, "Opened {}", record.canonical_url)?,
                    Err(e) => action_failed(&e, theme, out)?,
                }
            }
        }
        ReplCommand::Play(n) => {
            if let Some(record) = pick(session, view, n, theme, out)? {
                play_record(&record, None, config, theme, out).await?;
            }
        }
        ReplCommand::Audio(n) => {
            if let Some(record) = pick(session, view, n, theme, out)? {
                let audio_arg = Some(config.player.audio_only_arg.as_str());
                play_record(&record, audio_arg, config, theme, out).await?;
            }
        }
        ReplCommand::Url(n) => {
            if let Some(record) = pick(session, view, n, theme, out)? {
                writeln!(out, "{}", theme.link(&record.canonical_url, &record.canonical_url))?;
                match actions::copy_to_clipboard(&record.canonical_url).await {
                    Ok(program) => writeln!(out, "Copied to clipboard ({})", program)?,
                    Err(e) => debug!("Clipboard unavailable: {}", e),
                }
            }
        }
        ReplCommand::Info(n) => {
            if let Some(record) = pick(session, view, n, theme, out)? {
                write!(out, "{}", render_info(&record, theme))?;
            }
        }
        ReplCommand::History => show_history(session, theme, out)?,
        ReplCommand::Help => write!(out, "{}", help_text(theme))?,
        ReplCommand::Usage(usage) => writeln!(out, "{} {}", theme.error("Usage:"), usage)?,
        ReplCommand::Quit => {}
    }
    Ok(())
}

fn show_report<F: PageFetcher, W: Write>(
    report: &BatchReport,
    session: &SearchSession<F>,
    theme: &Theme,
    view: &TableOptions,
    out: &mut W,
) -> Result<()> {
    if let Some(error) = &report.error {
        let message = match error {
            SearchError::Parse(e) => format!("Could not parse response: {}", e),
            other => other.to_string(),
        };
        writeln!(out, "{}", theme.error(&message))?;
        return Ok(());
    }

    if !report.filters.is_empty() {
        writeln!(out, "{} {}", theme.dim("Filters:"), report.filters)?;
    }
    if report.added == 0 {
        // earlier batches are still on screen after an empty `next`
        let message = if report.total > 0 { "No more results" } else { "No results found" };
        writeln!(out, "{}", theme.error(message))?;
        return Ok(());
    }
    if session.offset() > 0 {
        writeln!(out, "Loaded {} more ({} total)", report.added, report.total)?;
    }
    show_table(session, theme, view, out)
}

fn show_table<F: PageFetcher, W: Write>(
    session: &SearchSession<F>,
    theme: &Theme,
    view: &TableOptions,
    out: &mut W,
) -> Result<()> {
    write!(out, "{}", render_table(&displayed(session, view), theme, view))?;
    Ok(())
}

/// Records in the order currently on screen
fn displayed<F: PageFetcher>(session: &SearchSession<F>, view: &TableOptions) -> Vec<VideoRecord> {
    if view.sorted_by_views {
        sort_by_views(session.results())
    } else {
        session.results().to_vec()
    }
}

fn pick<F: PageFetcher, W: Write>(
    session: &SearchSession<F>,
    view: &TableOptions,
    n: usize,
    theme: &Theme,
    out: &mut W,
) -> Result<Option<VideoRecord>> {
    let records = displayed(session, view);
    match records.get(n - 1) {
        Some(record) => Ok(Some(record.clone())),
        None => {
            let message = if records.is_empty() {
                "No results to choose from".to_string()
            } else {
                format!("Pick a number between 1 and {}", records.len())
            };
            writeln!(out, "{}", theme.error(&message))?;
            Ok(None)
        }
    }
}

fn show_history<F: PageFetcher, W: Write>(session: &SearchSession<F>, theme: &Theme, out: &mut W) -> Result<()> {
    if session.history().is_empty() {
        writeln!(out, "No searches yet")?;
        return Ok(());
    }

    for (idx, entry) in session.history().iter().enumerate() {
        let outcome = match &entry.error {
            Some(error) => theme.error(error),
            None => format!("{} results", entry.result_count),
        };
        writeln!(
            out,
            "{:>3}. {} [{}] {} ({})",
            idx + 1,
            theme.bold(&entry.query),
            entry.filters,
            outcome,
            entry.searched_at.format("%H:%M:%S")
        )?;
    }
    Ok(())
}

async fn play_record<W: Write>(
    record: &VideoRecord,
    audio_arg: Option<&str>,
    config: &Config,
    theme: &Theme,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Playing: {}", record.title)?;
    out.flush()?;
    if let Err(e) = actions::play(&record.canonical_url, &config.player.players, audio_arg).await {
        action_failed(&e, theme, out)?;
    }
    Ok(())
}

fn action_failed<W: Write>(error: &anyhow::Error, theme: &Theme, out: &mut W) -> Result<()> {
    warn!("{:#}", error);
    writeln!(out, "{}", theme.error(&format!("{:#}", error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_and_comments() {
        assert_eq!(ReplCommand::parse(""), None);
        assert_eq!(ReplCommand::parse("   "), None);
        assert_eq!(ReplCommand::parse("# note"), None);
    }

    #[test]
    fn test_parse_search_forms() {
        assert_eq!(ReplCommand::parse("s rust async"), Some(ReplCommand::Search("rust async".into())));
        assert_eq!(ReplCommand::parse("search  lofi "), Some(ReplCommand::Search("lofi".into())));
        assert_eq!(ReplCommand::parse("exact the quick fox"), Some(ReplCommand::Exact("the quick fox".into())));
        assert_eq!(ReplCommand::parse("refine 2024"), Some(ReplCommand::Refine("2024".into())));
        assert!(matches!(ReplCommand::parse("search"), Some(ReplCommand::Usage(_))));
    }

    #[test]
    fn test_free_text_is_search() {
        assert_eq!(
            ReplCommand::parse("best guitar solos"),
            Some(ReplCommand::Search("best guitar solos".into()))
        );
        // keyword followed by more words is a plain query
        assert_eq!(ReplCommand::parse("next level"), Some(ReplCommand::Search("next level".into())));
        assert_eq!(ReplCommand::parse("clear skies"), Some(ReplCommand::Search("clear skies".into())));
    }

    #[test]
    fn test_parse_indices() {
        assert_eq!(ReplCommand::parse("open 3"), Some(ReplCommand::Open(3)));
        assert_eq!(ReplCommand::parse("p 1"), Some(ReplCommand::Play(1)));
        assert_eq!(ReplCommand::parse("a 2"), Some(ReplCommand::Audio(2)));
        assert_eq!(ReplCommand::parse("u 10"), Some(ReplCommand::Url(10)));
        assert_eq!(ReplCommand::parse("info 4"), Some(ReplCommand::Info(4)));
        assert!(matches!(ReplCommand::parse("open 0"), Some(ReplCommand::Usage(_))));
        assert!(matches!(ReplCommand::parse("play x"), Some(ReplCommand::Usage(_))));
    }

    #[test]
    fn test_parse_filters_and_toggles() {
        assert_eq!(
            ReplCommand::parse("filter duration long"),
            Some(ReplCommand::Filter {
                key: "duration".into(),
                value: "long".into()
            })
        );
        assert_eq!(
            ReplCommand::parse("filter hd"),
            Some(ReplCommand::Filter {
                key: "hd".into(),
                value: String::new()
            })
        );
        assert_eq!(
            ReplCommand::parse("filter channel Some Channel"),
            Some(ReplCommand::Filter {
                key: "channel".into(),
                value: "Some Channel".into()
            })
        );
        assert_eq!(ReplCommand::parse("clear filters"), Some(ReplCommand::ClearFilters));
        assert_eq!(ReplCommand::parse("next"), Some(ReplCommand::Next));
        assert_eq!(ReplCommand::parse("sort"), Some(ReplCommand::Sort));
        assert_eq!(ReplCommand::parse("desc"), Some(ReplCommand::Descriptions));
        assert_eq!(ReplCommand::parse("history"), Some(ReplCommand::History));
        assert_eq!(ReplCommand::parse("help"), Some(ReplCommand::Help));
        assert_eq!(ReplCommand::parse("QUIT"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("q"), Some(ReplCommand::Quit));
    }
}
