use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use yt_search::config::Config;
use yt_search::search::{sort_by_views, SearchError, SearchSession, YouTubeClient};
use yt_search::terminal::{self, render_table, TableOptions, Theme};

#[derive(Parser)]
#[command(name = "yt-search")]
#[command(version)]
#[command(about = "Search videos from the terminal")]
struct Cli {
    /// Search query; starts the interactive prompt when empty
    query: Vec<String>,

    /// Maximum results per batch
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Sort results by view count
    #[arg(short = 's', long)]
    sort_by_views: bool,

    /// Do not infer filters from the query
    #[arg(long)]
    no_smart: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors and hyperlinks
    #[arg(long)]
    no_color: bool,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Interactive mode, running the query first if one is given
    #[arg(short, long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    apply_cli(&mut config, &cli);
    if let Some(handle) = &log_filter {
        handle.reload(EnvFilter::new(log_directive(&config.logging.level, cli.verbose)))?;
    }
    config.validate()?;
    debug!("{}", config.summary());

    if !config.display.color {
        colored::control::set_override(false);
    }
    let theme = Theme::from_config(&config.display);

    let client = YouTubeClient::with_headers(
        config.search.timeout_seconds,
        &config.search.user_agent,
        &config.search.accept_language,
    )
    .context("Failed to build HTTP client")?;
    let mut session = SearchSession::new(client, config.session_options());
    session.set_filters(config.search.default_filters.clone());

    let query = cli.query.join(" ");
    let query = query.trim();

    if query.is_empty() || cli.interactive {
        if config.display.show_banner {
            print!("{}", terminal::banner(&theme));
        }
        if !query.is_empty() {
            let report = session.search(query, Some(session.filters().clone())).await;
            info!("Initial search returned {} results", report.added);
            print_direct(&session, &config, &theme, report.error.as_ref(), false)?;
        }
        return terminal::run_interactive(&mut session, &config, &theme).await;
    }

    let report = session.search(query, Some(session.filters().clone())).await;
    print_direct(&session, &config, &theme, report.error.as_ref(), cli.json)?;

    if report.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

/// Command-line flags override file and environment settings
fn apply_cli(config: &mut Config, cli: &Cli) {
    if let Some(max_results) = cli.max_results {
        config.search.max_results = max_results;
    }
    if cli.sort_by_views {
        config.display.sort_by_views = true;
    }
    if cli.no_smart {
        config.search.smart_filters = false;
    }
    if cli.no_color || cli.json {
        config.display.color = false;
    }
}

/// Filter directive when RUST_LOG is not set
fn log_directive(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("yt_search={},warn", level)
}

/// Install the subscriber before the config is read so loading problems are reported.
///
/// RUST_LOG wins and is never replaced. Otherwise logging starts at
/// YT_SEARCH_LOG_LEVEL (or warn) and the returned handle applies the
/// configured level once it is known.
fn init_logging(verbose: bool) -> Option<reload::Handle<EnvFilter, Registry>> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let startup_level = std::env::var("YT_SEARCH_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    let (filter, handle) = reload::Layer::new(EnvFilter::new(log_directive(&startup_level, verbose)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    Some(handle)
}

fn print_direct<F: yt_search::PageFetcher>(
    session: &SearchSession<F>,
    config: &Config,
    theme: &Theme,
    error: Option<&SearchError>,
    json: bool,
) -> Result<()> {
    if let Some(error) = error {
        match error {
            SearchError::Parse(e) => eprintln!("{}", theme.error(&format!("Could not parse response: {}", e))),
            other => eprintln!("{}", theme.error(&other.to_string())),
        }
        return Ok(());
    }

    let records = if config.display.sort_by_views {
        sort_by_views(session.results())
    } else {
        session.results().to_vec()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print!("{}", render_table(&records, theme, &TableOptions::from_config(&config.display)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directive() {
        assert_eq!(log_directive("warn", false), "yt_search=warn,warn");
        assert_eq!(log_directive("info", false), "yt_search=info,warn");
        assert_eq!(log_directive("warn", true), "yt_search=debug,warn");
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["yt-search", "-n", "5", "--no-smart", "--json", "rust"]);
        let mut config = Config::default();
        apply_cli(&mut config, &cli);

        assert_eq!(config.search.max_results, 5);
        assert!(!config.search.smart_filters);
        assert!(!config.display.color);
        assert_eq!(cli.query, vec!["rust"]);
    }
}
