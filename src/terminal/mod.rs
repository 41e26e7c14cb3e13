/// Terminal front end: theme, result table, external actions and the REPL
///
/// Everything here is presentation over a [`crate::search::SearchSession`];
/// no module in this tree changes what a search returns.

pub mod theme;
pub mod table;
pub mod actions;
pub mod repl;

pub use theme::Theme;
pub use table::{render_info, render_table, TableOptions};
pub use repl::{run_interactive, run_loop, ReplCommand};

const BANNER: &str = r"
 __   _______   ____                      _
 \ \ / /_   _| / ___|  ___  __ _ _ __ ___| |__
  \ V /  | |   \___ \ / _ \/ _` | '__/ __| '_ \
   | |   | |    ___) |  __/ (_| | | | (__| | | |
   |_|   |_|   |____/ \___|\__,_|_|  \___|_| |_|
";

/// ASCII banner shown when the REPL starts
pub fn banner(theme: &Theme) -> String {
    let mut out = theme.accent(BANNER);
    out.push('\n');
    out.push_str(&theme.dim(&format!(
        "  v{}  |  type 'help' for commands, 'quit' to leave",
        env!("CARGO_PKG_VERSION")
    )));
    out.push('\n');
    out
}

pub fn help_text(theme: &Theme) -> String {
    let rows = [
        ("search <query>, s <query>", "Run a new search (any other text works too)"),
        ("exact <query>", "Search for the exact phrase"),
        ("refine <terms>", "Add terms to the current query"),
        ("filter duration short|medium|long", "Filter by length"),
        ("filter date today|week|month|year", "Filter by upload date"),
        ("filter sort relevance|views|date|rating", "Change result order"),
        ("filter hd [on|off]", "Only HD videos"),
        ("filter channel <name>", "Restrict to a channel"),
        ("clear filters", "Drop all filters"),
        ("next", "Load more results"),
        ("sort", "Toggle sorting by view count"),
        ("desc", "Toggle description lines"),
        ("open <n>, o <n>", "Open in browser"),
        ("play <n>, p <n>", "Play with mpv or vlc"),
        ("audio <n>, a <n>", "Play audio only"),
        ("url <n>, u <n>", "Show and copy the URL"),
        ("info <n>, i <n>", "Show video details"),
        ("history", "List searches in this session"),
        ("help", "Show this help"),
        ("quit, exit, q", "Leave"),
    ];

    let mut out = format!("{}\n", theme.header("Commands:"));
    for (usage, description) in rows {
        out.push_str(&format!("  {} {}\n", theme.accent(&format!("{:<42}", usage)), description));
    }
    out.push_str(&theme.dim("  Smart filters: 'tutorial', 'latest', 'best', 'short', 'full' and a year bias the search.\n"));
    out
}
