/// yt-search - terminal video search
///
/// Scrapes the public search-results page, normalizes each entry into a
/// `VideoRecord` and drives an interactive session over the results.

pub mod config;
pub mod search;
pub mod terminal;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::search::{
    normalize_view_count, sort_by_views, BatchReport, PageFetcher, ParseError, QueryIntentAnalyzer,
    ResultExtractor, SearchError, SearchFilters, SearchIntent, SearchSession, SessionOptions,
    VideoRecord, YouTubeClient,
};
pub use crate::terminal::Theme;
