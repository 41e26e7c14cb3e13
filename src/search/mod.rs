/// Search module: scraping, normalization and session orchestration
///
/// This module turns a raw search-results page into an ordered list of video
/// records, and keeps the per-session result history on top of it.

pub mod views;
pub mod extractor;
pub mod intent;
pub mod request;
pub mod client;
pub mod session;

// Re-export main types
pub use views::normalize_view_count;
pub use extractor::{ParseError, ResultExtractor};
pub use intent::{
    ContentType, DurationClass, QueryIntentAnalyzer, SearchFilters, SearchIntent, SortOrder,
    UploadRecency,
};
pub use request::build_search_url;
pub use client::{PageFetcher, YouTubeClient};
pub use session::{BatchReport, HistoryEntry, SearchSession, SessionOptions, SessionState};

use serde::Serialize;

/// Title and channel placeholder when the page does not provide one
pub const UNKNOWN: &str = "Unknown";

/// A single normalized search result. Built only through [`VideoRecord::new`],
/// which keeps `view_count` in step with `view_count_text`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoRecord {
    /// Opaque video identifier (empty when the entry had none)
    pub id: String,
    /// Display title
    pub title: String,
    /// Human duration such as "12:34", empty for live content
    pub duration_text: String,
    /// Normalized view count, always `normalize_view_count(&view_count_text)`
    pub view_count: u64,
    /// Original view count text kept for display
    pub view_count_text: String,
    /// Channel display name
    pub channel_name: String,
    /// Whether the channel carries a verification badge
    pub channel_verified: bool,
    /// Relative upload age such as "3 weeks ago"
    pub age_text: String,
    /// Short description snippet
    pub description: String,
    /// Live stream showing a "watching" count instead of views
    pub is_live: bool,
    /// Short-form URL (`youtu.be/<id>`)
    pub url: String,
    /// Fully-qualified playback URL
    pub canonical_url: String,
}

impl VideoRecord {
    /// Build a record, deriving the view count and URLs from the raw fields
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        title: String,
        duration_text: String,
        view_count_text: String,
        channel_name: String,
        channel_verified: bool,
        age_text: String,
        description: String,
    ) -> Self {
        let view_count = normalize_view_count(&view_count_text);
        let is_live = view_count_text.contains("watching");
        let url = short_url(&id);
        let canonical_url = canonical_url(&id);

        Self {
            id,
            title,
            duration_text,
            view_count,
            view_count_text,
            channel_name,
            channel_verified,
            age_text,
            description,
            is_live,
            url,
            canonical_url,
        }
    }
}

/// Short playback URL for a video id
pub fn short_url(id: &str) -> String {
    format!("youtu.be/{}", id)
}

/// Fully-qualified playback URL for a video id
pub fn canonical_url(id: &str) -> String {
    format!("https://youtube.com/watch?v={}", id)
}

/// Stable descending sort on view count; equal counts keep document order.
pub fn sort_by_views(records: &[VideoRecord]) -> Vec<VideoRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    sorted
}

/// Errors surfaced by a search. None of them is fatal to the session.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("No active search")]
    NoActiveSearch,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, views: &str) -> VideoRecord {
        VideoRecord::new(
            id.to_string(),
            format!("Video {}", id),
            "1:00".to_string(),
            views.to_string(),
            "Channel".to_string(),
            false,
            "1 day ago".to_string(),
            String::new(),
        )
    }

    #[test]
    fn test_record_derives_urls_and_count() {
        let video = record("dQw4w9WgXcQ", "1.5B views");
        assert_eq!(video.url, "youtu.be/dQw4w9WgXcQ");
        assert_eq!(video.canonical_url, "https://youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(video.view_count, 1_500_000_000);
        assert!(!video.is_live);
    }

    #[test]
    fn test_record_json_keeps_count_and_text_together() {
        let json = serde_json::to_value(record("abc", "2.1M views")).unwrap();
        assert_eq!(json["view_count"], 2_100_000);
        assert_eq!(json["view_count_text"], "2.1M views");
        assert_eq!(json["url"], "youtu.be/abc");
    }

    #[test]
    fn test_live_record() {
        let video = record("live1", "12K watching");
        assert!(video.is_live);
        assert_eq!(video.view_count, 12_000);
    }

    #[test]
    fn test_sort_by_views_is_stable() {
        let records = vec![
            record("a", "100 views"),
            record("b", "500 views"),
            record("c", "500 views"),
            record("d", "10 views"),
        ];

        let sorted = sort_by_views(&records);
        let ids: Vec<&str> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);

        // Input is untouched
        assert_eq!(records[0].id, "a");
    }

    #[test]
    fn test_sort_empty() {
        assert!(sort_by_views(&[]).is_empty());
    }
}
