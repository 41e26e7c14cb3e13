/// Search filters and keyword-driven query intent detection
use super::SearchError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const TUTORIAL_KEYWORDS: [&str; 7] = ["tutorial", "how to", "learn", "beginner", "course", "guide", "explained"];
const MUSIC_KEYWORDS: [&str; 6] = ["music", "song", "album", "lyrics", "official video", "audio"];
const RECENCY_KEYWORDS: [&str; 6] = ["latest", "new", "2024", "2025", "recent", "today"];
const POPULAR_KEYWORDS: [&str; 2] = ["best", "top"];
const SHORT_KEYWORDS: [&str; 2] = ["short", "quick"];
const LONG_KEYWORDS: [&str; 2] = ["full", "complete"];

static YEAR_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20[0-9]{2})\b").expect("valid year regex"));

/// Video length buckets understood by the search page
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DurationClass {
    /// Under 4 minutes
    Short,
    /// 4 to 20 minutes
    Medium,
    /// Over 20 minutes
    Long,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadRecency {
    Today,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Relevance,
    Views,
    Date,
    Rating,
}

/// Informational content type surfaced to the caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Educational,
    Music,
}

macro_rules! keyword_enum {
    ($name:ident, $label:literal, { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $name {
            type Err = SearchError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(SearchError::InvalidFilter(format!(
                        "unknown {} '{}' (expected one of: {})",
                        $label,
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $($name::$variant => $text,)+
                };
                f.write_str(text)
            }
        }
    };
}

keyword_enum!(DurationClass, "duration", { "short" => Short, "medium" => Medium, "long" => Long });
keyword_enum!(UploadRecency, "upload date", { "today" => Today, "week" => Week, "month" => Month, "year" => Year });
keyword_enum!(SortOrder, "sort order", { "relevance" => Relevance, "views" => Views, "date" => Date, "rating" => Rating });
keyword_enum!(ContentType, "content type", { "educational" => Educational, "music" => Music });

/// Optional modifiers for a search request. `None` means "no constraint".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchFilters {
    /// Match the query as an exact phrase
    pub exact: bool,
    /// Restrict results to a channel name
    pub channel: Option<String>,
    pub duration_class: Option<DurationClass>,
    pub upload_recency: Option<UploadRecency>,
    pub sort_order: Option<SortOrder>,
    /// Only HD videos
    pub hd_only: bool,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply a user-entered filter command such as `duration long` or `hd`
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SearchError> {
        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "duration" | "length" => self.duration_class = Some(value.parse()?),
            "date" | "upload" | "upload_date" => self.upload_recency = Some(value.parse()?),
            "sort" => self.sort_order = Some(value.parse()?),
            "hd" => self.hd_only = parse_switch(value)?,
            "exact" => self.exact = parse_switch(value)?,
            "channel" => {
                self.channel = if value.is_empty() { None } else { Some(value.to_string()) };
            }
            other => {
                return Err(SearchError::InvalidFilter(format!(
                    "unknown filter '{}' (expected duration, date, sort, hd, exact or channel)",
                    other
                )));
            }
        }
        Ok(())
    }

    /// Combine inferred and explicit filters; explicit values win
    pub fn merge(inferred: &SearchFilters, explicit: &SearchFilters) -> SearchFilters {
        SearchFilters {
            exact: inferred.exact || explicit.exact,
            channel: explicit.channel.clone().or_else(|| inferred.channel.clone()),
            duration_class: explicit.duration_class.or(inferred.duration_class),
            upload_recency: explicit.upload_recency.or(inferred.upload_recency),
            sort_order: explicit.sort_order.or(inferred.sort_order),
            hd_only: inferred.hd_only || explicit.hd_only,
        }
    }
}

impl fmt::Display for SearchFilters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.exact {
            parts.push("exact".to_string());
        }
        if let Some(channel) = &self.channel {
            parts.push(format!("channel={}", channel));
        }
        if let Some(duration) = self.duration_class {
            parts.push(format!("duration={}", duration));
        }
        if let Some(recency) = self.upload_recency {
            parts.push(format!("date={}", recency));
        }
        if let Some(sort) = self.sort_order {
            parts.push(format!("sort={}", sort));
        }
        if self.hd_only {
            parts.push("hd".to_string());
        }

        if parts.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Empty value switches a flag on, as in `filter hd`
fn parse_switch(value: &str) -> Result<bool, SearchError> {
    match value.to_lowercase().as_str() {
        "" | "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(SearchError::InvalidFilter(format!("expected on or off, got '{}'", other))),
    }
}

/// What a free-text query seems to be asking for
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchIntent {
    pub filters: SearchFilters,
    pub content_type: Option<ContentType>,
    /// Four-digit year mentioned in the query
    pub year: Option<String>,
}

/// Keyword heuristics that bias the search request.
///
/// Rules run in a fixed order and later rules overwrite fields set by earlier ones.
#[derive(Debug, Clone, Default)]
pub struct QueryIntentAnalyzer;

impl QueryIntentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, query: &str) -> SearchIntent {
        let text = query.to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|keyword| text.contains(keyword));

        let mut intent = SearchIntent::default();

        if mentions(&TUTORIAL_KEYWORDS) {
            intent.content_type = Some(ContentType::Educational);
            intent.filters.duration_class = Some(DurationClass::Medium);
        }

        if mentions(&MUSIC_KEYWORDS) {
            intent.content_type = Some(ContentType::Music);
        }

        if mentions(&RECENCY_KEYWORDS) {
            intent.filters.upload_recency = Some(UploadRecency::Month);
            intent.filters.sort_order = Some(SortOrder::Date);
        }

        if mentions(&POPULAR_KEYWORDS) {
            intent.filters.sort_order = Some(SortOrder::Views);
        }

        intent.year = YEAR_TOKEN
            .captures(&text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string());

        if mentions(&SHORT_KEYWORDS) {
            intent.filters.duration_class = Some(DurationClass::Short);
        }

        if mentions(&LONG_KEYWORDS) {
            intent.filters.duration_class = Some(DurationClass::Long);
        }

        debug!("Query intent for '{}': {:?}", query, intent);
        intent
    }
}
