/// Search URL construction
use super::intent::{DurationClass, SearchFilters, SortOrder, UploadRecency};
use anyhow::Result;
use url::Url;

/// Default search-results endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com/results";

/// Build the search-results URL for a query, biased by the given filters.
///
/// The page accepts a single encoded filter in `sp`. A non-default sort order
/// takes it; otherwise the first present of upload date, duration and HD.
pub fn build_search_url(base_url: &str, query: &str, filters: &SearchFilters) -> Result<Url> {
    let mut search_query = if filters.exact {
        format!("\"{}\"", query.trim().trim_matches('"'))
    } else {
        query.trim().to_string()
    };

    if let Some(channel) = &filters.channel {
        search_query.push_str(&format!(" channel:{}", channel));
    }

    let mut url = Url::parse(base_url)?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("search_query", &search_query);
        if let Some(sp) = filter_param(filters) {
            pairs.append_pair("sp", sp);
        }
    }

    Ok(url)
}

fn filter_param(filters: &SearchFilters) -> Option<&'static str> {
    if let Some(code) = filters.sort_order.and_then(sort_code) {
        return Some(code);
    }
    if let Some(recency) = filters.upload_recency {
        return Some(recency_code(recency));
    }
    if let Some(duration) = filters.duration_class {
        return Some(duration_code(duration));
    }
    if filters.hd_only {
        return Some("EgIgAQ==");
    }
    None
}

fn sort_code(sort: SortOrder) -> Option<&'static str> {
    match sort {
        SortOrder::Relevance => None,
        SortOrder::Date => Some("CAI="),
        SortOrder::Views => Some("CAM="),
        SortOrder::Rating => Some("CAE="),
    }
}

fn recency_code(recency: UploadRecency) -> &'static str {
    match recency {
        UploadRecency::Today => "EgIIAg==",
        UploadRecency::Week => "EgIIAw==",
        UploadRecency::Month => "EgIIBA==",
        UploadRecency::Year => "EgIIBQ==",
    }
}

fn duration_code(duration: DurationClass) -> &'static str {
    match duration {
        DurationClass::Short => "EgIYAQ==",
        DurationClass::Medium => "EgIYAw==",
        DurationClass::Long => "EgIYAg==",
    }
}
