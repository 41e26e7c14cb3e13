/// Extraction of video records from the data blob embedded in a search page
use super::{VideoRecord, UNKNOWN};
use serde_json::Value;
use tracing::{debug, warn};

/// Script assignments that introduce the embedded data block
const DATA_ANCHORS: [&str; 2] = ["var ytInitialData = ", "window[\"ytInitialData\"] = "];

/// Closing marker used when the brace scan cannot find the end of the block
const SCRIPT_TERMINATOR: &str = ";</script>";

/// Path from the document root to the section list
const SECTION_LIST_PATH: [&str; 5] = [
    "contents",
    "twoColumnSearchResultsRenderer",
    "primaryContents",
    "sectionListRenderer",
    "contents",
];

/// Badge styles that mark a verified channel
const VERIFIED_BADGE_STYLES: [&str; 2] = ["BADGE_STYLE_TYPE_VERIFIED", "BADGE_STYLE_TYPE_VERIFIED_ARTIST"];

/// Description snippets are cut to this many characters
const DESCRIPTION_MAX_CHARS: usize = 100;

/// Reasons a page could not be turned into records
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("Embedded data block not found")]
    DataBlockNotFound,

    #[error("Embedded data block is not terminated")]
    DataBlockUnterminated,

    #[error("Embedded data block is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Unexpected page structure: missing '{path}'")]
    SchemaMismatch { path: String },
}

/// Walks a search-results page and yields normalized video records
#[derive(Debug, Clone, Default)]
pub struct ResultExtractor;

impl ResultExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract up to `max_results` records in document order.
    ///
    /// Any failure is logged and degrades to an empty list; use [`try_extract`]
    /// when the caller needs the reason.
    ///
    /// [`try_extract`]: ResultExtractor::try_extract
    pub fn extract(&self, page: &str, max_results: usize) -> Vec<VideoRecord> {
        match self.try_extract(page, max_results) {
            Ok(records) => records,
            Err(e) => {
                warn!("Could not parse search page: {}", e);
                Vec::new()
            }
        }
    }

    /// Extract up to `max_results` records, reporting why extraction failed
    pub fn try_extract(&self, page: &str, max_results: usize) -> Result<Vec<VideoRecord>, ParseError> {
        let block = locate_data_block(page)?;
        debug!("Located embedded data block ({} bytes)", block.len());

        let document: Value = serde_json::from_str(block)?;
        let sections = section_list(&document)?;

        let mut records = Vec::new();
        if max_results == 0 {
            return Ok(records);
        }

        for section in sections {
            let items = match section
                .get("itemSectionRenderer")
                .and_then(|s| s.get("contents"))
                .and_then(Value::as_array)
            {
                Some(items) => items,
                None => continue,
            };

            for item in items {
                let renderer = match item.get("videoRenderer") {
                    Some(renderer) => renderer,
                    None => continue,
                };

                records.push(parse_video_renderer(renderer));
                if records.len() >= max_results {
                    debug!("Reached result cap of {}", max_results);
                    return Ok(records);
                }
            }
        }

        debug!("Extracted {} records", records.len());
        Ok(records)
    }
}

/// Find the JSON text assigned after one of the data anchors
fn locate_data_block(page: &str) -> Result<&str, ParseError> {
    let start = DATA_ANCHORS
        .iter()
        .find_map(|anchor| page.find(anchor).map(|pos| pos + anchor.len()))
        .ok_or(ParseError::DataBlockNotFound)?;

    let rest = page[start..].trim_start();
    if !rest.starts_with('{') {
        return Err(ParseError::DataBlockNotFound);
    }

    if let Some(end) = balanced_object_end(rest) {
        return Ok(&rest[..end]);
    }

    match rest.find(SCRIPT_TERMINATOR) {
        Some(end) => Ok(&rest[..end]),
        None => Err(ParseError::DataBlockUnterminated),
    }
}

/// Byte offset just past the brace closing the object that opens `text`.
///
/// String literals are skipped so braces inside titles do not count.
fn balanced_object_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, byte) in text.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Follow the fixed section-list path; every hop must exist
fn section_list(document: &Value) -> Result<&Vec<Value>, ParseError> {
    let mut node = document;
    let mut walked = Vec::with_capacity(SECTION_LIST_PATH.len());

    for key in SECTION_LIST_PATH {
        walked.push(key);
        node = node.get(key).ok_or_else(|| ParseError::SchemaMismatch {
            path: walked.join("."),
        })?;
    }

    node.as_array().ok_or_else(|| ParseError::SchemaMismatch {
        path: format!("{}[]", walked.join(".")),
    })
}

/// Build one record from a video renderer entry. Never fails: every field has a default.
fn parse_video_renderer(video: &Value) -> VideoRecord {
    let id = str_at(video, "/videoId").unwrap_or_default();

    let title = str_at(video, "/title/runs/0/text")
        .or_else(|| str_at(video, "/title/simpleText"))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let view_count_text = str_at(video, "/viewCountText/simpleText")
        .or_else(|| joined_runs(video.pointer("/viewCountText/runs")))
        .unwrap_or_default();

    let channel_name = str_at(video, "/ownerText/runs/0/text")
        .or_else(|| str_at(video, "/longBylineText/runs/0/text"))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let channel_verified = video
        .get("ownerBadges")
        .and_then(Value::as_array)
        .map(|badges| {
            badges.iter().any(|badge| {
                badge
                    .pointer("/metadataBadgeRenderer/style")
                    .and_then(Value::as_str)
                    .map_or(false, |style| VERIFIED_BADGE_STYLES.contains(&style))
            })
        })
        .unwrap_or(false);

    let duration_text = str_at(video, "/lengthText/simpleText").unwrap_or_default();
    let age_text = str_at(video, "/publishedTimeText/simpleText").unwrap_or_default();

    let description = joined_runs(video.pointer("/detailedMetadataSnippets/0/snippetText/runs"))
        .map(|text| text.chars().take(DESCRIPTION_MAX_CHARS).collect::<String>())
        .unwrap_or_default();

    VideoRecord::new(
        id,
        title,
        duration_text,
        view_count_text,
        channel_name,
        channel_verified,
        age_text,
        description,
    )
}

fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).map(str::to_string)
}

/// Concatenate the `text` of every run, `None` when there are no runs
fn joined_runs(runs: Option<&Value>) -> Option<String> {
    let runs = runs?.as_array()?;
    if runs.is_empty() {
        return None;
    }
    Some(
        runs.iter()
            .filter_map(|run| run.get("text").and_then(Value::as_str))
            .collect(),
    )
}
