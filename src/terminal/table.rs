/// Result table and detail rendering
use super::theme::Theme;
use crate::config::DisplayConfig;
use crate::search::VideoRecord;

const VIEWS_WIDTH: usize = 14;
const AGE_WIDTH: usize = 14;
const DURATION_WIDTH: usize = 8;
const VERIFIED_MARK: &str = " ✓";

/// Layout choices for the results table
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub title_width: usize,
    pub channel_width: usize,
    pub show_descriptions: bool,
    /// Rows are sorted by view count rather than search order
    pub sorted_by_views: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            title_width: 50,
            channel_width: 20,
            show_descriptions: false,
            sorted_by_views: false,
        }
    }
}

impl TableOptions {
    pub fn from_config(display: &DisplayConfig) -> Self {
        Self {
            title_width: display.title_width,
            channel_width: display.channel_width,
            show_descriptions: display.show_descriptions,
            sorted_by_views: display.sort_by_views,
        }
    }
}

/// Render records as a numbered table. Row numbers are 1-based in display order.
pub fn render_table(records: &[VideoRecord], theme: &Theme, options: &TableOptions) -> String {
    if records.is_empty() {
        return format!("{}\n", theme.error("No results found"));
    }

    let title_width = records
        .iter()
        .take(10)
        .map(|r| r.title.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(5, options.title_width.max(5));
    let channel_width = options.channel_width.max(7);

    let rule_width = 3 + title_width + channel_width + VIEWS_WIDTH + AGE_WIDTH + DURATION_WIDTH + 15 + 18;
    let rule = theme.accent(&"═".repeat(rule_width));

    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');
    let header = format!(
        "{:>3} │ {} │ {} │ {} │ {} │ {} │ URL",
        "#",
        pad("TITLE", title_width),
        pad("CHANNEL", channel_width),
        pad_left("VIEWS", VIEWS_WIDTH),
        pad("AGE", AGE_WIDTH),
        pad_left("LENGTH", DURATION_WIDTH),
    );
    out.push_str(&theme.header(&header));
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for (idx, record) in records.iter().enumerate() {
        let title = pad(&truncate(&record.title, title_width), title_width);
        let channel = pad(&channel_label(record, channel_width), channel_width);
        let views = pad_left(&truncate(or_na(&record.view_count_text), VIEWS_WIDTH), VIEWS_WIDTH);
        let age = pad(&truncate(or_na(&record.age_text), AGE_WIDTH), AGE_WIDTH);
        let duration = if record.is_live && record.duration_text.is_empty() {
            "LIVE".to_string()
        } else {
            truncate(or_na(&record.duration_text), DURATION_WIDTH)
        };

        out.push_str(&format!(
            "{} │ {} │ {} │ {} │ {} │ {} │ {}\n",
            theme.accent(&format!("{:>3}", idx + 1)),
            title,
            theme.dim(&channel),
            theme.views(&views, record.view_count),
            theme.dim(&age),
            pad_left(&duration, DURATION_WIDTH),
            theme.link(&record.canonical_url, &record.url),
        ));

        if options.show_descriptions && !record.description.is_empty() {
            out.push_str(&format!(
                "    │ {}\n",
                theme.dim(&format!("{}...", truncate(&record.description, 80)))
            ));
        }
    }

    out.push_str(&rule);
    out.push('\n');

    let ordering = if options.sorted_by_views {
        "sorted by views - highest first"
    } else {
        "in search order"
    };
    out.push_str(&theme.dim(&format!("Showing {} results ({})", records.len(), ordering)));
    out.push('\n');
    out
}

/// Detail card for a single record
pub fn render_info(record: &VideoRecord, theme: &Theme) -> String {
    let verified = if record.channel_verified { VERIFIED_MARK } else { "" };
    let mut lines = vec![
        theme.accent("═══ VIDEO INFO ═══"),
        format!("{} {}", theme.header("Title:"), record.title),
        format!("{} {}{}", theme.header("Channel:"), record.channel_name, verified),
        format!("{} {}", theme.header("Views:"), or_na(&record.view_count_text)),
        format!("{} {}", theme.header("Age:"), or_na(&record.age_text)),
        format!(
            "{} {}",
            theme.header("Duration:"),
            if record.is_live { "LIVE" } else { or_na(&record.duration_text) }
        ),
    ];
    if !record.description.is_empty() {
        lines.push(format!("{} {}", theme.header("About:"), record.description));
    }
    lines.push(format!(
        "{} {}",
        theme.header("URL:"),
        theme.link(&record.canonical_url, &record.canonical_url)
    ));
    lines.push(theme.accent("══════════════════"));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn channel_label(record: &VideoRecord, width: usize) -> String {
    if record.channel_verified {
        let name = truncate(&record.channel_name, width - VERIFIED_MARK.chars().count());
        format!("{}{}", name, VERIFIED_MARK)
    } else {
        truncate(&record.channel_name, width)
    }
}

fn or_na(text: &str) -> &str {
    if text.is_empty() {
        "N/A"
    } else {
        text
    }
}

/// Cut to `max` characters, marking the cut with ".."
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 2 {
        return text.chars().take(max).collect();
    }
    let mut cut: String = text.chars().take(max - 2).collect();
    cut.push_str("..");
    cut
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn pad_left(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", " ".repeat(width.saturating_sub(len)), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, title: &str, views: &str, verified: bool) -> VideoRecord {
        VideoRecord::new(
            id.to_string(),
            title.to_string(),
            "3:45".to_string(),
            views.to_string(),
            "A Fairly Long Channel Name Here".to_string(),
            verified,
            "2 weeks ago".to_string(),
            "Snippet text".to_string(),
        )
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("a much longer title", 8), "a much..");
        assert_eq!(truncate("héllo wörld", 7), "héllo..");
        assert_eq!(truncate("abc", 2), "ab");
    }

    #[test]
    fn test_empty_table() {
        let out = render_table(&[], &Theme::plain(), &TableOptions::default());
        assert_eq!(out, "No results found\n");
    }

    #[test]
    fn test_table_rows_in_given_order() {
        let records = vec![
            record("first", "First video", "850 views", false),
            record("second", "Second video", "2.1M views", true),
        ];
        let out = render_table(&records, &Theme::plain(), &TableOptions::default());

        let first = out.find("First video").unwrap();
        let second = out.find("Second video").unwrap();
        assert!(first < second);
        assert!(out.contains("  1 │ First video"));
        assert!(out.contains("  2 │ Second video"));
        assert!(out.contains("youtu.be/second"));
        assert!(out.contains(" ✓"));
        assert!(out.contains("Showing 2 results (in search order)"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_table_truncates_and_describes() {
        let long_title = "x".repeat(120);
        let records = vec![record("a", &long_title, "", false)];
        let options = TableOptions {
            title_width: 20,
            show_descriptions: true,
            sorted_by_views: true,
            ..TableOptions::default()
        };
        let out = render_table(&records, &Theme::plain(), &options);

        assert!(out.contains(&format!("{}..", "x".repeat(18))));
        assert!(!out.contains(&"x".repeat(21)));
        assert!(out.contains("N/A"));
        assert!(out.contains("Snippet text..."));
        assert!(out.contains("sorted by views"));
    }

    #[test]
    fn test_info_card() {
        let out = render_info(&record("abc", "Title", "1K views", true), &Theme::plain());
        assert!(out.contains("Title: Title"));
        assert!(out.contains("Channel: A Fairly Long Channel Name Here ✓"));
        assert!(out.contains("URL: https://youtube.com/watch?v=abc"));
    }
}
