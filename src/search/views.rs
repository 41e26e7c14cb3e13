/// View count normalization for abbreviated, locale-formatted count strings
use tracing::debug;

/// Unit words stripped from the end of a count string, longest first
const UNIT_WORDS: [&str; 3] = ["watching", "views", "view"];

/// Convert a human-readable count ("1.2M", "3,400 views", "12K watching") into an integer.
///
/// This is a lossy, best-effort heuristic over untrusted text: anything it cannot
/// make sense of yields `0` instead of an error.
pub fn normalize_view_count(text: &str) -> u64 {
    let without_separators = text.replace(',', "");
    let mut trimmed = without_separators.trim();

    for word in UNIT_WORDS {
        if let Some(stripped) = trimmed.strip_suffix(word) {
            trimmed = stripped.trim_end();
            break;
        }
    }
    let cleaned = trimmed;

    if cleaned.is_empty() {
        return 0;
    }

    let (number, multiplier) = match cleaned.chars().last() {
        Some('K') => (&cleaned[..cleaned.len() - 1], 1_000),
        Some('M') => (&cleaned[..cleaned.len() - 1], 1_000_000),
        Some('B') => (&cleaned[..cleaned.len() - 1], 1_000_000_000),
        _ => (cleaned, 1),
    };

    match parse_scaled(number.trim(), multiplier) {
        Some(value) => value,
        None => {
            debug!("Unparseable view count text: '{}'", text);
            0
        }
    }
}

/// Parse a plain decimal ("12", "1.25") and scale it, truncating any fraction.
///
/// Works on the digits directly so "4.35K" is 4350 rather than a float rounding artifact.
fn parse_scaled(number: &str, multiplier: u64) -> Option<u64> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // A bare integer count may not carry a fraction
    if multiplier == 1 && number.contains('.') {
        return None;
    }

    let whole_value: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole_value.checked_mul(multiplier)?;

    // Only as many fractional digits as the multiplier can represent matter
    let mut scale = multiplier;
    for digit in fraction.chars() {
        scale /= 10;
        if scale == 0 {
            break;
        }
        let digit = digit.to_digit(10)? as u64;
        value = value.checked_add(digit * scale)?;
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviated_counts() {
        assert_eq!(normalize_view_count("1.2M"), 1_200_000);
        assert_eq!(normalize_view_count("950K"), 950_000);
        assert_eq!(normalize_view_count("2.1M views"), 2_100_000);
        assert_eq!(normalize_view_count("3B views"), 3_000_000_000);
        assert_eq!(normalize_view_count("4.35K"), 4_350);
        assert_eq!(normalize_view_count("1.2345K"), 1_234);
    }

    #[test]
    fn test_plain_counts() {
        assert_eq!(normalize_view_count("3,400 views"), 3_400);
        assert_eq!(normalize_view_count("850 views"), 850);
        assert_eq!(normalize_view_count("1 view"), 1);
        assert_eq!(normalize_view_count("1,234 watching"), 1_234);
        assert_eq!(normalize_view_count("12K watching"), 12_000);
    }

    #[test]
    fn test_unparseable_counts_are_zero() {
        assert_eq!(normalize_view_count(""), 0);
        assert_eq!(normalize_view_count("garbage"), 0);
        assert_eq!(normalize_view_count("No views"), 0);
        assert_eq!(normalize_view_count("1.2.3M"), 0);
        assert_eq!(normalize_view_count("12.5 views"), 0);
        assert_eq!(normalize_view_count("M"), 0);
        assert_eq!(normalize_view_count("-5"), 0);
    }

    #[test]
    fn test_suffix_is_case_sensitive() {
        assert_eq!(normalize_view_count("1.2m"), 0);
        assert_eq!(normalize_view_count("5k views"), 0);
    }
}
