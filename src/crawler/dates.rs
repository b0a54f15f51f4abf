//! Publish-date parsing
//!
//! Listing labels and press-release bylines come in a handful of human
//! formats ("January 5, 2024", "Jan. 5th, 2024", "03/2019"...). Every date is
//! resolved to midnight UTC so the host never receives a naive timestamp.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// A date label that matched none of the known formats
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized publish date '{0}'")]
pub struct DateParseError(pub String);

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// %B also accepts abbreviated month names when parsing
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%m/%d/%Y",
];

const MONTH_FORMATS: &[&str] = &["%B %Y", "%B, %Y", "%m/%Y"];

/// Earlier years come from a short year swallowed by a day field
const MIN_YEAR: i32 = 1900;

const LABELS: &[&str] = &["published:", "updated:", "posted:", "date:"];

/// Parses a publish date from page text
///
/// # Example
///
/// ```
/// use visa_harvest::crawler::parse_publish_date;
///
/// let date = parse_publish_date("January 5th, 2024").unwrap();
/// assert_eq!(date.to_rfc3339(), "2024-01-05T00:00:00+00:00");
/// ```
pub fn parse_publish_date(raw: &str) -> Result<DateTime<Utc>, DateParseError> {
    let cleaned = normalize(raw);
    if cleaned.is_empty() {
        return Err(DateParseError(raw.to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            if let Some(dt) = midnight(date) {
                return Ok(dt);
            }
        }
    }

    // Month-only labels resolve to the first of the month
    for format in MONTH_FORMATS {
        let with_day = format!("1 {}", cleaned);
        if let Ok(date) = NaiveDate::parse_from_str(&with_day, &format!("%d {}", format)) {
            if let Some(dt) = midnight(date) {
                return Ok(dt);
            }
        }
    }

    Err(DateParseError(raw.to_string()))
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    if date.year() < MIN_YEAR {
        return None;
    }
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Trims labels, abbreviation dots and ordinal suffixes, collapses whitespace
fn normalize(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    let lower = text.to_ascii_lowercase();
    if let Some(label) = LABELS.iter().find(|label| lower.starts_with(*label)) {
        text = text[label.len()..].to_string();
    }

    text.split_whitespace()
        .map(|word| strip_ordinal(word.trim_end_matches('.')))
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_ordinal(word: &str) -> String {
    let (core, trailing) = match word.strip_suffix(',') {
        Some(core) => (core, ","),
        None => (word, ""),
    };

    let digits_end = core
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(core.len());
    if digits_end > 0 {
        let suffix = core[digits_end..].to_ascii_lowercase();
        if matches!(suffix.as_str(), "st" | "nd" | "rd" | "th") {
            return format!("{}{}", &core[..digits_end], trailing);
        }
    }

    word.to_string()
}
