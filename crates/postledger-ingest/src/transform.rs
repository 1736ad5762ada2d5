use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::mapping::field;
use crate::model::{MappedRow, TransformedRow};

/// Publish times strictly after this instant use the approximate content
/// monetization earnings column; everything at or before it uses the
/// estimated earnings column. Mirrors the platform's 2025 payout change.
/// Boundary is exclusive as authored upstream; timezone semantics are
/// unconfirmed (see DESIGN.md).
static EARNINGS_CUTOVER: Lazy<NaiveDateTime> = Lazy::new(|| {
    NaiveDate::from_ymd_opt(2025, 4, 1)
        .expect("valid cutover date")
        .and_hms_opt(0, 0, 0)
        .expect("valid cutover time")
});

/// Accepted date layouts, first match wins. Date-only layouts resolve to
/// midnight.
static DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y",
];

/// Extracts a `YYYY-MM` prefix anywhere in a report-date-like string.
static YEAR_MONTH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})").expect("year-month pattern"));

/// Tries each accepted layout in order, then RFC 3339 as a general
/// fallback. Returns `None` on total failure, never an error.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Case-insensitive substring normalization. `video` takes precedence over
/// `reel`, so `"Reel Video"` normalizes to `Video`. Unrecognized types pass
/// through with their original casing.
pub fn normalize_post_type(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("video") {
        "Video".to_string()
    } else if lower.contains("reel") {
        "Reel".to_string()
    } else if lower.contains("photo") {
        "Photo".to_string()
    } else {
        raw.to_string()
    }
}

/// Derives a `YYYY-Qn` label from the raw report-date string.
///
/// This deliberately scans the string instead of reusing the parsed date:
/// a partially malformed date can still carry a usable `YYYY-MM` prefix,
/// and a fully parseable `MM/DD/YYYY` date carries none.
pub fn extract_quarter(raw: &str) -> Option<String> {
    let caps = YEAR_MONTH_PATTERN.captures(raw)?;
    let year = caps.get(1)?.as_str();
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    if month == 0 || month > 12 {
        return None;
    }
    let quarter = month.div_ceil(3);
    Some(format!("{year}-Q{quarter}"))
}

fn select_earnings(publish_time: Option<NaiveDateTime>, row: &MappedRow) -> f64 {
    let approximate = row.number(field::APPROXIMATE_EARNINGS);
    let estimated = row.number(field::ESTIMATED_EARNINGS);
    match publish_time {
        Some(ts) if ts > *EARNINGS_CUTOVER => approximate.unwrap_or(0.0),
        _ => estimated.or(approximate).unwrap_or(0.0),
    }
}

/// Derives the computed attributes of one mapped row. Pure and infallible:
/// every derivation degrades to `None` or zero rather than erroring.
pub fn transform(row: MappedRow) -> TransformedRow {
    let publish_time = row.text(field::PUBLISH_TIME).and_then(parse_flexible_date);
    let report_date = row.text(field::REPORT_DATE).and_then(parse_flexible_date);
    let earnings = select_earnings(publish_time, &row);
    let post_type = row
        .text(field::POST_TYPE)
        .map(normalize_post_type);
    let quarter_range = row.text(field::REPORT_DATE).and_then(extract_quarter);

    TransformedRow {
        fields: row.fields,
        publish_time,
        report_date,
        earnings,
        post_type,
        quarter_range,
    }
}
