//! Display helpers for values coming back from the admin API

use chrono::{NaiveDate, NaiveDateTime};

/// Placeholder shown for missing or unparseable dates
pub const NOT_AVAILABLE: &str = "N/A";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse the date part out of the timestamps the API returns
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` (the `T` may also be a
/// space) and RFC 3339 strings with an offset.
#[must_use]
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    let normalized = raw.replacen('T', " ", 1);
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok())
}

/// Render an optional API timestamp as `YYYY-MM-DD`, or `N/A`
#[must_use]
pub fn display_date(raw: Option<&str>) -> String {
    raw.and_then(parse_api_date)
        .map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Render an optional text cell, falling back to `N/A`
#[must_use]
pub fn display_text(raw: Option<&str>) -> &str {
    match raw.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => NOT_AVAILABLE,
    }
}

/// Split an ISO `YYYY-MM-DD` date into `(day, month, year)` strings
///
/// Returns `None` when the input does not have three dash-separated parts.
#[must_use]
pub fn split_iso_date(raw: &str) -> Option<(String, String, String)> {
    let mut parts = raw.trim().splitn(3, '-');
    let year = parts.next().filter(|p| !p.is_empty())?;
    let month = parts.next().filter(|p| !p.is_empty())?;
    let day = parts.next().filter(|p| !p.is_empty())?;
    Some((day.to_string(), month.to_string(), year.to_string()))
}
