//! Organoid age normalization.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse free-text age such as `"28 days"` or `"28 days 04:10:00"` to a
/// day count. Bare integers are accepted; anything else yields `None`.
pub fn parse_age_days(text: &str) -> Option<i64> {
    let head = match text.find("days") {
        Some(pos) => &text[..pos],
        None => text,
    };
    head.trim().parse().ok()
}

/// Parse a catalog timestamp or date
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Whole days between aggregation and recording, formatted like `"28 days"`
pub fn age_between(experiment_date: &str, agg_date: &str) -> Option<String> {
    let recorded = parse_timestamp(experiment_date)?;
    let aggregated = parse_timestamp(agg_date)?;
    let days = recorded.signed_duration_since(aggregated).num_days();
    Some(format!("{} days", days))
}
