//! Recording timestamps
//!
//! Start times in the comment header are wall-clock strings. They are held
//! as `f64` seconds since the Unix epoch (UTC) so they can be offset by
//! `sample_index / sample_rate` without any calendar arithmetic.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Formats tried in order for timestamps without an explicit offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d,%H:%M:%S%.f",
    "%Y/%m/%d,%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp string into seconds since the Unix epoch.
///
/// Accepts RFC 3339 (offsets honoured) and a handful of naive layouts,
/// which are taken as UTC. A bare date means midnight.
///
/// Returns `None` when the text matches none of the accepted layouts.
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(to_seconds(&dt.with_timezone(&Utc)));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(to_seconds(&Utc.from_utc_datetime(&naive)));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| to_seconds(&Utc.from_utc_datetime(&naive)))
}

/// Format seconds since the epoch as `YYYY-MM-DD hh:mm:ss.fff` (UTC).
///
/// Non-positive or unrepresentable values come back as `-`.
pub fn format_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "-".to_string();
    }

    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;

    match DateTime::<Utc>::from_timestamp(whole as i64, nanos) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        None => "-".to_string(),
    }
}

fn to_seconds(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9
}
