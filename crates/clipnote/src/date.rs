//! Date formatting helpers
//!
//! Formats are chrono strftime strings taken from [`NoteSettings`](crate::NoteSettings).
//! An invalid format string yields an empty string instead of a panic.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::fmt::{Display, Write};

/// Input formats accepted for provider date strings, tried in order
const DATE_ONLY_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y"];

/// Format a timestamp with a strftime pattern
pub fn format_date<Tz>(date: &DateTime<Tz>, fmt: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut output = String::new();
    if write!(output, "{}", date.format(fmt)).is_err() {
        tracing::warn!(format = fmt, "Invalid date format");
        return String::new();
    }
    output
}

/// Reformat a provider date string (RFC 3339, `2024-01-31` or `January 31, 2024`)
///
/// Returns `None` when the input matches none of the known shapes.
pub fn reformat_date(value: &str, fmt: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(format_date(&parsed.with_timezone(&Local), fmt));
    }

    DATE_ONLY_FORMATS.iter().find_map(|input_fmt| {
        NaiveDate::parse_from_str(value, input_fmt)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
            .map(|local| format_date(&local, fmt))
    })
}
