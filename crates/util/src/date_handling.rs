//! # Date Handling Utilities
//!
//! Formatting of service timestamps for terminal output.

use chrono::{DateTime, Local, NaiveDateTime};

/// Format a timestamp as a local time of day, e.g. `3:04:05 PM`.
///
/// RFC3339 timestamps are converted to the local timezone. Naive
/// `YYYY-MM-DD HH:MM:SS` timestamps are taken as already local. Anything else
/// is returned unchanged so no information is lost.
///
/// # Example
/// ```rust
/// use taas_util::date_handling::format_time_of_day;
///
/// assert_eq!(format_time_of_day("2023-12-25 15:04:05"), "3:04:05 PM");
/// assert_eq!(format_time_of_day("not a date"), "not a date");
/// ```
pub fn format_time_of_day(timestamp: &str) -> String {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(timestamp) {
        return date_time.with_timezone(&Local).format("%-I:%M:%S %p").to_string();
    }
    let formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
    for format_string in formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, format_string) {
            return naive.format("%-I:%M:%S %p").to_string();
        }
    }
    timestamp.to_string()
}
