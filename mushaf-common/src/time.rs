//! Timestamp utilities
//!
//! Word offsets arrive as seconds from the start of the recording and are
//! stored as a time of day (the offset added to midnight), with microsecond
//! resolution.

use chrono::{DateTime, NaiveTime, Utc};

const MICROS_PER_SECOND: u64 = 1_000_000;
const MICROS_PER_DAY: u64 = 86_400 * MICROS_PER_SECOND;

/// Storage format for time-of-day columns
pub const TIME_FORMAT: &str = "%H:%M:%S%.6f";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert an offset in seconds to a time of day, wrapping at 24 hours
///
/// Returns `None` for negative or non-finite offsets.
pub fn offset_to_time_of_day(seconds: f64) -> Option<NaiveTime> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    let micros = (seconds * MICROS_PER_SECOND as f64).round() as u64 % MICROS_PER_DAY;
    let secs = (micros / MICROS_PER_SECOND) as u32;
    let nanos = ((micros % MICROS_PER_SECOND) * 1_000) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

/// Format a time of day for storage
pub fn format_time_of_day(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parse a stored time-of-day column
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
}
