//! Timestamp handling for schedule data.
//!
//! The data source publishes ISO 8601 timestamps with a UTC offset
//! (`2024-03-15T10:05:00-04:00`) and accepts service dates as `YYYY-MM-DD`
//! and time-of-day filters as `HH:MM`. Offsets are kept so that times
//! compare absolutely. Date and time filters are read in the agency's time
//! zone, whatever offset a timestamp was written with.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use chrono_tz::Tz;

/// A schedule timestamp with its published UTC offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Time zone the data source publishes schedules in.
pub const AGENCY_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Error returned when parsing an invalid timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: String,
}

/// Parse an RFC 3339 / ISO 8601 timestamp with offset.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::parse_timestamp;
///
/// let t = parse_timestamp("2024-03-15T10:05:00-04:00").unwrap();
/// assert_eq!(t.format("%H:%M").to_string(), "10:05");
/// assert!(parse_timestamp("10:05").is_err());
/// ```
pub fn parse_timestamp(s: &str) -> Result<Timestamp, TimeError> {
    DateTime::parse_from_rfc3339(s).map_err(|e| TimeError {
        input: s.to_string(),
        reason: e.to_string(),
    })
}

/// Format a service date the way schedule filters expect (`YYYY-MM-DD`).
pub fn format_service_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a time-of-day filter (`HH:MM`).
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Service date of a timestamp in the agency's zone.
pub fn service_date(t: &Timestamp, tz: Tz) -> NaiveDate {
    t.with_timezone(&tz).date_naive()
}

/// Wall-clock time of a timestamp in the agency's zone.
pub fn service_time(t: &Timestamp, tz: Tz) -> NaiveTime {
    t.with_timezone(&tz).time()
}
