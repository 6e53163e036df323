//! Instant parsing shared by every reader.
//!
//! Two families of textual timestamps reach the judge:
//!
//! - ISO 8601 / RFC 3339 (`2025-01-20T09:00:00Z`, `...-05:00`, date-only
//!   `2025-01-20`) from JSON calendars, constraint specs and model replies.
//! - iCalendar basic format (`20250120T090000Z`, floating `20250120T090000`,
//!   date-only `20250120`) from block-structured calendar text.
//!
//! Everything is anchored to UTC. Values without an offset are taken as
//! UTC unless the caller supplies a timezone to resolve them in.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::JudgeError;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses an ISO 8601 instant into UTC.
///
/// Accepts RFC 3339 with `Z` or an explicit offset (converted to UTC),
/// offset-less date-times (assumed UTC), and date-only values
/// (midnight UTC).
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, JudgeError> {
    parse_instant_in(s, None)
}

/// Parses an ISO 8601 instant, resolving offset-less values in `tz`.
///
/// Values carrying an offset ignore `tz`. Date-only values are always
/// midnight UTC.
pub fn parse_instant_in(s: &str, tz: Option<Tz>) -> Result<DateTime<Utc>, JudgeError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return resolve_local(naive, tz);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(midnight_utc(date));
    }
    Err(JudgeError::InvalidInstant(format!(
        "Cannot parse datetime: '{s}'. Use ISO 8601 format."
    )))
}

/// Parses an iCalendar basic-format value (`DTSTART`/`DTEND` style).
///
/// A trailing `Z` marks UTC. Otherwise the wall clock is resolved in
/// `tz` when given, else taken as UTC. Falls back to [`parse_instant_in`]
/// so ISO 8601 values written into calendar text are still understood.
pub fn parse_ical_instant(value: &str, tz: Option<Tz>) -> Result<DateTime<Utc>, JudgeError> {
    let value = value.trim();
    if let Some(utc) = value.strip_suffix('Z') {
        if let Ok(naive) = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S") {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S") {
        return resolve_local(naive, tz);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        return Ok(midnight_utc(date));
    }
    parse_instant_in(value, tz)
}

/// Formats an instant in iCalendar basic UTC form (`20250120T090000Z`).
pub fn format_ical_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn resolve_local(naive: NaiveDateTime, tz: Option<Tz>) -> Result<DateTime<Utc>, JudgeError> {
    let Some(tz) = tz else {
        return Ok(naive.and_utc());
    };
    // Ambiguous wall clocks (DST fall-back) resolve to the earlier instant.
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            JudgeError::InvalidInstant(format!("{naive} does not exist in {}", tz.name()))
        })
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}
