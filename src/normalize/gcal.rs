//! Generic nested JSON calendars (Google Calendar style).
//!
//! ```json
//! {"events": [
//!   {"summary": "Standup",
//!    "start": {"dateTime": "2025-01-20T09:00:00-05:00"},
//!    "end":   {"dateTime": "2025-01-20T09:15:00-05:00"},
//!    "recurrence": ["RRULE:FREQ=DAILY;COUNT=5"]}
//! ]}
//! ```

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{collect_occurrences, RawEvent};
use crate::error::JudgeError;
use crate::models::CalendarEvent;
use crate::time::parse_instant_in;

/// Start or end bound of a JSON event.
#[derive(Debug, Clone, Default, Deserialize)]
struct GCalDateTime {
    #[serde(default, alias = "dateTime")]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default, alias = "timeZone")]
    time_zone: Option<String>,
}

impl GCalDateTime {
    fn resolve(&self) -> Result<DateTime<Utc>, JudgeError> {
        if let Some(dt) = self.date_time.as_deref().filter(|s| !s.trim().is_empty()) {
            let tz = self.time_zone.as_deref().and_then(|name| name.parse::<Tz>().ok());
            return parse_instant_in(dt, tz);
        }
        if let Some(date) = self.date.as_deref().filter(|s| !s.trim().is_empty()) {
            return parse_instant_in(date, None);
        }
        Err(JudgeError::MissingField("dateTime or date".to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GCalEvent {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    start: Option<GCalDateTime>,
    #[serde(default)]
    end: Option<GCalDateTime>,
    #[serde(default)]
    recurrence: Vec<String>,
}

impl GCalEvent {
    fn into_raw(self) -> Result<RawEvent, JudgeError> {
        let start = self
            .start
            .ok_or_else(|| JudgeError::MissingField("start".to_string()))?
            .resolve()?;
        let end = self
            .end
            .ok_or_else(|| JudgeError::MissingField("end".to_string()))?
            .resolve()?;
        let rrule = self
            .recurrence
            .iter()
            .find_map(|line| line.trim().strip_prefix("RRULE:"))
            .map(str::to_string);
        Ok(RawEvent {
            title: self.summary.unwrap_or_else(|| "Untitled".to_string()),
            start,
            end,
            rrule,
        })
    }
}

/// Normalizes a JSON calendar into occurrences within
/// `[window_start, window_end]`.
///
/// The event list is read from `events` (or `items`). Entries that are
/// not objects, lack a bound, or carry unparseable bounds are skipped.
pub fn normalize_gcal(
    calendar: &Value,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let entries = calendar
        .get("events")
        .or_else(|| calendar.get("items"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let raw: Vec<RawEvent> = entries
        .iter()
        .filter_map(|entry| {
            let parsed = GCalEvent::deserialize(entry)
                .map_err(JudgeError::from)
                .and_then(GCalEvent::into_raw);
            match parsed {
                Ok(raw) => Some(raw),
                Err(e) => {
                    warn!(error = %e, "skipping JSON calendar entry");
                    None
                }
            }
        })
        .collect();

    let events = collect_occurrences(&raw, window_start, window_end);
    debug!(entries = entries.len(), occurrences = events.len(), "normalized JSON calendar");
    events
}

/// Parses JSON text and normalizes it.
///
/// # Errors
/// [`JudgeError::InvalidJson`] if the text is not JSON at all.
pub fn normalize_gcal_str(
    json: &str,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<CalendarEvent>, JudgeError> {
    let value: Value = serde_json::from_str(json)?;
    Ok(normalize_gcal(&value, window_start, window_end))
}
