//! RRULE expansion.
//!
//! Recurrence is anchored at the base event's UTC start. Only
//! occurrences whose start lies in the inclusive window are produced.
//!
//! A UTC anchor requires a UTC `UNTIL`, so other forms are rewritten
//! first:
//!
//! | `UNTIL` | Read as |
//! |---------|---------|
//! | `20250131` | `20250131T235959Z` (whole day included) |
//! | `20250131T170000` | `20250131T170000Z` |
//! | `20250131T170000Z` | unchanged |
//!
//! # Reference
//! RFC 5545, Section 3.3.10 (Recurrence Rule)

use std::borrow::Cow;

use chrono::{DateTime, TimeDelta, Utc};
use rrule::{RRuleSet, Tz};
use tracing::warn;

use crate::error::JudgeError;
use crate::time::format_ical_utc;

/// Upper bound on expanded occurrences per event.
pub const MAX_RECURRENCE_OCCURRENCES: u16 = 1000;

/// Expands a recurrence rule into occurrence starts within
/// `[window_start, window_end]` (inclusive on both ends).
///
/// `rule` is the RRULE value (`FREQ=WEEKLY;BYDAY=MO,WE`); a leading
/// `RRULE:` is tolerated.
///
/// # Errors
/// [`JudgeError::InvalidRecurrence`] if the rule does not parse.
pub fn expand_recurrence(
    rule: &str,
    anchor: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, JudgeError> {
    let rule = rule.trim();
    let rule = rule.strip_prefix("RRULE:").unwrap_or(rule);
    if rule.is_empty() {
        return Err(JudgeError::InvalidRecurrence("empty rule".to_string()));
    }

    let rule = utc_until(rule);
    let set: RRuleSet = format!("DTSTART:{}\nRRULE:{}", format_ical_utc(&anchor), rule)
        .parse()
        .map_err(|e| JudgeError::InvalidRecurrence(format!("{rule}: {e}")))?;

    // Pad the query by a second each side; the inclusive filter below is authoritative.
    let after = (window_start - TimeDelta::seconds(1)).with_timezone(&Tz::UTC);
    let before = (window_end + TimeDelta::seconds(1)).with_timezone(&Tz::UTC);
    let result = set.after(after).before(before).all(MAX_RECURRENCE_OCCURRENCES);
    if result.limited {
        warn!(rule = %rule, limit = MAX_RECURRENCE_OCCURRENCES, "recurrence expansion truncated");
    }

    Ok(result
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .filter(|start| *start >= window_start && *start <= window_end)
        .collect())
}

/// Rewrites a date-only or floating `UNTIL` part into UTC form.
fn utc_until(rule: &str) -> Cow<'_, str> {
    let needs_rewrite = |part: &str| {
        part.split_once('=').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("UNTIL") && !value.trim().ends_with(['Z', 'z'])
        })
    };
    if !rule.split(';').any(needs_rewrite) {
        return Cow::Borrowed(rule);
    }

    let parts: Vec<String> = rule
        .split(';')
        .map(|part| {
            if !needs_rewrite(part) {
                return part.to_string();
            }
            let value = part.split_once('=').map_or("", |(_, v)| v.trim());
            if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
                format!("UNTIL={value}T235959Z")
            } else {
                format!("UNTIL={value}Z")
            }
        })
        .collect();
    Cow::Owned(parts.join(";"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_daily_count() {
        let starts = expand_recurrence("FREQ=DAILY;COUNT=5", utc(20, 9), utc(1, 0), utc(31, 0)).unwrap();
        assert_eq!(starts.len(), 5);
        assert_eq!(starts[0], utc(20, 9));
        assert_eq!(starts[4], utc(24, 9));
    }

    #[test]
    fn test_window_clips_occurrences() {
        // Daily from the 13th; window covers the 20th..24th
        let starts =
            expand_recurrence("FREQ=DAILY", utc(13, 9), utc(20, 0), utc(24, 23)).unwrap();
        assert_eq!(starts.len(), 5);
        assert_eq!(starts[0], utc(20, 9));
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let starts =
            expand_recurrence("FREQ=DAILY;COUNT=10", utc(20, 9), utc(21, 9), utc(23, 9)).unwrap();
        assert_eq!(starts, vec![utc(21, 9), utc(22, 9), utc(23, 9)]);
    }

    #[test]
    fn test_weekly_byday() {
        // 2025-01-20 is a Monday
        let starts = expand_recurrence(
            "RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR",
            utc(20, 10),
            utc(20, 0),
            utc(26, 23),
        )
        .unwrap();
        assert_eq!(starts, vec![utc(20, 10), utc(22, 10), utc(24, 10)]);
    }

    #[test]
    fn test_until_forms() {
        let week = (utc(20, 0), utc(26, 23));
        let daily = |until: &str| {
            expand_recurrence(&format!("FREQ=DAILY;UNTIL={until}"), utc(13, 9), week.0, week.1)
                .unwrap()
        };

        assert_eq!(daily("20250131T235959Z").len(), 7);
        // Date-only includes the whole final day
        assert_eq!(daily("20250131").len(), 7);
        assert_eq!(daily("20250122"), vec![utc(20, 9), utc(21, 9), utc(22, 9)]);
        // Floating is read as UTC
        assert_eq!(daily("20250122T090000"), vec![utc(20, 9), utc(21, 9), utc(22, 9)]);
        assert_eq!(daily("20250122T085959"), vec![utc(20, 9), utc(21, 9)]);
    }

    #[test]
    fn test_utc_until_rewrite() {
        assert_eq!(utc_until("FREQ=DAILY;COUNT=3"), "FREQ=DAILY;COUNT=3");
        assert_eq!(utc_until("FREQ=DAILY;UNTIL=20250131T100000Z"), "FREQ=DAILY;UNTIL=20250131T100000Z");
        assert_eq!(
            utc_until("FREQ=WEEKLY;UNTIL=20250131;BYDAY=MO"),
            "FREQ=WEEKLY;UNTIL=20250131T235959Z;BYDAY=MO"
        );
        assert_eq!(utc_until("FREQ=DAILY;until=20250131T100000"), "FREQ=DAILY;UNTIL=20250131T100000Z");
    }

    #[test]
    fn test_malformed_rule_is_error() {
        let err = expand_recurrence("FREQ=SOMETIMES", utc(20, 9), utc(20, 0), utc(24, 0));
        assert!(matches!(err, Err(JudgeError::InvalidRecurrence(_))));
        assert!(expand_recurrence("", utc(20, 9), utc(20, 0), utc(24, 0)).is_err());
    }
}
