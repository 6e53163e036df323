//! Event normalizer.
//!
//! Turns raw calendar data into canonical [`CalendarEvent`] occurrences
//! over a scoring window. Two source formats are understood:
//!
//! - **Block-structured text** (iCalendar): see [`normalize_ical`].
//! - **Generic nested JSON** (Google Calendar style): see [`normalize_gcal`].
//!
//! # Window Semantics
//!
//! The window `[window_start, window_end]` is inclusive on both ends.
//! A one-off event is kept when its start **or** its end falls inside
//! the window; an event spanning the whole window with both endpoints
//! outside it is not kept. A recurring event contributes every
//! expansion whose start lies inside the window, each inheriting the
//! base event's duration.
//!
//! # Degradation
//!
//! A malformed recurrence rule never aborts the surrounding parse: the
//! base event is treated as a single occurrence (subject to the
//! endpoint rule) and a warning is logged. Records with unusable
//! start/end values are skipped individually.

mod gcal;
mod ical;
mod recurrence;

pub use gcal::{normalize_gcal, normalize_gcal_str};
pub(crate) use ical::{parse_property, unfold_lines};
pub use ical::normalize_ical;
pub use recurrence::{expand_recurrence, MAX_RECURRENCE_OCCURRENCES};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::models::CalendarEvent;

/// An event as read from a source, before window filtering.
#[derive(Debug, Clone)]
pub(crate) struct RawEvent {
    pub(crate) title: String,
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: DateTime<Utc>,
    pub(crate) rrule: Option<String>,
}

impl RawEvent {
    /// Occurrences of this event inside the inclusive window.
    pub(crate) fn occurrences(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<CalendarEvent> {
        let Some(rule) = self.rrule.as_deref() else {
            return self.single(window_start, window_end);
        };

        let duration = self.end - self.start;
        match expand_recurrence(rule, self.start, window_start, window_end) {
            Ok(starts) => starts
                .into_iter()
                .map(|start| CalendarEvent::new(self.title.clone(), start, start + duration))
                .collect(),
            Err(e) => {
                warn!(title = %self.title, error = %e, "failed to expand RRULE, using base event");
                self.single(window_start, window_end)
            }
        }
    }

    fn single(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Vec<CalendarEvent> {
        let in_window = |t: DateTime<Utc>| t >= window_start && t <= window_end;
        if in_window(self.start) || in_window(self.end) {
            vec![CalendarEvent::new(self.title.clone(), self.start, self.end)]
        } else {
            Vec::new()
        }
    }
}

/// Expands raw events and orders the result by start (stable).
pub(crate) fn collect_occurrences(
    raw: &[RawEvent],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = raw
        .iter()
        .flat_map(|r| r.occurrences(window_start, window_end))
        .collect();
    events.sort_by_key(|e| e.start);
    events
}
