//! Calendar occurrences and time windows.
//!
//! # Time Model
//! All instants are absolute and anchored to UTC. Whatever timezone a
//! source calendar declared has already been resolved by the time a
//! value lands in one of these types.
//!
//! # Overlap
//! Intervals are half-open `[start, end)`, so back-to-back intervals
//! (`a.end == b.start`) never overlap.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end. Degenerate
/// windows (`end <= start`) are allowed and simply never overlap
/// anything positive-length that does not contain their start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Duration of this window.
    #[inline]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Duration in (fractional) minutes. Negative for inverted windows.
    #[inline]
    pub fn duration_minutes(&self) -> f64 {
        minutes(self.duration())
    }

    /// Whether an instant falls within this window.
    #[inline]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    /// Length of the overlap in minutes (0 when disjoint).
    pub fn overlap_minutes(&self, other: &Self) -> f64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            minutes(end - start)
        } else {
            0.0
        }
    }

    /// Gap between two windows that do not overlap.
    ///
    /// Measured from this window's end to the other's start when the
    /// other lies after it, or from the other's end to this window's
    /// start when it lies before. Returns `None` for overlapping windows.
    pub fn gap_to(&self, other: &Self) -> Option<TimeDelta> {
        if self.end <= other.start {
            Some(other.start - self.end)
        } else if other.end <= self.start {
            Some(self.start - other.end)
        } else {
            None
        }
    }
}

/// Half-open interval overlap: `[a_start, a_end)` vs `[b_start, b_end)`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

pub(crate) fn minutes(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 60_000.0
}

/// A concrete event occurrence on an existing calendar.
///
/// Either a one-off event or one expansion of a recurring event.
/// Recreated from raw calendar data on every normalization call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Event title (SUMMARY).
    pub title: String,
    /// Occurrence start.
    pub start: DateTime<Utc>,
    /// Occurrence end.
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    /// Creates a new occurrence.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            start,
            end,
        }
    }

    /// The occurrence as a time window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}
