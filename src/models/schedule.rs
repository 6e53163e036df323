//! Proposed schedule model.
//!
//! A proposal is a flat list of [`ScheduledBlock`]s, produced either by
//! extracting them from an agent's free-form reply or taken verbatim
//! from its final "propose" tool call. Checking a proposal yields
//! [`Violation`]s.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::TimeWindow;

/// A proposed block of time.
///
/// `start < end` is not enforced: agents produce degenerate intervals
/// and the scoring engine has to cope with them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledBlock {
    /// Block title.
    pub title: String,
    /// Block start.
    pub start: DateTime<Utc>,
    /// Block end.
    pub end: DateTime<Utc>,
}

impl ScheduledBlock {
    /// Creates a new block.
    pub fn new(title: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            start,
            end,
        }
    }

    /// Duration in (fractional) minutes.
    #[inline]
    pub fn duration_minutes(&self) -> f64 {
        self.window().duration_minutes()
    }

    /// Calendar date (UTC) of the block start.
    #[inline]
    pub fn date_key(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// The block as a time window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}

/// A failed check found while scoring a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
}

/// Classification of violations.
///
/// The `Display` form is the prefix used in reports
/// (`WORKING_HOURS: ...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Block overlaps an existing event.
    Conflict,
    /// Block falls outside working hours.
    WorkingHours,
    /// Block shorter or longer than allowed.
    Duration,
    /// Block outside the scenario's date range.
    DateRange,
    /// Block outside a custom hour window.
    TimeWindow,
    /// Block too close to another interval.
    Buffer,
    /// Too many blocks on one day.
    MaxPerDay,
    /// Blocks spread over too few days.
    Spread,
    /// Block on a blocked date.
    BlockedDate,
}

impl ViolationKind {
    /// Report prefix for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Conflict => "CONFLICT",
            Self::WorkingHours => "WORKING_HOURS",
            Self::Duration => "DURATION",
            Self::DateRange => "DATE_RANGE",
            Self::TimeWindow => "TIME_WINDOW",
            Self::Buffer => "BUFFER",
            Self::MaxPerDay => "MAX_PER_DAY",
            Self::Spread => "SPREAD",
            Self::BlockedDate => "BLOCKED_DATE",
        }
    }
}

impl Violation {
    /// Creates a violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.tag(), self.message)
    }
}
