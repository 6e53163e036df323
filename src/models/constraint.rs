//! Constraint specifications.
//!
//! A [`ConstraintSpec`] is the declarative, per-scenario policy that
//! says which checks apply to a proposal and with which parameters.
//! Every option is optional: an absent option disables its check, and
//! absence is distinct from a zero value.
//!
//! Custom rules are a closed sum type ([`CustomRule`]), one variant per
//! rule name carrying only that rule's parameters.
//!
//! # JSON form
//!
//! ```json
//! {
//!   "required_block_count": 3,
//!   "working_hours": {"start_hour": 9, "end_hour": 17},
//!   "min_duration_minutes": 90,
//!   "date_range_start": "2025-01-20T00:00:00Z",
//!   "date_range_end": "2025-01-24T23:59:59Z",
//!   "custom_rules": [
//!     {"type": "max_per_day", "value": 1},
//!     {"type": "blocked_dates", "dates": ["2025-01-22"], "description": "offsite"}
//!   ]
//! }
//! ```
//!
//! Parsing is lenient: unknown keys are ignored, a malformed custom rule
//! is dropped (the rest of the spec still applies), and any unusable
//! top-level option (a `working_hours` missing an hour, a non-numeric
//! duration, an unparseable date-range bound) counts as absent. Whole
//! numbers may be written as integral floats (`2.0`).

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::JudgeError;
use crate::time::parse_instant;

/// Allowed hours of the day (UTC), `start_hour` inclusive, `end_hour` as
/// the latest hour a block may run into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkingHours {
    /// First allowed start hour.
    #[serde(deserialize_with = "whole")]
    pub start_hour: u32,
    /// Last allowed end hour.
    #[serde(deserialize_with = "whole")]
    pub end_hour: u32,
}

/// Scenario constraint specification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConstraintSpec {
    /// Number of blocks the proposal must contain.
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub required_block_count: Option<u32>,
    /// Working-hours window (end hour rounded up for partial hours).
    #[serde(
        default,
        deserialize_with = "lenient_working_hours",
        skip_serializing_if = "Option::is_none"
    )]
    pub working_hours: Option<WorkingHours>,
    /// Minimum block duration in minutes (1 minute tolerance).
    #[serde(
        default,
        deserialize_with = "lenient_minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_duration_minutes: Option<f64>,
    /// Maximum block duration in minutes (1 minute tolerance).
    #[serde(
        default,
        deserialize_with = "lenient_minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_duration_minutes: Option<f64>,
    /// Earliest allowed block start.
    #[serde(
        default,
        deserialize_with = "lenient_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_range_start: Option<DateTime<Utc>>,
    /// Latest allowed block end.
    #[serde(
        default,
        deserialize_with = "lenient_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_range_end: Option<DateTime<Utc>>,
    /// Additional rules, evaluated in order.
    #[serde(
        default,
        deserialize_with = "lenient_rules",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub custom_rules: Vec<CustomRule>,
}

impl ConstraintSpec {
    /// Creates an empty spec (no checks).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a spec from JSON text.
    pub fn from_json(json: &str) -> Result<Self, JudgeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the required block count.
    pub fn with_required_blocks(mut self, count: u32) -> Self {
        self.required_block_count = Some(count);
        self
    }

    /// Sets working hours.
    pub fn with_working_hours(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.working_hours = Some(WorkingHours {
            start_hour,
            end_hour,
        });
        self
    }

    /// Sets the minimum duration.
    pub fn with_min_duration(mut self, minutes: f64) -> Self {
        self.min_duration_minutes = Some(minutes);
        self
    }

    /// Sets the maximum duration.
    pub fn with_max_duration(mut self, minutes: f64) -> Self {
        self.max_duration_minutes = Some(minutes);
        self
    }

    /// Sets the allowed date range.
    pub fn with_date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.date_range_start = Some(start);
        self.date_range_end = Some(end);
        self
    }

    /// Appends a custom rule.
    pub fn with_rule(mut self, rule: CustomRule) -> Self {
        self.custom_rules.push(rule);
        self
    }
}

/// A custom rule.
///
/// Tagged by `type` in JSON (`{"type": "max_per_day", "value": 1}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustomRule {
    /// Block must start no earlier than `start_hour` and end no later
    /// than `end_hour` (hour component, no rounding).
    TimeWindow {
        #[serde(deserialize_with = "whole")]
        start_hour: u32,
        #[serde(deserialize_with = "whole")]
        end_hour: u32,
    },

    /// At least `value` minutes between a block and every other
    /// non-overlapping interval (proposed or existing).
    MinBufferMinutes { value: f64 },

    /// At most `value` proposed blocks per calendar date.
    MaxPerDay {
        #[serde(deserialize_with = "whole")]
        value: usize,
    },

    /// Proposed blocks must cover at least `min_days` distinct dates.
    SpreadAcrossDays {
        #[serde(default = "default_min_days", deserialize_with = "whole")]
        min_days: usize,
    },

    /// No block may start on one of `dates` (`YYYY-MM-DD`).
    BlockedDates {
        #[serde(default)]
        dates: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

fn default_min_days() -> usize {
    1
}

impl CustomRule {
    /// Creates a time window rule.
    pub fn time_window(start_hour: u32, end_hour: u32) -> Self {
        Self::TimeWindow {
            start_hour,
            end_hour,
        }
    }

    /// Creates a minimum buffer rule.
    pub fn min_buffer(minutes: f64) -> Self {
        Self::MinBufferMinutes { value: minutes }
    }

    /// Creates a per-day cap.
    pub fn max_per_day(value: usize) -> Self {
        Self::MaxPerDay { value }
    }

    /// Creates a spread rule.
    pub fn spread_across_days(min_days: usize) -> Self {
        Self::SpreadAcrossDays { min_days }
    }

    /// Creates a blocked-dates rule.
    pub fn blocked_dates(dates: Vec<String>) -> Self {
        Self::BlockedDates {
            dates,
            description: None,
        }
    }

    /// Rule name as written in JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TimeWindow { .. } => "time_window",
            Self::MinBufferMinutes { .. } => "min_buffer_minutes",
            Self::MaxPerDay { .. } => "max_per_day",
            Self::SpreadAcrossDays { .. } => "spread_across_days",
            Self::BlockedDates { .. } => "blocked_dates",
        }
    }
}

/// A non-negative whole number, also accepted as an integral float.
fn whole_number(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64).then_some(f as u64)
}

fn whole<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let raw = Value::deserialize(deserializer)?;
    whole_number(&raw)
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| de::Error::custom(format!("expected a whole number, got {raw}")))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(v) => match whole_number(&v).and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                warn!(value = %v, "ignoring unusable required block count");
                None
            }
        },
    })
}

fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_f64().filter(|m| m.is_finite()) {
            Some(m) => Some(m),
            None => {
                warn!(value = %v, "ignoring non-numeric duration bound");
                None
            }
        },
    })
}

fn lenient_working_hours<'de, D>(deserializer: D) -> Result<Option<WorkingHours>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(v) => match serde_json::from_value::<WorkingHours>(v.clone()) {
            Ok(hours) => Some(hours),
            Err(e) => {
                warn!(value = %v, error = %e, "ignoring unusable working hours");
                None
            }
        },
    })
}

fn lenient_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match parse_instant(&s) {
            Ok(dt) => Some(dt),
            Err(e) => {
                warn!(error = %e, "ignoring date range bound");
                None
            }
        },
        Some(other) => {
            warn!(value = %other, "ignoring non-string date range bound");
            None
        }
    })
}

fn lenient_rules<'de, D>(deserializer: D) -> Result<Vec<CustomRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<CustomRule>(v.clone()) {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!(rule = %v, error = %e, "skipping unrecognized custom rule");
                None
            }
        })
        .collect())
}
