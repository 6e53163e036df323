//! Scenario fixtures.
//!
//! A scenario bundles the calendars an agent is shown, the task it is
//! asked to perform, and the constraint spec its answer is graded
//! against.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constraint::ConstraintSpec;
use crate::error::JudgeError;

/// An evaluation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Instruction given to the agent.
    #[serde(default)]
    pub task_prompt: String,
    /// Primary (work) calendar, block-structured text.
    pub existing_events_ical: String,
    /// Optional personal calendar, block-structured text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_events_personal_ical: Option<String>,
    /// Optional shared team calendar, block-structured text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_events_shared_ical: Option<String>,
    /// Optional calendar in generic JSON form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_events_gcal_json: Option<Value>,
    /// Grading policy.
    #[serde(default)]
    pub constraints: ConstraintSpec,
}

impl Scenario {
    /// Creates a scenario with a single text calendar and no constraints.
    pub fn new(name: impl Into<String>, ical: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            task_prompt: String::new(),
            existing_events_ical: ical.into(),
            existing_events_personal_ical: None,
            existing_events_shared_ical: None,
            existing_events_gcal_json: None,
            constraints: ConstraintSpec::default(),
        }
    }

    /// Parses a scenario from JSON text.
    pub fn from_json(json: &str) -> Result<Self, JudgeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the constraint spec.
    pub fn with_constraints(mut self, constraints: ConstraintSpec) -> Self {
        self.constraints = constraints;
        self
    }

    /// Adds a personal calendar.
    pub fn with_personal_ical(mut self, ical: impl Into<String>) -> Self {
        self.existing_events_personal_ical = Some(ical.into());
        self
    }

    /// Adds a shared calendar.
    pub fn with_shared_ical(mut self, ical: impl Into<String>) -> Self {
        self.existing_events_shared_ical = Some(ical.into());
        self
    }

    /// Adds a JSON calendar.
    pub fn with_gcal_json(mut self, json: Value) -> Self {
        self.existing_events_gcal_json = Some(json);
        self
    }
}
