//! Scenario-level judging.
//!
//! Ties the components together for one [`Scenario`]: ground truth from
//! every calendar source, noisy fixtures to show an agent, and scoring
//! of either a free-text reply or a tool-call transcript. Both answer
//! paths end in the same [`score_scenario`] call.

use chrono::DateTime;
use tracing::{debug, info};

use crate::extract::{blocks_from_tool_calls, extract_blocks, ToolCall};
use crate::models::{CalendarEvent, ConstraintSpec, Scenario, ScoreBreakdown, TimeWindow};
use crate::noise::add_realistic_noise;
use crate::normalize::{normalize_gcal, normalize_ical};
use crate::scoring::score_scenario;

/// Noise seed for the work calendar.
pub const WORK_SEED: u64 = 42;
/// Noise seed for the personal calendar.
pub const PERSONAL_SEED: u64 = 43;
/// Noise seed for the shared calendar.
pub const SHARED_SEED: u64 = 44;

/// 2025-01-20T00:00:00Z
const DEFAULT_WINDOW_START: i64 = 1_737_331_200;
/// 2025-01-24T23:59:59Z
const DEFAULT_WINDOW_END: i64 = 1_737_763_199;

/// Default scoring window: the work week of 2025-01-20.
pub fn default_window() -> TimeWindow {
    TimeWindow::new(
        DateTime::from_timestamp(DEFAULT_WINDOW_START, 0).unwrap_or_default(),
        DateTime::from_timestamp(DEFAULT_WINDOW_END, 0).unwrap_or_default(),
    )
}

/// Window over which existing events are normalized.
///
/// Each bound comes from the spec's date range when set, else from
/// [`default_window`].
pub fn scoring_window(spec: &ConstraintSpec) -> TimeWindow {
    let default = default_window();
    TimeWindow::new(
        spec.date_range_start.unwrap_or(default.start),
        spec.date_range_end.unwrap_or(default.end),
    )
}

/// All existing events of a scenario within its scoring window.
///
/// Sources are concatenated in order: work, personal, shared, JSON.
pub fn ground_truth(scenario: &Scenario) -> Vec<CalendarEvent> {
    let window = scoring_window(&scenario.constraints);
    let (ws, we) = (window.start, window.end);

    let mut events = normalize_ical(&scenario.existing_events_ical, ws, we);
    for ical in [
        &scenario.existing_events_personal_ical,
        &scenario.existing_events_shared_ical,
    ]
    .into_iter()
    .flatten()
    {
        events.extend(normalize_ical(ical, ws, we));
    }
    if let Some(json) = &scenario.existing_events_gcal_json {
        events.extend(normalize_gcal(json, ws, we));
    }

    debug!(scenario = %scenario.name, events = events.len(), "built ground truth");
    events
}

/// Noise-synthesized text calendars of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct NoisyFixtures {
    /// Work calendar.
    pub work: String,
    /// Personal calendar, if the scenario has one.
    pub personal: Option<String>,
    /// Shared calendar, if the scenario has one.
    pub shared: Option<String>,
}

/// Builds the noisy calendars shown to an agent.
pub fn noisy_fixtures(scenario: &Scenario) -> NoisyFixtures {
    NoisyFixtures {
        work: add_realistic_noise(&scenario.existing_events_ical, WORK_SEED),
        personal: scenario
            .existing_events_personal_ical
            .as_deref()
            .map(|ical| add_realistic_noise(ical, PERSONAL_SEED)),
        shared: scenario
            .existing_events_shared_ical
            .as_deref()
            .map(|ical| add_realistic_noise(ical, SHARED_SEED)),
    }
}

/// Scores a free-text reply.
pub fn judge_response(scenario: &Scenario, response: &str) -> ScoreBreakdown {
    let blocks = extract_blocks(response);
    let score = score_scenario(&blocks, &ground_truth(scenario), &scenario.constraints);
    info!(
        scenario = %scenario.name,
        mode = "text",
        blocks = blocks.len(),
        composite = score.composite_score,
        "judged response"
    );
    score
}

/// Scores the last proposal in a tool-call transcript.
pub fn judge_proposal(scenario: &Scenario, calls: &[ToolCall]) -> ScoreBreakdown {
    let blocks = blocks_from_tool_calls(calls);
    let score = score_scenario(&blocks, &ground_truth(scenario), &scenario.constraints);
    info!(
        scenario = %scenario.name,
        mode = "tool",
        blocks = blocks.len(),
        composite = score.composite_score,
        "judged proposal"
    );
    score
}
