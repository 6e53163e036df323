//! Deterministic schedule judge.
//!
//! Grades schedules proposed by an agent against a scenario's calendars
//! and constraints. Every operation is a pure function of its inputs;
//! the only randomness (noise synthesis) is driven by a caller seed.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `CalendarEvent`, `ScheduledBlock`,
//!   `TimeWindow`, `ConstraintSpec`/`CustomRule`, `ScoreBreakdown`, `Scenario`
//! - **`normalize`**: Calendar text and JSON to canonical occurrences,
//!   with RRULE expansion over a window
//! - **`noise`**: Seeded provider-style noise around clean fixtures
//! - **`extract`**: Proposed blocks from free text or tool calls
//! - **`scoring`**: Correctness, completeness, adherence, composite
//! - **`judge`**: One-call judging of a scenario
//!
//! # Data Flow
//!
//! ```text
//! fixture ──> normalize ──> existing events ──┐
//!    └──────> noise ──> (shown to agent)      ├──> scoring ──> ScoreBreakdown
//! reply / tool calls ──> extract ──> blocks ──┘
//! ```
//!
//! # References
//!
//! - RFC 5545, "Internet Calendaring and Scheduling Core Object Specification"
//! - Google Calendar API v3, Events resource

pub mod error;
pub mod extract;
pub mod judge;
pub mod models;
pub mod noise;
pub mod normalize;
pub mod scoring;
pub mod time;

pub use error::JudgeError;
