//! Judge domain models.
//!
//! Plain data types shared by the normalizer, extractor and scoring
//! engine. None of them carry behavior beyond small derived values.
//!
//! # Roles
//!
//! | Type | Produced by | Consumed by |
//! |------|-------------|-------------|
//! | CalendarEvent | Event normalizer | Scoring engine |
//! | ScheduledBlock | Response extractor / tool call | Scoring engine |
//! | ConstraintSpec | Scenario fixture | Scoring engine |
//! | ScoreBreakdown | Scoring engine | Report layer |

mod calendar;
mod constraint;
mod scenario;
mod schedule;
mod score;

pub use calendar::{overlaps, CalendarEvent, TimeWindow};
pub(crate) use calendar::minutes;
pub use constraint::{ConstraintSpec, CustomRule, WorkingHours};
pub use scenario::Scenario;
pub use schedule::{ScheduledBlock, Violation, ViolationKind};
pub use score::{
    composite_score, ScoreBreakdown, ADHERENCE_WEIGHT, COMPLETENESS_WEIGHT, CORRECTNESS_WEIGHT,
    PERFECTION_BONUS_WEIGHT,
};
