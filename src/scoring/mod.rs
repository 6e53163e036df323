//! Scoring engine.
//!
//! Grades a proposal against existing events and a [`ConstraintSpec`]
//! along three independent dimensions, then combines them into the
//! composite described in [`crate::models::composite_score`].
//!
//! # Dimensions
//!
//! - **Correctness**: every (block, existing event) pair whose half-open
//!   intervals overlap is one conflict; a block hitting two events is
//!   two conflicts. `max(0, 1 - conflicts / blocks)`, and 0.0 for an
//!   empty proposal.
//! - **Completeness**: `min(1, blocks / required)` when a positive count
//!   is required, else 1.0.
//! - **Constraint adherence**: see [`rules`].
//!
//! Conflict messages lead `constraint_violations`, followed by rule
//! violations in evaluation order. Conflicts are not adherence checks.

pub mod rules;

pub use rules::{evaluate_constraints, ConstraintReport, DURATION_TOLERANCE_MINUTES};

use tracing::debug;

use crate::models::{
    CalendarEvent, ConstraintSpec, ScheduledBlock, ScoreBreakdown, Violation, ViolationKind,
};

/// Finds every (block, existing event) overlap.
pub fn find_conflicts(blocks: &[ScheduledBlock], existing: &[CalendarEvent]) -> Vec<Violation> {
    let mut conflicts = Vec::new();
    for block in blocks {
        for event in existing {
            if block.window().overlaps(&event.window()) {
                conflicts.push(Violation::new(
                    ViolationKind::Conflict,
                    format!(
                        "'{}' ({}-{}) overlaps '{}' ({}-{})",
                        block.title,
                        block.start.format("%a %H:%M"),
                        block.end.format("%H:%M"),
                        event.title,
                        event.start.format("%a %H:%M"),
                        event.end.format("%H:%M"),
                    ),
                ));
            }
        }
    }
    conflicts
}

/// Scores a proposal.
///
/// Never fails; degenerate blocks are scored like any other.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use u_schedule_judge::models::{CalendarEvent, ConstraintSpec, ScheduledBlock};
/// use u_schedule_judge::scoring::score_scenario;
///
/// let at = |h| Utc.with_ymd_and_hms(2025, 1, 20, h, 0, 0).unwrap();
/// let existing = vec![CalendarEvent::new("Standup", at(9), at(10))];
/// let blocks = vec![ScheduledBlock::new("Focus", at(10), at(12))];
/// let spec = ConstraintSpec::new().with_required_blocks(1).with_working_hours(9, 17);
///
/// let score = score_scenario(&blocks, &existing, &spec);
/// assert_eq!(score.correctness, 1.0);
/// assert_eq!(score.composite_score, 100.0);
/// ```
pub fn score_scenario(
    blocks: &[ScheduledBlock],
    existing: &[CalendarEvent],
    spec: &ConstraintSpec,
) -> ScoreBreakdown {
    let required = spec.required_block_count.unwrap_or(0);
    let total = blocks.len();

    let completeness = if required > 0 {
        (total as f64 / f64::from(required)).min(1.0)
    } else {
        1.0
    };

    let conflicts = find_conflicts(blocks, existing);
    let correctness = if total > 0 {
        (1.0 - conflicts.len() as f64 / total as f64).max(0.0)
    } else {
        0.0
    };

    let report = evaluate_constraints(blocks, existing, spec);
    let adherence = report.adherence();

    let conflict_count = conflicts.len();
    let violations: Vec<String> = conflicts
        .iter()
        .chain(report.violations.iter())
        .map(Violation::to_string)
        .collect();

    debug!(
        blocks = total,
        required,
        conflicts = conflict_count,
        checks = report.checks,
        failed = report.violations.len(),
        "scored proposal"
    );

    ScoreBreakdown::new(
        correctness,
        completeness,
        adherence,
        total,
        required,
        conflict_count,
        violations,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CustomRule;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_conflicting_block() {
        let blocks = vec![ScheduledBlock::new("Focus", at(20, 9, 0), at(20, 10, 30))];
        let existing = vec![CalendarEvent::new("Sync", at(20, 10, 0), at(20, 11, 0))];
        let spec = ConstraintSpec::new().with_required_blocks(1);

        let score = score_scenario(&blocks, &existing, &spec);
        assert_eq!(score.correctness, 0.0);
        assert_eq!(score.conflict_count, 1);
        assert_eq!(score.completeness, 1.0);
        assert_eq!(
            score.constraint_violations,
            vec!["CONFLICT: 'Focus' (Mon 09:00-10:30) overlaps 'Sync' (Mon 10:00-11:00)"]
        );
        // 0 + 25 + 20, no bonus
        assert_eq!(score.composite_score, 45.0);
    }

    #[test]
    fn test_outside_working_hours() {
        let blocks = vec![ScheduledBlock::new("Evening", at(20, 18, 0), at(20, 19, 0))];
        let spec = ConstraintSpec::new().with_working_hours(9, 17);

        let score = score_scenario(&blocks, &[], &spec);
        assert!(score.constraint_adherence < 1.0);
        assert!(score
            .constraint_violations
            .iter()
            .any(|v| v.starts_with("WORKING_HOURS")));
    }

    #[test]
    fn test_max_per_day_and_perfect_score() {
        let blocks = vec![
            ScheduledBlock::new("A", at(20, 9, 0), at(20, 10, 0)),
            ScheduledBlock::new("B", at(20, 13, 0), at(20, 14, 0)),
        ];

        let spec = ConstraintSpec::new().with_rule(CustomRule::max_per_day(1));
        let score = score_scenario(&blocks, &[], &spec);
        assert!(score
            .constraint_violations
            .iter()
            .any(|v| v.starts_with("MAX_PER_DAY")));

        let spec = ConstraintSpec::new().with_required_blocks(2);
        let score = score_scenario(&blocks, &[], &spec);
        assert_eq!(score.composite_score, 100.0);
        assert!(score.is_perfect());
    }

    #[test]
    fn test_empty_proposal_scores_zero_correctness() {
        for required in [None, Some(0), Some(3)] {
            let mut spec = ConstraintSpec::new();
            spec.required_block_count = required;
            let score = score_scenario(&[], &[], &spec);
            assert_eq!(score.correctness, 0.0);
            assert_eq!(score.total_blocks, 0);
        }
    }

    #[test]
    fn test_completeness() {
        let block = ScheduledBlock::new("A", at(20, 9, 0), at(20, 10, 0));
        let blocks = vec![block.clone(), block.clone(), block];

        let score = score_scenario(&blocks, &[], &ConstraintSpec::new());
        assert_eq!(score.completeness, 1.0);
        assert_eq!(score.required_blocks, 0);

        let score = score_scenario(&blocks, &[], &ConstraintSpec::new().with_required_blocks(0));
        assert_eq!(score.completeness, 1.0);

        let score = score_scenario(&blocks[..1], &[], &ConstraintSpec::new().with_required_blocks(4));
        assert!((score.completeness - 0.25).abs() < 1e-10);

        // Over-delivery is capped
        let score = score_scenario(&blocks, &[], &ConstraintSpec::new().with_required_blocks(2));
        assert_eq!(score.completeness, 1.0);
    }

    #[test]
    fn test_conflicts_not_deduplicated() {
        let blocks = vec![ScheduledBlock::new("Long", at(20, 9, 0), at(20, 12, 0))];
        let existing = vec![
            CalendarEvent::new("One", at(20, 9, 30), at(20, 10, 0)),
            CalendarEvent::new("Two", at(20, 11, 0), at(20, 11, 30)),
            CalendarEvent::new("Adjacent", at(20, 12, 0), at(20, 13, 0)),
        ];
        let score = score_scenario(&blocks, &existing, &ConstraintSpec::new());
        assert_eq!(score.conflict_count, 2);
        // Clamped at zero
        assert_eq!(score.correctness, 0.0);
    }

    #[test]
    fn test_partial_correctness() {
        let blocks = vec![
            ScheduledBlock::new("A", at(20, 9, 0), at(20, 10, 0)),
            ScheduledBlock::new("B", at(21, 9, 0), at(21, 10, 0)),
            ScheduledBlock::new("C", at(22, 9, 0), at(22, 10, 0)),
            ScheduledBlock::new("D", at(23, 9, 0), at(23, 10, 0)),
        ];
        let existing = vec![CalendarEvent::new("Busy", at(21, 9, 30), at(21, 11, 0))];
        let score = score_scenario(&blocks, &existing, &ConstraintSpec::new());
        assert!((score.correctness - 0.75).abs() < 1e-10);
        // 30 + 25 + 20
        assert_eq!(score.composite_score, 75.0);
    }

    #[test]
    fn test_conflicts_precede_rule_violations() {
        let blocks = vec![ScheduledBlock::new("Late", at(20, 17, 0), at(20, 19, 0))];
        let existing = vec![CalendarEvent::new("Dinner", at(20, 18, 0), at(20, 20, 0))];
        let spec = ConstraintSpec::new().with_working_hours(9, 17);
        let score = score_scenario(&blocks, &existing, &spec);
        assert_eq!(score.constraint_violations.len(), 2);
        assert!(score.constraint_violations[0].starts_with("CONFLICT"));
        assert!(score.constraint_violations[1].starts_with("WORKING_HOURS"));
        // Only the working-hours rule counts toward adherence
        assert_eq!(score.constraint_adherence, 0.0);
    }

    #[test]
    fn test_composite_hundred_when_all_perfect() {
        let blocks = vec![ScheduledBlock::new("A", at(21, 10, 0), at(21, 11, 30))];
        let spec = ConstraintSpec::new()
            .with_required_blocks(1)
            .with_working_hours(9, 17)
            .with_min_duration(90.0)
            .with_date_range(at(20, 0, 0), at(24, 23, 59))
            .with_rule(CustomRule::spread_across_days(1));
        let score = score_scenario(&blocks, &[], &spec);
        assert_eq!(score.constraint_adherence, 1.0);
        assert_eq!(score.composite_score, 100.0);
    }
}
