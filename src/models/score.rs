//! Score breakdown model.
//!
//! # Dimensions
//!
//! | Dimension | Range | Meaning |
//! |-----------|-------|---------|
//! | Correctness | 0..1 | Share of blocks free of conflicts with existing events |
//! | Completeness | 0..1 | Blocks proposed relative to blocks required |
//! | Constraint adherence | 0..1 | Share of rule checks passed |
//! | Composite | 0..100 | Weighted sum plus a perfection bonus |
//!
//! # Composite
//!
//! `100 × (0.40·correctness + 0.25·completeness + 0.20·adherence)`,
//! plus `100 × 0.15·adherence` only when correctness and completeness
//! are both exactly 1.0, rounded to one decimal place.

use serde::{Deserialize, Serialize};

/// Weight of correctness in the composite.
pub const CORRECTNESS_WEIGHT: f64 = 0.40;
/// Weight of completeness in the composite.
pub const COMPLETENESS_WEIGHT: f64 = 0.25;
/// Weight of constraint adherence in the composite.
pub const ADHERENCE_WEIGHT: f64 = 0.20;
/// Weight of the adherence bonus awarded to conflict-free, complete proposals.
pub const PERFECTION_BONUS_WEIGHT: f64 = 0.15;

/// Result of scoring one proposal under one scenario.
///
/// Built once by the scoring engine; the composite is derived at
/// construction and serialized alongside the dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 0..1: no conflicts with existing events.
    pub correctness: f64,
    /// 0..1: required blocks scheduled.
    pub completeness: f64,
    /// 0..1: rule checks satisfied.
    pub constraint_adherence: f64,
    /// Number of proposed blocks.
    pub total_blocks: usize,
    /// Number of blocks required (0 when not specified).
    pub required_blocks: u32,
    /// Number of (block, existing event) overlaps.
    pub conflict_count: usize,
    /// Messages for every conflict and failed check, in discovery order.
    pub constraint_violations: Vec<String>,
    /// Weighted composite, 0..100, one decimal.
    pub composite_score: f64,
}

impl ScoreBreakdown {
    /// Assembles a breakdown and derives its composite score.
    pub fn new(
        correctness: f64,
        completeness: f64,
        constraint_adherence: f64,
        total_blocks: usize,
        required_blocks: u32,
        conflict_count: usize,
        constraint_violations: Vec<String>,
    ) -> Self {
        Self {
            correctness,
            completeness,
            constraint_adherence,
            total_blocks,
            required_blocks,
            conflict_count,
            constraint_violations,
            composite_score: composite_score(correctness, completeness, constraint_adherence),
        }
    }

    /// Whether the proposal earned the perfection bonus.
    pub fn is_perfect(&self) -> bool {
        self.correctness == 1.0 && self.completeness == 1.0
    }
}

/// Weighted composite score in 0..100, rounded to one decimal with
/// ties going to the even digit (6.25 becomes 6.2).
///
/// The bonus uses exact equality on purpose: 0.999 correctness does
/// not earn it.
pub fn composite_score(correctness: f64, completeness: f64, adherence: f64) -> f64 {
    let mut base = correctness * CORRECTNESS_WEIGHT
        + completeness * COMPLETENESS_WEIGHT
        + adherence * ADHERENCE_WEIGHT;
    if correctness == 1.0 && completeness == 1.0 {
        base += adherence * PERFECTION_BONUS_WEIGHT;
    }
    (base * 100.0 * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_is_hundred() {
        assert_eq!(composite_score(1.0, 1.0, 1.0), 100.0);
    }

    #[test]
    fn test_bonus_requires_exact_perfection() {
        // 40 + 25 + 20 + 15 = 100 with bonus; without it 0.999 correctness gives 84.96 → 85.0
        assert_eq!(composite_score(0.999, 1.0, 1.0), 85.0);
        assert_eq!(composite_score(1.0, 0.5, 1.0), 72.5);
    }

    #[test]
    fn test_bonus_scales_with_adherence() {
        // 40 + 25 + 10 + 7.5
        assert_eq!(composite_score(1.0, 1.0, 0.5), 82.5);
    }

    #[test]
    fn test_rounding_ties_to_even() {
        // 0.25 * 25 = 6.25 exactly
        assert_eq!(composite_score(0.0, 0.25, 0.0), 6.2);
        // 0.75 * 25 = 18.75 exactly
        assert_eq!(composite_score(0.0, 0.75, 0.0), 18.8);
    }

    #[test]
    fn test_zero() {
        assert_eq!(composite_score(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_breakdown_derives_composite() {
        let b = ScoreBreakdown::new(0.0, 1.0, 1.0, 1, 1, 1, vec!["CONFLICT: x".into()]);
        assert_eq!(b.composite_score, 45.0);
        assert!(!b.is_perfect());

        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["composite_score"], 45.0);
        assert_eq!(json["conflict_count"], 1);
    }
}
