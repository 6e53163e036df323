//! Constraint rule evaluation.
//!
//! Every evaluation of a rule against an applicable subject (a block, a
//! block/interval pair, a date, or the proposal as a whole) is one
//! check. A failed check records a [`Violation`].
//!
//! # Checks per rule
//!
//! | Rule | Checks | Fails when |
//! |------|--------|------------|
//! | working_hours | one per block | start hour < start, or end hour (rounded up on minutes) > end |
//! | min_duration_minutes | one per block | duration < min - 1 |
//! | max_duration_minutes | one per block | duration > max + 1 |
//! | date_range | one per block (both bounds required) | starts before start, or ends after end |
//! | time_window | one per block | start hour < start, or end hour > end (no rounding) |
//! | min_buffer_minutes | one per non-overlapping (block, other interval) pair | gap < value |
//! | max_per_day | one per date with blocks | count > value |
//! | spread_across_days | one | distinct dates < min_days |
//! | blocked_dates | one per block | start date is blocked |

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Timelike, Utc};

use crate::models::{
    minutes, CalendarEvent, ConstraintSpec, CustomRule, ScheduledBlock, TimeWindow, Violation,
    ViolationKind, WorkingHours,
};

/// Tolerance applied to duration bounds, in minutes.
pub const DURATION_TOLERANCE_MINUTES: f64 = 1.0;

/// Outcome of evaluating a spec's rules against a proposal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintReport {
    /// Number of rule evaluations performed.
    pub checks: usize,
    /// Failed evaluations, in evaluation order.
    pub violations: Vec<Violation>,
}

impl ConstraintReport {
    /// Fraction of checks passed; 1.0 when nothing was checked.
    pub fn adherence(&self) -> f64 {
        if self.checks == 0 {
            return 1.0;
        }
        (1.0 - self.violations.len() as f64 / self.checks as f64).max(0.0)
    }

    fn check(&mut self, passed: bool, violation: impl FnOnce() -> Violation) {
        self.checks += 1;
        if !passed {
            self.violations.push(violation());
        }
    }
}

/// Evaluates every active rule of `spec`.
///
/// Order: working hours, durations (min then max per block), date
/// range, then custom rules in list order.
pub fn evaluate_constraints(
    blocks: &[ScheduledBlock],
    existing: &[CalendarEvent],
    spec: &ConstraintSpec,
) -> ConstraintReport {
    let mut report = ConstraintReport::default();

    if let Some(wh) = spec.working_hours {
        check_working_hours(blocks, wh, &mut report);
    }
    check_durations(
        blocks,
        spec.min_duration_minutes,
        spec.max_duration_minutes,
        &mut report,
    );
    if let (Some(start), Some(end)) = (spec.date_range_start, spec.date_range_end) {
        check_date_range(blocks, start, end, &mut report);
    }
    for rule in &spec.custom_rules {
        check_custom_rule(rule, blocks, existing, &mut report);
    }

    report
}

fn check_working_hours(blocks: &[ScheduledBlock], wh: WorkingHours, report: &mut ConstraintReport) {
    for block in blocks {
        let start_hour = block.start.hour();
        let end_hour = block.end.hour() + u32::from(block.end.minute() > 0);
        report.check(
            start_hour >= wh.start_hour && end_hour <= wh.end_hour,
            || {
                Violation::new(
                    ViolationKind::WorkingHours,
                    format!(
                        "'{}' at {}-{} outside {}:00-{}:00",
                        block.title,
                        block.start.format("%H:%M"),
                        block.end.format("%H:%M"),
                        wh.start_hour,
                        wh.end_hour
                    ),
                )
            },
        );
    }
}

fn check_durations(
    blocks: &[ScheduledBlock],
    min: Option<f64>,
    max: Option<f64>,
    report: &mut ConstraintReport,
) {
    for block in blocks {
        let duration = block.duration_minutes();
        if let Some(min) = min {
            report.check(duration >= min - DURATION_TOLERANCE_MINUTES, || {
                Violation::new(
                    ViolationKind::Duration,
                    format!("'{}' is {duration:.0}min, minimum is {min}min", block.title),
                )
            });
        }
        if let Some(max) = max {
            report.check(duration <= max + DURATION_TOLERANCE_MINUTES, || {
                Violation::new(
                    ViolationKind::Duration,
                    format!("'{}' is {duration:.0}min, maximum is {max}min", block.title),
                )
            });
        }
    }
}

fn check_date_range(
    blocks: &[ScheduledBlock],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    report: &mut ConstraintReport,
) {
    for block in blocks {
        report.check(block.start >= start && block.end <= end, || {
            Violation::new(
                ViolationKind::DateRange,
                format!(
                    "'{}' is outside {}-{}",
                    block.title,
                    start.date_naive(),
                    end.date_naive()
                ),
            )
        });
    }
}

fn check_custom_rule(
    rule: &CustomRule,
    blocks: &[ScheduledBlock],
    existing: &[CalendarEvent],
    report: &mut ConstraintReport,
) {
    match rule {
        CustomRule::TimeWindow {
            start_hour,
            end_hour,
        } => {
            for block in blocks {
                let passed = block.start.hour() >= *start_hour && block.end.hour() <= *end_hour;
                report.check(passed, || {
                    Violation::new(
                        ViolationKind::TimeWindow,
                        format!(
                            "'{}' at {} outside {start_hour}:00-{end_hour}:00",
                            block.title,
                            block.start.format("%H:%M")
                        ),
                    )
                });
            }
        }

        CustomRule::MinBufferMinutes { value } => {
            // Existing events first, then proposed blocks
            let others: Vec<(TimeWindow, &str)> = existing
                .iter()
                .map(|e| (e.window(), e.title.as_str()))
                .chain(blocks.iter().map(|b| (b.window(), b.title.as_str())))
                .collect();

            for block in blocks {
                let window = block.window();
                for (other, title) in &others {
                    if *other == window {
                        continue;
                    }
                    let Some(gap) = window.gap_to(other) else {
                        continue;
                    };
                    let gap = minutes(gap);
                    report.check(gap >= *value, || {
                        Violation::new(
                            ViolationKind::Buffer,
                            format!(
                                "'{}' has only {gap:.0}min gap to '{title}', need {value}min",
                                block.title
                            ),
                        )
                    });
                }
            }
        }

        CustomRule::MaxPerDay { value } => {
            for (day, count) in blocks_per_day(blocks) {
                report.check(count <= *value, || {
                    Violation::new(
                        ViolationKind::MaxPerDay,
                        format!("{count} blocks on {day}, max is {value}"),
                    )
                });
            }
        }

        CustomRule::SpreadAcrossDays { min_days } => {
            let days = blocks_per_day(blocks).len();
            report.check(days >= *min_days, || {
                Violation::new(
                    ViolationKind::Spread,
                    format!("blocks on {days} days, need at least {min_days}"),
                )
            });
        }

        CustomRule::BlockedDates { dates, description } => {
            let blocked: HashSet<&str> = dates.iter().map(|d| d.trim()).collect();
            for block in blocks {
                let date = block.date_key().format("%Y-%m-%d").to_string();
                report.check(!blocked.contains(date.as_str()), || {
                    Violation::new(
                        ViolationKind::BlockedDate,
                        format!(
                            "'{}' on {date} is on a blocked date ({})",
                            block.title,
                            description.as_deref().unwrap_or_default()
                        ),
                    )
                });
            }
        }
    }
}

/// Block counts per start date, in order of first appearance.
fn blocks_per_day(blocks: &[ScheduledBlock]) -> Vec<(NaiveDate, usize)> {
    let mut days: Vec<(NaiveDate, usize)> = Vec::new();
    for block in blocks {
        let key = block.date_key();
        match days.iter_mut().find(|(day, _)| *day == key) {
            Some((_, count)) => *count += 1,
            None => days.push((key, 1)),
        }
    }
    days
}
