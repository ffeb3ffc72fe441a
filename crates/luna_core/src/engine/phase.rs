//! Phase calculation for a target date.
//!
//! # Responsibility
//! - Derive the cycle day number and coarse phase for any date.
//!
//! # Invariants
//! - Rules are evaluated in a fixed order; the first match wins:
//!   explicit period day, no history, post-end window, cycle-day bucket.
//! - `current_day` always lies in `1..=cycle_length`.
//! - Missing history degrades to `(1, Safe)`; calculation never fails.
//!
//! Known quirk kept for product review: an explicitly logged period day
//! always reports day 1, whatever the marker-derived day count is.

use crate::engine::calendar::DerivedCalendar;
use crate::model::date::CycleDate;
use serde::{Deserialize, Serialize};

const SAFE_DAYS_AFTER_END: i64 = 7;
const OVULATION_DAYS_AFTER_END: i64 = 11;

const PERIOD_BUCKET_LAST_DAY: u32 = 5;
const SAFE_BUCKET_LAST_DAY: u32 = 12;
const OVULATION_BUCKET_LAST_DAY: u32 = 16;

/// Coarse position of a day in the menstrual cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Period,
    Safe,
    Ovulation,
    Pms,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Period => "period",
            Self::Safe => "safe",
            Self::Ovulation => "ovulation",
            Self::Pms => "pms",
        }
    }
}

/// Result of a phase calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseReading {
    pub current_day: u32,
    pub current_phase: Phase,
}

impl PhaseReading {
    const DEFAULT: Self = Self {
        current_day: 1,
        current_phase: Phase::Safe,
    };

    /// Days until the next expected period, counting today as the last day
    /// of the current cycle when the result is 1.
    pub fn days_until_next_period(&self, cycle_length: u32) -> u32 {
        (cycle_length + 1).saturating_sub(self.current_day)
    }

    pub fn is_period_due_soon(&self, cycle_length: u32) -> bool {
        self.days_until_next_period(cycle_length) <= 1
    }
}

/// Computes day number and phase of `target` from the derived calendar.
pub fn calculate_phase(calendar: &DerivedCalendar, target: CycleDate) -> PhaseReading {
    if calendar.is_period_day(target) {
        return PhaseReading {
            current_day: 1,
            current_phase: Phase::Period,
        };
    }

    let Some(start) = calendar.latest_start_on_or_before(target) else {
        return PhaseReading::DEFAULT;
    };

    let diff_days = target.days_since(start) + 1;
    let current_day = day_in_cycle(diff_days, calendar.cycle_length());

    if let Some(end) = calendar
        .latest_end_on_or_before(target)
        .filter(|end| *end >= start)
    {
        let days_since_end = target.days_since(end);
        if days_since_end > 0 {
            return PhaseReading {
                current_day,
                current_phase: phase_after_end(days_since_end),
            };
        }
    }

    PhaseReading {
        current_day,
        current_phase: phase_for_cycle_day(current_day),
    }
}

/// Wraps a 1-based day offset into `1..=cycle_length`.
fn day_in_cycle(diff_days: i64, cycle_length: u32) -> u32 {
    let cycle_length = i64::from(cycle_length.max(1));
    let wrapped = (diff_days - 1).rem_euclid(cycle_length) + 1;
    u32::try_from(wrapped).unwrap_or(1)
}

fn phase_after_end(days_since_end: i64) -> Phase {
    if days_since_end <= SAFE_DAYS_AFTER_END {
        Phase::Safe
    } else if days_since_end <= OVULATION_DAYS_AFTER_END {
        Phase::Ovulation
    } else {
        Phase::Pms
    }
}

fn phase_for_cycle_day(day: u32) -> Phase {
    if day <= PERIOD_BUCKET_LAST_DAY {
        Phase::Period
    } else if day <= SAFE_BUCKET_LAST_DAY {
        Phase::Safe
    } else if day <= OVULATION_BUCKET_LAST_DAY {
        Phase::Ovulation
    } else {
        Phase::Pms
    }
}

#[cfg(test)]
mod tests {
    use super::{day_in_cycle, phase_after_end, phase_for_cycle_day, Phase, PhaseReading};

    #[test]
    fn day_in_cycle_wraps_across_multiple_cycles() {
        assert_eq!(day_in_cycle(1, 28), 1);
        assert_eq!(day_in_cycle(28, 28), 28);
        assert_eq!(day_in_cycle(29, 28), 1);
        assert_eq!(day_in_cycle(35, 28), 7);
        assert_eq!(day_in_cycle(57, 28), 1);
    }

    #[test]
    fn day_in_cycle_tolerates_zero_length() {
        assert_eq!(day_in_cycle(10, 0), 1);
    }

    #[test]
    fn cycle_day_buckets_have_inclusive_upper_bounds() {
        assert_eq!(phase_for_cycle_day(5), Phase::Period);
        assert_eq!(phase_for_cycle_day(6), Phase::Safe);
        assert_eq!(phase_for_cycle_day(12), Phase::Safe);
        assert_eq!(phase_for_cycle_day(13), Phase::Ovulation);
        assert_eq!(phase_for_cycle_day(16), Phase::Ovulation);
        assert_eq!(phase_for_cycle_day(17), Phase::Pms);
    }

    #[test]
    fn post_end_windows() {
        assert_eq!(phase_after_end(1), Phase::Safe);
        assert_eq!(phase_after_end(7), Phase::Safe);
        assert_eq!(phase_after_end(8), Phase::Ovulation);
        assert_eq!(phase_after_end(11), Phase::Ovulation);
        assert_eq!(phase_after_end(12), Phase::Pms);
    }

    #[test]
    fn next_period_countdown() {
        let reading = PhaseReading {
            current_day: 20,
            current_phase: Phase::Pms,
        };
        assert_eq!(reading.days_until_next_period(28), 9);
        assert!(!reading.is_period_due_soon(28));

        let last_day = PhaseReading {
            current_day: 28,
            current_phase: Phase::Pms,
        };
        assert_eq!(last_day.days_until_next_period(28), 1);
        assert!(last_day.is_period_due_soon(28));
    }
}
