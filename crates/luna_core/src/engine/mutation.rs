//! Log actions applied to the derived calendar.
//!
//! # Responsibility
//! - Turn one user action on one date into a fresh calendar.
//! - Describe the entry upsert that keeps storage in step with it.
//!
//! # Invariants
//! - The input calendar is never modified.
//! - Every action yields exactly one upsert for the acted-on date.
//! - Eager fills use the same capped walk as reconstruction.
//! - Un-marking a start/end date also removes it from the period days, the
//!   same way `Toggle` does.

use crate::engine::calendar::{fill_span, DerivedCalendar};
use crate::model::date::CycleDate;
use crate::model::entry::{EntryFields, PhaseMarker, SymptomLog};

/// User action on a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogAction {
    /// Flip plain period-day membership.
    Toggle,
    /// Mark (or un-mark) the first day of a period.
    Started,
    /// Mark (or un-mark) the last day of a period.
    Ended,
    /// Attach mood/notes/symptoms without touching markers.
    Save(SymptomLog),
}

impl LogAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Started => "started",
            Self::Ended => "ended",
            Self::Save(_) => "save",
        }
    }
}

/// Upsert the store must receive for an applied action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub date: CycleDate,
    pub fields: EntryFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub calendar: DerivedCalendar,
    pub write: PendingWrite,
}

/// Applies `action` on `date` and returns the updated calendar plus write.
pub fn apply_action(
    calendar: &DerivedCalendar,
    date: CycleDate,
    action: &LogAction,
) -> MutationOutcome {
    let mut next = calendar.clone();

    let fields = match action {
        LogAction::Toggle => {
            if next.period_days.remove(&date) {
                next.start_markers.remove(&date);
                next.end_markers.remove(&date);
                EntryFields::Phase(Some(PhaseMarker::Safe))
            } else {
                next.period_days.insert(date);
                EntryFields::Phase(Some(PhaseMarker::Period))
            }
        }
        LogAction::Started => {
            if next.start_markers.insert(date) {
                next.period_days.insert(date);
                if let Some(end) = next.next_end_on_or_after(date) {
                    next.period_days.extend(fill_span(date, end));
                }
                EntryFields::Phase(Some(PhaseMarker::PeriodStart))
            } else {
                next.start_markers.remove(&date);
                next.period_days.remove(&date);
                EntryFields::Phase(Some(PhaseMarker::Safe))
            }
        }
        LogAction::Ended => {
            if next.end_markers.insert(date) {
                next.period_days.insert(date);
                if let Some(start) = next.latest_start_on_or_before(date) {
                    next.period_days.extend(fill_span(start, date));
                }
                EntryFields::Phase(Some(PhaseMarker::PeriodEnd))
            } else {
                next.end_markers.remove(&date);
                next.period_days.remove(&date);
                EntryFields::Phase(Some(PhaseMarker::Safe))
            }
        }
        LogAction::Save(log) => {
            let log = log.clone().normalized();
            if log.is_empty() {
                next.symptom_logs.remove(&date);
            } else {
                next.symptom_logs.insert(date, log.clone());
            }
            EntryFields::Log(log)
        }
    };

    MutationOutcome {
        calendar: next,
        write: PendingWrite { date, fields },
    }
}
