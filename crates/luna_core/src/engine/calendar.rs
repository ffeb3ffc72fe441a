//! Calendar reconstruction from stored entries.
//!
//! # Responsibility
//! - Bucket entries into start markers, end markers and seed period days.
//! - Fill the span between each start marker and its next end marker.
//!
//! # Invariants
//! - A fill never covers more than `MAX_FILL_DAYS` consecutive days.
//! - Reconstruction is deterministic and independent of entry order.

use crate::model::date::CycleDate;
use crate::model::entry::{CycleEntry, PhaseMarker, SymptomLog};
use crate::settings::DEFAULT_CYCLE_LENGTH;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Upper bound on days covered by one start/end fill.
pub const MAX_FILL_DAYS: usize = 10;

/// In-memory view used for phase computation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedCalendar {
    pub(super) period_days: BTreeSet<CycleDate>,
    pub(super) start_markers: BTreeSet<CycleDate>,
    pub(super) end_markers: BTreeSet<CycleDate>,
    pub(super) symptom_logs: BTreeMap<CycleDate, SymptomLog>,
    pub(super) cycle_length: u32,
}

impl Default for DerivedCalendar {
    fn default() -> Self {
        Self::empty(DEFAULT_CYCLE_LENGTH)
    }
}

impl DerivedCalendar {
    pub fn empty(cycle_length: u32) -> Self {
        Self {
            period_days: BTreeSet::new(),
            start_markers: BTreeSet::new(),
            end_markers: BTreeSet::new(),
            symptom_logs: BTreeMap::new(),
            cycle_length: normalize_cycle_length(cycle_length),
        }
    }

    /// Builds a calendar from already-materialized sets.
    ///
    /// No fill is applied; callers pass the final period-day membership.
    pub fn from_parts(
        period_days: impl IntoIterator<Item = CycleDate>,
        start_markers: impl IntoIterator<Item = CycleDate>,
        end_markers: impl IntoIterator<Item = CycleDate>,
        cycle_length: u32,
    ) -> Self {
        Self {
            period_days: period_days.into_iter().collect(),
            start_markers: start_markers.into_iter().collect(),
            end_markers: end_markers.into_iter().collect(),
            symptom_logs: BTreeMap::new(),
            cycle_length: normalize_cycle_length(cycle_length),
        }
    }

    /// Returns the same calendar with a different configured cycle length.
    pub fn with_cycle_length(mut self, cycle_length: u32) -> Self {
        self.cycle_length = normalize_cycle_length(cycle_length);
        self
    }

    pub fn period_days(&self) -> &BTreeSet<CycleDate> {
        &self.period_days
    }

    pub fn start_markers(&self) -> &BTreeSet<CycleDate> {
        &self.start_markers
    }

    pub fn end_markers(&self) -> &BTreeSet<CycleDate> {
        &self.end_markers
    }

    pub fn symptom_logs(&self) -> &BTreeMap<CycleDate, SymptomLog> {
        &self.symptom_logs
    }

    pub fn symptom_log(&self, date: CycleDate) -> Option<&SymptomLog> {
        self.symptom_logs.get(&date)
    }

    pub fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    pub fn is_period_day(&self, date: CycleDate) -> bool {
        self.period_days.contains(&date)
    }

    pub fn is_start_marker(&self, date: CycleDate) -> bool {
        self.start_markers.contains(&date)
    }

    pub fn is_end_marker(&self, date: CycleDate) -> bool {
        self.end_markers.contains(&date)
    }

    /// Latest start marker on or before `date`.
    pub fn latest_start_on_or_before(&self, date: CycleDate) -> Option<CycleDate> {
        self.start_markers.range(..=date).next_back().copied()
    }

    /// Latest end marker on or before `date`.
    pub fn latest_end_on_or_before(&self, date: CycleDate) -> Option<CycleDate> {
        self.end_markers.range(..=date).next_back().copied()
    }

    /// Earliest end marker on or after `date`.
    pub fn next_end_on_or_after(&self, date: CycleDate) -> Option<CycleDate> {
        self.end_markers.range(date..).next().copied()
    }
}

/// Walks `[start, end]` day by day, stopping after `MAX_FILL_DAYS` days.
///
/// A reversed range yields nothing.
pub fn fill_span(start: CycleDate, end: CycleDate) -> Vec<CycleDate> {
    let mut days = Vec::new();
    let mut cursor = Some(start);
    while let Some(day) = cursor {
        if day > end || days.len() >= MAX_FILL_DAYS {
            break;
        }
        days.push(day);
        cursor = day.succ();
    }
    days
}

/// Rebuilds the derived calendar for one user's entries, in any order.
///
/// The cycle length comes from the most recent entry; callers holding
/// settings override it with [`DerivedCalendar::with_cycle_length`].
pub fn reconstruct(entries: &[CycleEntry]) -> DerivedCalendar {
    let mut period_days = BTreeSet::new();
    let mut start_markers = BTreeSet::new();
    let mut end_markers = BTreeSet::new();
    let mut symptom_logs = BTreeMap::new();
    let mut latest: Option<&CycleEntry> = None;

    for entry in entries {
        match entry.phase_marker {
            Some(PhaseMarker::PeriodStart) => {
                start_markers.insert(entry.date);
            }
            Some(PhaseMarker::PeriodEnd) => {
                end_markers.insert(entry.date);
            }
            _ => {}
        }
        if entry.phase_marker.is_some_and(PhaseMarker::is_period_day) {
            period_days.insert(entry.date);
        }

        let log = entry.symptom_log();
        if !log.is_empty() {
            symptom_logs.insert(entry.date, log);
        }

        if latest.map_or(true, |current| entry.date >= current.date) {
            latest = Some(entry);
        }
    }

    for start in &start_markers {
        if let Some(end) = end_markers.range(*start..).next() {
            period_days.extend(fill_span(*start, *end));
        }
    }

    DerivedCalendar {
        period_days,
        start_markers,
        end_markers,
        symptom_logs,
        cycle_length: latest.map_or(DEFAULT_CYCLE_LENGTH, |entry| {
            normalize_cycle_length(entry.cycle_length)
        }),
    }
}

fn normalize_cycle_length(cycle_length: u32) -> u32 {
    if cycle_length == 0 {
        DEFAULT_CYCLE_LENGTH
    } else {
        cycle_length
    }
}
