//! Per-user cycle tracking controller.
//!
//! # Responsibility
//! - Hold the derived calendar for one user and rebuild it from the store.
//! - Apply log actions optimistically, then persist them.
//!
//! # Invariants
//! - Local state is updated before the write is attempted.
//! - A failed write is logged, keeps local state, and is never retried.
//! - A fetch result older than the newest applied one is discarded.
//! - Free-text fields (mood, notes) never reach the logs.

use crate::engine::calendar::{reconstruct, DerivedCalendar};
use crate::engine::mutation::{apply_action, LogAction};
use crate::engine::phase::{calculate_phase, PhaseReading};
use crate::model::date::CycleDate;
use crate::model::entry::{CycleEntry, EntryId, SymptomLog, UserId};
use crate::repo::entry_repo::{EntryRepository, RepoResult};
use crate::settings::{CycleSettings, SettingsError};
use log::{debug, error, info, warn};

/// Monotonic handle for one fetch of the entry set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket {
    tick: u64,
}

impl RefreshTicket {
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer fetch already landed; this result was dropped.
    Stale,
}

/// Outcome of a store write issued by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    Persisted(EntryId),
    Failed { reason: String },
}

impl WriteStatus {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }
}

/// Application state for one signed-in user.
pub struct CycleTracker<R: EntryRepository> {
    repo: R,
    user_id: UserId,
    settings: CycleSettings,
    calendar: DerivedCalendar,
    entries: Vec<CycleEntry>,
    issued_tick: u64,
    applied_tick: u64,
}

impl<R: EntryRepository> CycleTracker<R> {
    /// Creates a tracker with an empty calendar; call [`Self::refresh`] to load.
    pub fn new(repo: R, user_id: UserId, settings: CycleSettings) -> Self {
        Self {
            repo,
            user_id,
            settings,
            calendar: DerivedCalendar::empty(settings.cycle_length()),
            entries: Vec::new(),
            issued_tick: 0,
            applied_tick: 0,
        }
    }

    /// Creates a tracker and performs the initial fetch.
    pub fn open(repo: R, user_id: UserId, settings: CycleSettings) -> RepoResult<Self> {
        let mut tracker = Self::new(repo, user_id, settings);
        tracker.refresh()?;
        Ok(tracker)
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn settings(&self) -> CycleSettings {
        self.settings
    }

    pub fn calendar(&self) -> &DerivedCalendar {
        &self.calendar
    }

    /// Entries as of the last applied fetch.
    pub fn entries(&self) -> &[CycleEntry] {
        &self.entries
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Issues a ticket for a fetch about to start.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_tick += 1;
        RefreshTicket {
            tick: self.issued_tick,
        }
    }

    /// Installs fetched entries unless a newer fetch was already applied.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        entries: Vec<CycleEntry>,
    ) -> RefreshOutcome {
        if ticket.tick <= self.applied_tick {
            debug!(
                "event=calendar_refresh module=service status=stale tick={} applied_tick={}",
                ticket.tick, self.applied_tick
            );
            return RefreshOutcome::Stale;
        }

        self.calendar = reconstruct(&entries).with_cycle_length(self.settings.cycle_length());
        self.entries = entries;
        self.applied_tick = ticket.tick;
        debug!(
            "event=calendar_refresh module=service status=ok tick={} entries={} period_days={}",
            ticket.tick,
            self.entries.len(),
            self.calendar.period_days().len()
        );
        RefreshOutcome::Applied
    }

    /// Re-fetches all entries and rebuilds the calendar.
    pub fn refresh(&mut self) -> RepoResult<RefreshOutcome> {
        let ticket = self.begin_refresh();
        match self.repo.list_entries(self.user_id) {
            Ok(entries) => Ok(self.complete_refresh(ticket, entries)),
            Err(err) => {
                error!(
                    "event=calendar_refresh module=service status=error tick={} error={err}",
                    ticket.tick
                );
                Err(err)
            }
        }
    }

    /// Applies a log action locally, persists it, and refreshes on success.
    pub fn apply(&mut self, date: CycleDate, action: LogAction) -> WriteStatus {
        let outcome = apply_action(&self.calendar, date, &action);
        self.calendar = outcome.calendar;

        let write = outcome.write;
        match self.repo.upsert_entry(
            self.user_id,
            write.date,
            &write.fields,
            self.settings.cycle_length(),
        ) {
            Ok(id) => {
                info!(
                    "event=log_action module=service status=ok action={} date={}",
                    action.name(),
                    write.date
                );
                self.refresh_after_write();
                WriteStatus::Persisted(id)
            }
            Err(err) => {
                error!(
                    "event=log_action module=service status=error action={} date={} error={err}",
                    action.name(),
                    write.date
                );
                WriteStatus::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Deletes one stored entry and refreshes on success.
    pub fn delete_entry(&mut self, id: EntryId) -> WriteStatus {
        match self.repo.delete_entry(id) {
            Ok(()) => {
                info!("event=entry_delete module=service status=ok");
                self.refresh_after_write();
                WriteStatus::Persisted(id)
            }
            Err(err) => {
                error!("event=entry_delete module=service status=error error={err}");
                WriteStatus::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn phase_on(&self, date: CycleDate) -> PhaseReading {
        calculate_phase(&self.calendar, date)
    }

    pub fn phase_today(&self) -> PhaseReading {
        self.phase_on(CycleDate::today_local())
    }

    pub fn symptom_log(&self, date: CycleDate) -> Option<&SymptomLog> {
        self.calendar.symptom_log(date)
    }

    /// Changes the configured cycle length used for day arithmetic.
    pub fn set_cycle_length(&mut self, cycle_length: u32) -> Result<(), SettingsError> {
        self.settings = CycleSettings::new(cycle_length)?;
        self.calendar = self.calendar.clone().with_cycle_length(cycle_length);
        Ok(())
    }

    fn refresh_after_write(&mut self) {
        if let Err(err) = self.refresh() {
            warn!("event=calendar_refresh module=service status=skipped reason=fetch_failed error={err}");
        }
    }
}
