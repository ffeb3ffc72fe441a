use luna_core::db::open_db_in_memory;
use luna_core::{
    CycleDate, CycleEntry, CycleSettings, CycleTracker, EntryFields, EntryId, EntryRepository,
    LogAction, Phase, PhaseMarker, RefreshOutcome, RepoError, RepoResult, SqliteEntryRepository,
    Symptom, SymptomLog, UserId, WriteStatus,
};
use std::cell::{Cell, RefCell};
use uuid::Uuid;

fn d(text: &str) -> CycleDate {
    CycleDate::parse(text).unwrap()
}

/// Store double whose writes can be switched off.
#[derive(Default)]
struct FlakyStore {
    entries: RefCell<Vec<CycleEntry>>,
    writes_fail: Cell<bool>,
}

impl EntryRepository for &FlakyStore {
    fn list_entries(&self, user_id: UserId) -> RepoResult<Vec<CycleEntry>> {
        let mut entries = self
            .entries
            .borrow()
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.date);
        Ok(entries)
    }

    fn list_recent_entries(&self, user_id: UserId, limit: u32) -> RepoResult<Vec<CycleEntry>> {
        let mut entries = self.list_entries(user_id)?;
        entries.reverse();
        entries.truncate(limit as usize);
        Ok(entries)
    }

    fn get_entry_by_date(
        &self,
        user_id: UserId,
        date: CycleDate,
    ) -> RepoResult<Option<CycleEntry>> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .find(|entry| entry.user_id == user_id && entry.date == date)
            .cloned())
    }

    fn upsert_entry(
        &self,
        user_id: UserId,
        date: CycleDate,
        fields: &EntryFields,
        cycle_length: u32,
    ) -> RepoResult<EntryId> {
        if self.writes_fail.get() {
            return Err(RepoError::InvalidData("store offline".to_string()));
        }
        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries
            .iter_mut()
            .find(|entry| entry.user_id == user_id && entry.date == date)
        {
            entry.apply_fields(fields);
            return Ok(entry.id);
        }
        let mut entry = CycleEntry::new(user_id, date).with_cycle_length(cycle_length);
        entry.apply_fields(fields);
        let id = entry.id;
        entries.push(entry);
        Ok(id)
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        if self.writes_fail.get() {
            return Err(RepoError::InvalidData("store offline".to_string()));
        }
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

#[test]
fn logging_a_period_persists_and_drives_phase() {
    let conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();
    let mut tracker =
        CycleTracker::open(SqliteEntryRepository::new(&conn), user, CycleSettings::default())
            .unwrap();

    assert!(tracker.apply(d("2024-03-01"), LogAction::Started).is_persisted());
    assert!(tracker.apply(d("2024-03-05"), LogAction::Ended).is_persisted());

    assert_eq!(tracker.entries().len(), 2);
    assert_eq!(tracker.calendar().period_days().len(), 5);

    let reading = tracker.phase_on(d("2024-03-20"));
    assert_eq!(reading.current_day, 20);
    assert_eq!(reading.current_phase, Phase::Pms);
    assert_eq!(reading.days_until_next_period(28), 9);

    let stored = tracker
        .repo()
        .get_entry_by_date(user, d("2024-03-01"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.phase_marker, Some(PhaseMarker::PeriodStart));
    assert_eq!(stored.cycle_length, 28);
}

#[test]
fn inserted_rows_carry_configured_cycle_length() {
    let conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();
    let settings = CycleSettings::new(32).unwrap();
    let mut tracker = CycleTracker::open(SqliteEntryRepository::new(&conn), user, settings).unwrap();

    tracker.apply(d("2024-05-01"), LogAction::Toggle);
    assert_eq!(tracker.entries()[0].cycle_length, 32);
    assert_eq!(tracker.calendar().cycle_length(), 32);
}

#[test]
fn saved_symptoms_survive_refresh() {
    let store = FlakyStore::default();
    let user = Uuid::new_v4();
    let mut tracker = CycleTracker::open(&store, user, CycleSettings::default()).unwrap();
    let log = SymptomLog {
        mood: Some("⚡".to_string()),
        notes: None,
        symptoms: [Symptom::Headache].into_iter().collect(),
    };

    assert!(tracker
        .apply(d("2024-06-10"), LogAction::Save(log.clone()))
        .is_persisted());
    tracker.refresh().unwrap();

    assert_eq!(tracker.symptom_log(d("2024-06-10")), Some(&log));
    assert!(tracker.calendar().period_days().is_empty());
}

#[test]
fn blank_mood_is_saved_as_absent() {
    let conn = open_db_in_memory().unwrap();
    let user = Uuid::new_v4();
    let mut tracker =
        CycleTracker::open(SqliteEntryRepository::new(&conn), user, CycleSettings::default())
            .unwrap();
    let log = SymptomLog {
        mood: Some(" ".to_string()),
        notes: Some("tired".to_string()),
        symptoms: [Symptom::Fatigue].into_iter().collect(),
    };

    assert!(tracker
        .apply(d("2024-06-11"), LogAction::Save(log))
        .is_persisted());

    let shown = tracker.symptom_log(d("2024-06-11")).unwrap();
    assert_eq!(shown.mood, None);
    assert_eq!(shown.notes.as_deref(), Some("tired"));
    let stored = tracker
        .repo()
        .get_entry_by_date(user, d("2024-06-11"))
        .unwrap()
        .unwrap();
    assert_eq!(stored.mood, None);
}

#[test]
fn failed_write_keeps_optimistic_state() {
    let store = FlakyStore::default();
    let user = Uuid::new_v4();
    let mut tracker = CycleTracker::open(&store, user, CycleSettings::default()).unwrap();
    store.writes_fail.set(true);

    let status = tracker.apply(d("2024-07-01"), LogAction::Toggle);
    assert!(matches!(status, WriteStatus::Failed { ref reason } if reason.contains("offline")));
    assert!(tracker.calendar().is_period_day(d("2024-07-01")));
    assert_eq!(tracker.phase_on(d("2024-07-01")).current_phase, Phase::Period);
    assert!(store.entries.borrow().is_empty());
}

#[test]
fn stale_fetch_result_is_ignored() {
    let store = FlakyStore::default();
    let user = Uuid::new_v4();
    let mut tracker = CycleTracker::new(&store, user, CycleSettings::default());

    let older = tracker.begin_refresh();
    let newer = tracker.begin_refresh();
    assert!(newer > older);

    let fresh = vec![CycleEntry::new(user, d("2024-08-02")).with_marker(PhaseMarker::Period)];
    let outdated = vec![CycleEntry::new(user, d("2024-08-01")).with_marker(PhaseMarker::Period)];

    assert_eq!(tracker.complete_refresh(newer, fresh), RefreshOutcome::Applied);
    assert_eq!(
        tracker.complete_refresh(older, outdated),
        RefreshOutcome::Stale
    );
    assert!(tracker.calendar().is_period_day(d("2024-08-02")));
    assert!(!tracker.calendar().is_period_day(d("2024-08-01")));
}

#[test]
fn delete_entry_refreshes_calendar() {
    let store = FlakyStore::default();
    let user = Uuid::new_v4();
    let mut tracker = CycleTracker::open(&store, user, CycleSettings::default()).unwrap();

    let WriteStatus::Persisted(id) = tracker.apply(d("2024-09-03"), LogAction::Toggle) else {
        panic!("toggle should persist");
    };
    assert!(tracker.calendar().is_period_day(d("2024-09-03")));

    assert!(tracker.delete_entry(id).is_persisted());
    assert!(tracker.entries().is_empty());
    assert!(!tracker.calendar().is_period_day(d("2024-09-03")));

    assert!(!tracker.delete_entry(id).is_persisted());
}

#[test]
fn cycle_length_change_is_validated_and_applied() {
    let store = FlakyStore::default();
    let user = Uuid::new_v4();
    let mut tracker = CycleTracker::open(&store, user, CycleSettings::default()).unwrap();
    tracker.apply(d("2024-01-01"), LogAction::Started);

    assert!(tracker.set_cycle_length(40).is_err());
    assert_eq!(tracker.settings().cycle_length(), 28);

    tracker.set_cycle_length(30).unwrap();
    // diffDays = 30 -> last day of a 30-day cycle
    assert_eq!(tracker.phase_on(d("2024-01-30")).current_day, 30);
}
