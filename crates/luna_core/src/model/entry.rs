//! Cycle entry domain model.
//!
//! # Responsibility
//! - Define the per-(user, date) record logged by the user.
//! - Define phase marker and symptom vocabularies.
//! - Describe the column groups a single upsert may touch.
//!
//! # Invariants
//! - `cycle_length` is never zero.
//! - `mood`, when set, is a non-blank symbol code.
//! - `symptoms` is a set; insertion order carries no meaning.

use crate::model::date::CycleDate;
use crate::settings::DEFAULT_CYCLE_LENGTH;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one stored entry row.
pub type EntryId = Uuid;

/// Identifier issued by the authentication provider.
pub type UserId = Uuid;

/// What kind of boundary or state a logged date represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseMarker {
    PeriodStart,
    PeriodEnd,
    /// In period without being a boundary.
    Period,
    /// Explicitly cleared.
    Safe,
}

impl PhaseMarker {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PeriodStart => "period_start",
            Self::PeriodEnd => "period_end",
            Self::Period => "period",
            Self::Safe => "safe",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "period_start" => Some(Self::PeriodStart),
            "period_end" => Some(Self::PeriodEnd),
            "period" => Some(Self::Period),
            "safe" => Some(Self::Safe),
            _ => None,
        }
    }

    /// Whether a date carrying this marker is itself a period day.
    pub fn is_period_day(self) -> bool {
        matches!(self, Self::PeriodStart | Self::PeriodEnd | Self::Period)
    }
}

/// Fixed symptom vocabulary offered by the log sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    Cramps,
    Headache,
    Bloating,
    Fatigue,
    Acne,
    Cravings,
}

impl Symptom {
    pub const ALL: [Symptom; 6] = [
        Self::Cramps,
        Self::Headache,
        Self::Bloating,
        Self::Fatigue,
        Self::Acne,
        Self::Cravings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cramps => "cramps",
            Self::Headache => "headache",
            Self::Bloating => "bloating",
            Self::Fatigue => "fatigue",
            Self::Acne => "acne",
            Self::Cravings => "cravings",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|symptom| symptom.as_str() == normalized)
    }
}

/// Mood/notes/symptoms attached to one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymptomLog {
    pub mood: Option<String>,
    pub notes: Option<String>,
    pub symptoms: BTreeSet<Symptom>,
}

impl SymptomLog {
    /// True when nothing worth showing is recorded.
    pub fn is_empty(&self) -> bool {
        is_blank(self.mood.as_deref()) && is_blank(self.notes.as_deref()) && self.symptoms.is_empty()
    }

    /// Drops whitespace-only mood and notes so they are never stored.
    pub fn normalized(mut self) -> Self {
        if is_blank(self.mood.as_deref()) {
            self.mood = None;
        }
        if is_blank(self.notes.as_deref()) {
            self.notes = None;
        }
        self
    }
}

fn is_blank(text: Option<&str>) -> bool {
    text.map_or(true, |text| text.trim().is_empty())
}

/// Column group written by one upsert.
///
/// Marker writes and symptom-log writes never overwrite each other's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFields {
    Phase(Option<PhaseMarker>),
    Log(SymptomLog),
}

/// Validation failure for entry writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    ZeroCycleLength,
    BlankMood,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroCycleLength => write!(f, "cycle_length must be greater than zero"),
            Self::BlankMood => write!(f, "mood must not be blank when set"),
        }
    }
}

impl Error for EntryValidationError {}

/// One stored row: a user's log for a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleEntry {
    pub id: EntryId,
    pub user_id: UserId,
    pub date: CycleDate,
    pub phase_marker: Option<PhaseMarker>,
    pub mood: Option<String>,
    pub notes: Option<String>,
    pub symptoms: BTreeSet<Symptom>,
    /// Configured average cycle length when the row was created.
    pub cycle_length: u32,
}

impl CycleEntry {
    /// Creates an empty entry with a generated ID and default cycle length.
    pub fn new(user_id: UserId, date: CycleDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            date,
            phase_marker: None,
            mood: None,
            notes: None,
            symptoms: BTreeSet::new(),
            cycle_length: DEFAULT_CYCLE_LENGTH,
        }
    }

    pub fn with_marker(mut self, marker: PhaseMarker) -> Self {
        self.phase_marker = Some(marker);
        self
    }

    pub fn with_cycle_length(mut self, cycle_length: u32) -> Self {
        self.cycle_length = cycle_length;
        self
    }

    /// Projects the mood/notes/symptoms columns.
    pub fn symptom_log(&self) -> SymptomLog {
        SymptomLog {
            mood: self.mood.clone(),
            notes: self.notes.clone(),
            symptoms: self.symptoms.clone(),
        }
    }

    /// Overwrites only the column group named by `fields`.
    pub fn apply_fields(&mut self, fields: &EntryFields) {
        match fields {
            EntryFields::Phase(marker) => self.phase_marker = *marker,
            EntryFields::Log(log) => {
                self.mood = log.mood.clone();
                self.notes = log.notes.clone();
                self.symptoms = log.symptoms.clone();
            }
        }
    }

    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.cycle_length == 0 {
            return Err(EntryValidationError::ZeroCycleLength);
        }
        if self
            .mood
            .as_deref()
            .is_some_and(|mood| mood.trim().is_empty())
        {
            return Err(EntryValidationError::BlankMood);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CycleEntry, EntryFields, EntryValidationError, PhaseMarker, Symptom, SymptomLog};
    use crate::model::date::CycleDate;
    use uuid::Uuid;

    #[test]
    fn marker_text_roundtrips_and_rejects_unknown() {
        for marker in [
            PhaseMarker::PeriodStart,
            PhaseMarker::PeriodEnd,
            PhaseMarker::Period,
            PhaseMarker::Safe,
        ] {
            assert_eq!(PhaseMarker::parse(marker.as_str()), Some(marker));
        }
        assert_eq!(PhaseMarker::parse("luteal"), None);
    }

    #[test]
    fn only_period_markers_seed_period_days() {
        assert!(PhaseMarker::PeriodStart.is_period_day());
        assert!(PhaseMarker::PeriodEnd.is_period_day());
        assert!(PhaseMarker::Period.is_period_day());
        assert!(!PhaseMarker::Safe.is_period_day());
    }

    #[test]
    fn symptom_parse_is_case_insensitive() {
        assert_eq!(Symptom::parse(" Cramps "), Some(Symptom::Cramps));
        assert_eq!(Symptom::parse("BLOATING"), Some(Symptom::Bloating));
        assert_eq!(Symptom::parse("nausea"), None);
    }

    #[test]
    fn blank_notes_alone_count_as_empty_log() {
        let log = SymptomLog {
            notes: Some("   ".to_string()),
            ..SymptomLog::default()
        };
        assert!(log.is_empty());
    }

    #[test]
    fn normalized_drops_blank_mood_and_notes() {
        let log = SymptomLog {
            mood: Some(" ".to_string()),
            notes: Some("".to_string()),
            symptoms: [Symptom::Acne].into_iter().collect(),
        }
        .normalized();
        assert_eq!(log.mood, None);
        assert_eq!(log.notes, None);
        assert!(!log.is_empty());

        let kept = SymptomLog {
            mood: Some("calm".to_string()),
            ..SymptomLog::default()
        }
        .normalized();
        assert_eq!(kept.mood.as_deref(), Some("calm"));
    }

    #[test]
    fn apply_fields_touches_only_its_column_group() {
        let date = CycleDate::parse("2024-05-02").unwrap();
        let mut entry = CycleEntry::new(Uuid::new_v4(), date).with_marker(PhaseMarker::Period);
        entry.apply_fields(&EntryFields::Log(SymptomLog {
            mood: Some("🌸".to_string()),
            notes: None,
            symptoms: [Symptom::Fatigue].into_iter().collect(),
        }));
        assert_eq!(entry.phase_marker, Some(PhaseMarker::Period));
        assert_eq!(entry.mood.as_deref(), Some("🌸"));

        entry.apply_fields(&EntryFields::Phase(Some(PhaseMarker::Safe)));
        assert_eq!(entry.phase_marker, Some(PhaseMarker::Safe));
        assert!(entry.symptoms.contains(&Symptom::Fatigue));
    }

    #[test]
    fn validate_rejects_zero_cycle_length_and_blank_mood() {
        let date = CycleDate::parse("2024-05-02").unwrap();
        let entry = CycleEntry::new(Uuid::new_v4(), date).with_cycle_length(0);
        assert_eq!(entry.validate(), Err(EntryValidationError::ZeroCycleLength));

        let mut entry = CycleEntry::new(Uuid::new_v4(), date);
        entry.mood = Some(" ".to_string());
        assert_eq!(entry.validate(), Err(EntryValidationError::BlankMood));
    }
}
