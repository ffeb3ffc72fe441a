//! Cycle entry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - List a user's entries and upsert/delete single rows.
//!
//! # Invariants
//! - One row per (user, date); upserts update in place when a row exists.
//! - Inserted rows carry the caller's current cycle length.
//! - An upsert only touches the column group named by `EntryFields`.

use crate::db::DbError;
use crate::model::date::CycleDate;
use crate::model::entry::{
    CycleEntry, EntryFields, EntryId, EntryValidationError, PhaseMarker, Symptom, UserId,
};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    entry_date,
    phase_marker,
    mood,
    notes,
    symptoms,
    cycle_length
FROM cycle_entries";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entry and profile persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(EntryValidationError),
    Db(DbError),
    NotFound(EntryId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "cycle entry not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store contract consumed by the calendar engine and tracker.
pub trait EntryRepository {
    /// All entries of one user, ascending by date.
    fn list_entries(&self, user_id: UserId) -> RepoResult<Vec<CycleEntry>>;
    /// Most recent entries first, at most `limit` rows.
    fn list_recent_entries(&self, user_id: UserId, limit: u32) -> RepoResult<Vec<CycleEntry>>;
    fn get_entry_by_date(&self, user_id: UserId, date: CycleDate)
        -> RepoResult<Option<CycleEntry>>;
    /// Updates the row for (user, date) or inserts one carrying `cycle_length`.
    fn upsert_entry(
        &self,
        user_id: UserId,
        date: CycleDate,
        fields: &EntryFields,
        cycle_length: u32,
    ) -> RepoResult<EntryId>;
    fn delete_entry(&self, id: EntryId) -> RepoResult<()>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_entry(&self, entry: &CycleEntry) -> RepoResult<()> {
        entry.validate()?;
        self.conn.execute(
            "INSERT INTO cycle_entries (
                id,
                user_id,
                entry_date,
                phase_marker,
                mood,
                notes,
                symptoms,
                cycle_length
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                entry.id.to_string(),
                entry.user_id.to_string(),
                entry.date.to_string(),
                entry.phase_marker.map(PhaseMarker::as_str),
                entry.mood.as_deref(),
                entry.notes.as_deref(),
                symptoms_to_db(&entry.symptoms)?,
                entry.cycle_length,
            ],
        )?;
        Ok(())
    }

    fn update_fields(&self, id: EntryId, fields: &EntryFields) -> RepoResult<()> {
        let changed = match fields {
            EntryFields::Phase(marker) => self.conn.execute(
                "UPDATE cycle_entries
                 SET
                    phase_marker = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1;",
                params![id.to_string(), marker.map(PhaseMarker::as_str)],
            )?,
            EntryFields::Log(log) => {
                if log.mood.as_deref().is_some_and(|mood| mood.trim().is_empty()) {
                    return Err(EntryValidationError::BlankMood.into());
                }
                self.conn.execute(
                    "UPDATE cycle_entries
                     SET
                        mood = ?2,
                        notes = ?3,
                        symptoms = ?4,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1;",
                    params![
                        id.to_string(),
                        log.mood.as_deref(),
                        log.notes.as_deref(),
                        symptoms_to_db(&log.symptoms)?,
                    ],
                )?
            }
        };

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn list_entries(&self, user_id: UserId) -> RepoResult<Vec<CycleEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY entry_date ASC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn list_recent_entries(&self, user_id: UserId, limit: u32) -> RepoResult<Vec<CycleEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY entry_date DESC
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id.to_string(), i64::from(limit)])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn get_entry_by_date(
        &self,
        user_id: UserId,
        date: CycleDate,
    ) -> RepoResult<Option<CycleEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             WHERE user_id = ?1
               AND entry_date = ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id.to_string(), date.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }
        Ok(None)
    }

    fn upsert_entry(
        &self,
        user_id: UserId,
        date: CycleDate,
        fields: &EntryFields,
        cycle_length: u32,
    ) -> RepoResult<EntryId> {
        let existing = self
            .conn
            .query_row(
                "SELECT id FROM cycle_entries WHERE user_id = ?1 AND entry_date = ?2;",
                params![user_id.to_string(), date.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match existing {
            Some(id_text) => {
                let id = parse_uuid(&id_text, "cycle_entries.id")?;
                self.update_fields(id, fields)?;
                debug!("event=entry_upsert module=repo status=ok mode=update");
                Ok(id)
            }
            None => {
                let mut entry = CycleEntry::new(user_id, date).with_cycle_length(cycle_length);
                entry.apply_fields(fields);
                self.insert_entry(&entry)?;
                debug!("event=entry_upsert module=repo status=ok mode=insert");
                Ok(entry.id)
            }
        }
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM cycle_entries WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<CycleEntry> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;

    let date_text: String = row.get("entry_date")?;
    let date = CycleDate::parse(&date_text).map_err(|err| {
        RepoError::InvalidData(format!("{err} in cycle_entries.entry_date"))
    })?;

    let phase_marker = match row.get::<_, Option<String>>("phase_marker")? {
        Some(value) => Some(PhaseMarker::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid phase marker `{value}` in cycle_entries.phase_marker"
            ))
        })?),
        None => None,
    };

    let symptoms_text: String = row.get("symptoms")?;
    let symptoms = serde_json::from_str::<BTreeSet<Symptom>>(&symptoms_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid symptoms in cycle_entries.symptoms: {err}"))
    })?;

    let cycle_length = row.get::<_, i64>("cycle_length")?;
    let cycle_length = u32::try_from(cycle_length)
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid cycle length `{cycle_length}` in cycle_entries.cycle_length"
            ))
        })?;

    Ok(CycleEntry {
        id: parse_uuid(&id_text, "cycle_entries.id")?,
        user_id: parse_uuid(&user_text, "cycle_entries.user_id")?,
        date,
        phase_marker,
        mood: row.get("mood")?,
        notes: row.get("notes")?,
        symptoms,
        cycle_length,
    })
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn symptoms_to_db(symptoms: &BTreeSet<Symptom>) -> RepoResult<String> {
    serde_json::to_string(symptoms)
        .map_err(|err| RepoError::InvalidData(format!("unserializable symptoms: {err}")))
}
