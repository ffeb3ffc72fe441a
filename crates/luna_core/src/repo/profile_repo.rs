//! Profile repository contract and SQLite implementation.

use crate::model::entry::UserId;
use crate::model::profile::UserProfile;
use crate::repo::entry_repo::{parse_uuid, RepoResult};
use rusqlite::{params, Connection};

pub trait ProfileRepository {
    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<UserProfile>>;
    fn upsert_profile(&self, profile: &UserProfile) -> RepoResult<()>;
}

pub struct SqliteProfileRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProfileRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProfileRepository for SqliteProfileRepository<'_> {
    fn get_profile(&self, user_id: UserId) -> RepoResult<Option<UserProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, full_name, email
             FROM users_profile
             WHERE user_id = ?1;",
        )?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let id_text: String = row.get("user_id")?;
        Ok(Some(UserProfile {
            user_id: parse_uuid(&id_text, "users_profile.user_id")?,
            full_name: row.get("full_name")?,
            email: row.get("email")?,
        }))
    }

    fn upsert_profile(&self, profile: &UserProfile) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO users_profile (user_id, full_name, email)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                full_name = excluded.full_name,
                email = excluded.email,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                profile.user_id.to_string(),
                profile.full_name.as_deref(),
                profile.email.as_deref(),
            ],
        )?;
        Ok(())
    }
}
