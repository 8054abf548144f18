//! SQLite-backed repository.
//!
//! Provides persistent storage for:
//! - The event log (one row per logged use, insertion order by rowid)
//! - Unlocked achievements
//! - Key-value JSON records for the plan and the onboarding profile

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{data_dir, migrations, Repository};
use crate::achievements::UnlockedAchievement;
use crate::error::{CoreError, DatabaseError, Result};
use crate::onboarding::UserProfile;
use crate::plan::QuitPlan;
use crate::usage::{LogEntry, UsageKind};

const PLAN_KEY: &str = "quit_plan";
const PROFILE_KEY: &str = "user_profile";

/// SQLite database for tracker state.
pub struct Database {
    conn: Connection,
}

fn encode_instant(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn decode_instant(table: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("bad timestamp '{raw}': {e}")))
}

fn corrupt(table: &str, message: String) -> CoreError {
    DatabaseError::CorruptRecord {
        table: table.to_string(),
        message,
    }
    .into()
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/quitpace.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("quitpace.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.kv_get(key)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| corrupt("kv", format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.kv_set(key, &json)
    }

    pub fn log_count(&self) -> Result<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM log_entries", [], |row| row.get::<_, i64>(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

impl Repository for Database {
    fn load_plan(&self) -> Result<Option<QuitPlan>> {
        self.load_json(PLAN_KEY)
    }

    fn save_plan(&mut self, plan: &QuitPlan) -> Result<()> {
        self.save_json(PLAN_KEY, plan)
    }

    fn load_profile(&self) -> Result<Option<UserProfile>> {
        self.load_json(PROFILE_KEY)
    }

    fn save_profile(&mut self, profile: &UserProfile) -> Result<()> {
        self.save_json(PROFILE_KEY, profile)
    }

    fn load_logs(&self) -> Result<Vec<LogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, logged_at FROM log_entries ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            let (kind, logged_at) = row?;
            let kind: UsageKind = kind
                .parse()
                .map_err(|e| corrupt("log_entries", format!("{e}")))?;
            logs.push(LogEntry::new(kind, decode_instant("log_entries", &logged_at)?));
        }
        Ok(logs)
    }

    fn append_log(&mut self, entry: &LogEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO log_entries (kind, logged_at) VALUES (?1, ?2)",
            params![entry.kind.as_str(), encode_instant(&entry.timestamp)],
        )?;
        Ok(())
    }

    fn load_unlocked_achievements(&self) -> Result<Vec<UnlockedAchievement>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, icon, unlocked_at
             FROM unlocked_achievements
             ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut unlocked = Vec::new();
        for row in rows {
            let (id, title, description, icon, unlocked_at) = row?;
            unlocked.push(UnlockedAchievement {
                id,
                title,
                description,
                icon,
                unlocked_at: decode_instant("unlocked_achievements", &unlocked_at)?,
            });
        }
        Ok(unlocked)
    }

    fn save_unlocked_achievements(&mut self, unlocked: &[UnlockedAchievement]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM unlocked_achievements", [])?;
        for a in unlocked {
            tx.execute(
                "INSERT OR REPLACE INTO unlocked_achievements
                    (id, title, description, icon, unlocked_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![a.id, a.title, a.description, a.icon, encode_instant(&a.unlocked_at)],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM log_entries", [])?;
        tx.execute("DELETE FROM unlocked_achievements", [])?;
        tx.execute(
            "DELETE FROM kv WHERE key IN (?1, ?2)",
            params![PLAN_KEY, PROFILE_KEY],
        )?;
        tx.commit()?;
        tracing::info!("cleared all tracker data");
        Ok(())
    }
}
