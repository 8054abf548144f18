//! Database schema migrations for quitpace.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current version.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Key under which v1 kept unlocked achievements as a JSON array.
pub(crate) const LEGACY_ACHIEVEMENTS_KEY: &str = "unlocked_achievements";

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: key-value records and the event log.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS log_entries (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            kind      TEXT NOT NULL,
            logged_at TEXT NOT NULL
        );",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    tracing::info!("applied schema migration v1");
    Ok(())
}

/// Migration v2: unlocked achievements get their own table.
///
/// Any JSON array stored under the v1 kv key is copied into the table and
/// the kv row is dropped. Also indexes the log by kind for last-use lookups.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS unlocked_achievements (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            description TEXT NOT NULL,
            icon        TEXT NOT NULL,
            unlocked_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_log_entries_kind_logged_at
            ON log_entries(kind, logged_at);",
    )?;

    let legacy: Option<String> = tx
        .query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![LEGACY_ACHIEVEMENTS_KEY],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(json) = legacy {
        match serde_json::from_str::<Vec<serde_json::Value>>(&json) {
            Ok(items) => {
                for item in items {
                    let field = |name: &str| {
                        item.get(name)
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string()
                    };
                    let id = field("id");
                    if id.is_empty() {
                        continue;
                    }
                    let unlocked_at = match DateTime::parse_from_rfc3339(&field("unlocked_at")) {
                        Ok(at) => at
                            .with_timezone(&Utc)
                            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                        Err(e) => {
                            tracing::warn!(%id, error = %e, "skipping legacy achievement without a valid unlock time");
                            continue;
                        }
                    };
                    tx.execute(
                        "INSERT OR IGNORE INTO unlocked_achievements
                            (id, title, description, icon, unlocked_at)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            id,
                            field("title"),
                            field("description"),
                            field("icon"),
                            unlocked_at,
                        ],
                    )?;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable legacy achievements");
            }
        }
        tx.execute("DELETE FROM kv WHERE key = ?1", params![LEGACY_ACHIEVEMENTS_KEY])?;
    }

    set_schema_version(&tx, 2)?;
    tx.commit()?;
    tracing::info!("applied schema migration v2");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
        // Re-running is a no-op.
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn v2_moves_legacy_achievements_out_of_kv() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)",
            params![
                LEGACY_ACHIEVEMENTS_KEY,
                r#"[{"id":"first_day","title":"First Day","description":"Complete your first day","icon":"x","unlocked_at":"2024-01-02T00:00:00Z"}]"#
            ],
        )
        .unwrap();

        migrate(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM unlocked_achievements", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
        let leftover: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv", [], |r| r.get(0))
            .unwrap();
        assert_eq!(leftover, 0);
    }

    #[test]
    fn v2_skips_legacy_entries_without_a_valid_unlock_time() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)",
            params![
                LEGACY_ACHIEVEMENTS_KEY,
                r#"[
                    {"id":"first_day","title":"First Day","description":"d","icon":"x","unlockedAt":1717400000000},
                    {"id":"streak_3","title":"On a Roll","description":"d","icon":"x","unlocked_at":"yesterday"},
                    {"id":"first_week","title":"One Week Strong","description":"d","icon":"x","unlocked_at":"2024-01-08T10:00:00.250+02:00"}
                ]"#
            ],
        )
        .unwrap();

        migrate(&conn).unwrap();

        let rows: Vec<(String, String)> = conn
            .prepare("SELECT id, unlocked_at FROM unlocked_achievements")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .collect::<SqliteResult<_>>()
            .unwrap();
        assert_eq!(
            rows,
            vec![("first_week".to_string(), "2024-01-08T08:00:00.250Z".to_string())]
        );
    }
}
