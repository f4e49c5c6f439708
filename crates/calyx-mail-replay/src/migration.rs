//! SQLite schema management for the replay store.
//!
//! The schema is a linear sequence of SQL batches; `MIGRATIONS[i]` takes
//! the database from version `i` to `i + 1`. Applied versions are recorded
//! in a `schema_migrations` ledger, so reopening an existing store only
//! runs the batches it is missing.

use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};
use crate::traits::now_millis;

/// Schema batches in application order. Append-only: a released batch is
/// never edited, a schema change is a new entry.
const MIGRATIONS: &[&str] = &[
    // v1: the replay ledger plus lookup indexes
    r#"
    CREATE TABLE replay_records (
        replay_key TEXT PRIMARY KEY,       -- 64 hex chars, SHA-256 of canonical envelope
        msg_id TEXT NOT NULL,              -- denormalized header field, audit only
        sender_fp TEXT NOT NULL,           -- denormalized header field, audit only
        recipient_fp TEXT NOT NULL,        -- denormalized header field, audit only
        seen_at INTEGER NOT NULL,          -- receiver clock at first acceptance (Unix ms)
        envelope_timestamp TEXT NOT NULL   -- author-claimed header timestamp
    );

    -- Pruning sweeps scan by arrival time; correlation lookups go by msg_id
    CREATE INDEX idx_replay_records_seen_at ON replay_records(seen_at);
    CREATE INDEX idx_replay_records_msg_id ON replay_records(msg_id);
    "#,
];

/// The schema version this build writes.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring the database up to [`CURRENT_VERSION`], applying any missing
/// batches in a single transaction.
///
/// Idempotent; called on every open. Refuses to touch a database whose
/// ledger records a version newer than this build understands.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let applied = applied_version(conn)?;
    if applied > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema is v{}, but this build only knows v{}",
            applied, CURRENT_VERSION
        )));
    }
    if applied == CURRENT_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (idx, batch) in MIGRATIONS.iter().enumerate().skip(applied as usize) {
        tx.execute_batch(batch)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![idx as u32 + 1, now_millis()],
        )?;
    }
    tx.commit()?;

    Ok(())
}

/// Highest version recorded in the ledger, 0 for a fresh database.
fn applied_version(conn: &Connection) -> Result<u32> {
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_names(conn: &Connection, kind: &str) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type = ?1")
            .unwrap()
            .query_map([kind], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_fresh_database_gets_full_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables = object_names(&conn, "table");
        assert!(tables.contains(&"replay_records".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));

        let indexes = object_names(&conn, "index");
        assert!(indexes.contains(&"idx_replay_records_seen_at".to_string()));
        assert!(indexes.contains(&"idx_replay_records_msg_id".to_string()));
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        for _ in 0..3 {
            migrate(&mut conn).unwrap();
        }
        assert_eq!(applied_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_migrate_rejects_newer_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![CURRENT_VERSION + 1, now_millis()],
        )
        .unwrap();

        assert!(matches!(migrate(&mut conn), Err(StoreError::Migration(_))));
    }
}
