//! SQLite implementation of the ReplayStore trait.
//!
//! This is the primary backend. It uses rusqlite with bundled SQLite in
//! WAL mode, so concurrent readers never block and writers queue behind
//! the busy timeout. The store owns its connection exclusively; nothing
//! else may open or mutate the database file.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};

use calyx_mail_core::ReplayKey;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::record::ReplayRecord;
use crate::traits::ReplayStore;

/// Tuning knobs for the SQLite backend.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// How long a transaction may wait on a concurrent writer before the
    /// operation fails with [`StoreError::Busy`].
    pub busy_timeout: Duration,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(250),
        }
    }
}

/// SQLite-based replay store.
///
/// Thread-safe via an internal mutex on the connection. Atomicity of the
/// check-and-insert does not rest on that mutex: it holds through the
/// transaction plus the primary-key constraint, so a second handle on the
/// same file cannot slip a duplicate through.
pub struct SqliteReplayStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReplayStore {
    /// Open a replay database at the given path with default config.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, SqliteConfig::default())
    }

    /// Open a replay database with explicit config.
    pub fn open_with_config(path: impl AsRef<Path>, config: SqliteConfig) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(config.busy_timeout)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory replay database.
    ///
    /// Useful for testing. No durability across drops.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run an operation against the connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                Some(format!("mutex poisoned: {}", e)),
            ))
        })?;
        f(&conn)
    }

    /// Run an operation that needs mutable access (transactions).
    fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                Some(format!("mutex poisoned: {}", e)),
            ))
        })?;
        f(&mut conn)
    }
}

/// Map SQLite busy/locked conditions to the distinct busy error.
fn map_sqlite_err(e: rusqlite::Error) -> StoreError {
    match e.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => StoreError::Busy,
        _ => StoreError::Database(e),
    }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e.sqlite_error_code(), Some(ErrorCode::ConstraintViolation))
}

// Raw row tuple: hex key conversion happens outside the rusqlite closure
// so a corrupt key surfaces as StoreError::Corrupt, not a panic.
type RawRecord = (String, String, String, String, i64, String);

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn raw_to_record(raw: RawRecord) -> Result<ReplayRecord> {
    let (key_hex, msg_id, sender_fp, recipient_fp, seen_at, envelope_timestamp) = raw;
    let replay_key = ReplayKey::from_hex(&key_hex)
        .map_err(|_| StoreError::Corrupt(format!("bad replay_key hex: {}", key_hex)))?;
    Ok(ReplayRecord {
        replay_key,
        msg_id,
        sender_fp,
        recipient_fp,
        seen_at,
        envelope_timestamp,
    })
}

const SELECT_COLUMNS: &str =
    "replay_key, msg_id, sender_fp, recipient_fp, seen_at, envelope_timestamp";

impl ReplayStore for SqliteReplayStore {
    fn check_and_record(&self, record: &ReplayRecord) -> Result<()> {
        self.with_conn_mut(|conn| {
            let key_hex = record.replay_key.to_hex();

            // 1. Open a write transaction up front, so the lookup and the
            //    insert see one consistent snapshot
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(map_sqlite_err)?;

            // 2. Check for an existing record
            let existing: Option<String> = tx
                .query_row(
                    "SELECT replay_key FROM replay_records WHERE replay_key = ?1",
                    params![key_hex],
                    |row| row.get(0),
                )
                .optional()
                .map_err(map_sqlite_err)?;

            if existing.is_some() {
                return Err(StoreError::Replay {
                    replay_key: key_hex,
                });
            }

            // 3. Insert; the primary key backs the check if another handle
            //    on the same file raced us between transactions
            match tx.execute(
                "INSERT INTO replay_records (
                    replay_key, msg_id, sender_fp, recipient_fp, seen_at, envelope_timestamp
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    key_hex,
                    record.msg_id,
                    record.sender_fp,
                    record.recipient_fp,
                    record.seen_at,
                    record.envelope_timestamp,
                ],
            ) {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    return Err(StoreError::Replay {
                        replay_key: key_hex,
                    })
                }
                Err(e) => return Err(map_sqlite_err(e)),
            }

            tx.commit().map_err(map_sqlite_err)?;
            Ok(())
        })
    }

    fn contains(&self, replay_key: &ReplayKey) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM replay_records WHERE replay_key = ?1)",
                    params![replay_key.to_hex()],
                    |row| row.get(0),
                )
                .map_err(map_sqlite_err)?;
            Ok(exists)
        })
    }

    fn get(&self, replay_key: &ReplayKey) -> Result<Option<ReplayRecord>> {
        self.with_conn(|conn| {
            let raw = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM replay_records WHERE replay_key = ?1",
                        SELECT_COLUMNS
                    ),
                    params![replay_key.to_hex()],
                    row_to_raw,
                )
                .optional()
                .map_err(map_sqlite_err)?;
            raw.map(raw_to_record).transpose()
        })
    }

    fn find_by_msg_id(&self, msg_id: &str) -> Result<Vec<ReplayRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM replay_records WHERE msg_id = ?1 ORDER BY seen_at",
                    SELECT_COLUMNS
                ))
                .map_err(map_sqlite_err)?;

            let raws = stmt
                .query_map(params![msg_id], row_to_raw)
                .map_err(map_sqlite_err)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sqlite_err)?;

            raws.into_iter().map(raw_to_record).collect()
        })
    }

    fn count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM replay_records", [], |row| row.get(0))
                .map_err(map_sqlite_err)?;
            Ok(count as u64)
        })
    }

    fn prune_before(&self, cutoff: i64) -> Result<usize> {
        let removed = self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM replay_records WHERE seen_at < ?1",
                params![cutoff],
            )
            .map_err(map_sqlite_err)
        })?;

        if removed > 0 {
            tracing::debug!("Pruned {} replay records seen before {}", removed, cutoff);
        }
        Ok(removed)
    }
}
