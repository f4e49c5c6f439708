//! ReplayStore trait: the abstract interface for replay-state persistence.
//!
//! This trait lets the mail layer stay storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests). Every call site gets
//! a store handle passed in explicitly; there is no process-wide singleton,
//! so tests can run isolated stores side by side.

use std::time::Duration;

use calyx_mail_core::ReplayKey;

use crate::error::Result;
use crate::record::ReplayRecord;

/// Default retention for pruning, 24 hours.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// The ReplayStore trait: at-most-once acceptance per distinct envelope.
///
/// All methods are synchronous. Backends must support concurrent callers;
/// the check-then-insert in [`check_and_record`](ReplayStore::check_and_record)
/// is the one operation whose atomicity the whole replay defense rests on.
pub trait ReplayStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Replay Defense
    // ─────────────────────────────────────────────────────────────────────────

    /// Atomically check for `record.replay_key` and insert if absent.
    ///
    /// # Returns
    /// - `Ok(())` if the record was new and is now durably recorded.
    /// - `Err(StoreError::Replay)` if the key was already present.
    /// - `Err(StoreError::Busy)` if the transaction timed out; the caller
    ///   must reject the envelope, not assume acceptance.
    ///
    /// Under concurrent calls with the same key, exactly one caller
    /// observes `Ok`; every other observes `Replay`.
    fn check_and_record(&self, record: &ReplayRecord) -> Result<()>;

    /// Check whether a replay key is recorded, without mutating anything.
    fn contains(&self, replay_key: &ReplayKey) -> Result<bool>;

    /// Fetch the record for a replay key, if present.
    fn get(&self, replay_key: &ReplayKey) -> Result<Option<ReplayRecord>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Correlation & Audit
    // ─────────────────────────────────────────────────────────────────────────

    /// All records carrying a given `msg_id`, ordered by `seen_at`.
    ///
    /// Distinct envelopes may legitimately share a `msg_id` (a re-signed
    /// copy has a different replay key), which is exactly what this lookup
    /// exists to surface.
    fn find_by_msg_id(&self, msg_id: &str) -> Result<Vec<ReplayRecord>>;

    /// Number of records currently held.
    fn count(&self) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Housekeeping
    // ─────────────────────────────────────────────────────────────────────────

    /// Delete every record with `seen_at` before `cutoff` (Unix ms).
    ///
    /// Returns the number of records removed. Runs in its own short
    /// transaction; safe to call concurrently with inserts.
    fn prune_before(&self, cutoff: i64) -> Result<usize>;
}

/// Extension trait for common replay-store patterns.
pub trait ReplayStoreExt: ReplayStore {
    /// Prune records older than `retention`, measured from the current time.
    ///
    /// Housekeeping only: within the timestamp acceptance window the replay
    /// defense never depends on pruned state, because out-of-window
    /// envelopes are rejected before the store is consulted.
    fn prune(&self, retention: Duration) -> Result<usize> {
        self.prune_before(now_millis() - retention.as_millis() as i64)
    }
}

impl<S: ReplayStore + ?Sized> ReplayStoreExt for S {}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
