//! In-memory implementation of the ReplayStore trait.
//!
//! Primarily for testing. Same semantics as SQLite but with no persistence;
//! all records are lost when the store is dropped.

use std::collections::HashMap;
use std::sync::RwLock;

use calyx_mail_core::ReplayKey;

use crate::error::{Result, StoreError};
use crate::record::ReplayRecord;
use crate::traits::ReplayStore;

/// In-memory replay store.
///
/// Thread-safe via RwLock; the write lock makes check-and-insert atomic.
pub struct MemoryReplayStore {
    inner: RwLock<HashMap<ReplayKey, ReplayRecord>>,
}

impl MemoryReplayStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryReplayStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayStore for MemoryReplayStore {
    fn check_and_record(&self, record: &ReplayRecord) -> Result<()> {
        let mut inner = self.inner.write().unwrap();

        if inner.contains_key(&record.replay_key) {
            return Err(StoreError::Replay {
                replay_key: record.replay_key.to_hex(),
            });
        }

        inner.insert(record.replay_key, record.clone());
        Ok(())
    }

    fn contains(&self, replay_key: &ReplayKey) -> Result<bool> {
        let inner = self.inner.read().unwrap();
        Ok(inner.contains_key(replay_key))
    }

    fn get(&self, replay_key: &ReplayKey) -> Result<Option<ReplayRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.get(replay_key).cloned())
    }

    fn find_by_msg_id(&self, msg_id: &str) -> Result<Vec<ReplayRecord>> {
        let inner = self.inner.read().unwrap();

        let mut records: Vec<ReplayRecord> = inner
            .values()
            .filter(|r| r.msg_id == msg_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.seen_at);

        Ok(records)
    }

    fn count(&self) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.len() as u64)
    }

    fn prune_before(&self, cutoff: i64) -> Result<usize> {
        let mut inner = self.inner.write().unwrap();

        let before = inner.len();
        inner.retain(|_, r| r.seen_at >= cutoff);
        Ok(before - inner.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{now_millis, ReplayStoreExt, DEFAULT_RETENTION};
    use calyx_mail_core::Sha256Hash;
    use std::sync::Arc;

    fn make_record(seed: u8, seen_at: i64) -> ReplayRecord {
        ReplayRecord {
            replay_key: ReplayKey::from_hash(Sha256Hash::hash(&[seed])),
            msg_id: format!("msg-{seed}"),
            sender_fp: "A".to_string(),
            recipient_fp: "B".to_string(),
            seen_at,
            envelope_timestamp: "2025-01-14T16:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_first_insert_accepted_second_is_replay() {
        let store = MemoryReplayStore::new();
        let record = make_record(1, 1000);

        store.check_and_record(&record).unwrap();
        assert!(matches!(
            store.check_and_record(&record),
            Err(StoreError::Replay { .. })
        ));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_contains_and_get() {
        let store = MemoryReplayStore::new();
        let record = make_record(1, 1000);

        assert!(!store.contains(&record.replay_key).unwrap());
        store.check_and_record(&record).unwrap();
        assert!(store.contains(&record.replay_key).unwrap());
        assert_eq!(store.get(&record.replay_key).unwrap().unwrap(), record);
    }

    #[test]
    fn test_find_by_msg_id_ordered_by_seen_at() {
        let store = MemoryReplayStore::new();

        let mut r1 = make_record(1, 2000);
        let mut r2 = make_record(2, 1000);
        r1.msg_id = "shared".to_string();
        r2.msg_id = "shared".to_string();
        store.check_and_record(&r1).unwrap();
        store.check_and_record(&r2).unwrap();
        store.check_and_record(&make_record(3, 500)).unwrap();

        let found = store.find_by_msg_id("shared").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].seen_at, 1000);
        assert_eq!(found[1].seen_at, 2000);
    }

    #[test]
    fn test_prune_boundary() {
        let store = MemoryReplayStore::new();
        store.check_and_record(&make_record(1, 100)).unwrap();
        store.check_and_record(&make_record(2, 200)).unwrap();
        store.check_and_record(&make_record(3, 300)).unwrap();

        // Cutoff is exclusive: seen_at == cutoff survives
        let removed = store.prune_before(200).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_prune_retention_window() {
        let store = MemoryReplayStore::new();
        let now = now_millis();
        let hour_ms = 60 * 60 * 1000;

        store.check_and_record(&make_record(1, now - 25 * hour_ms)).unwrap();
        store.check_and_record(&make_record(2, now - hour_ms)).unwrap();

        let removed = store.prune(DEFAULT_RETENTION).unwrap();
        assert_eq!(removed, 1);
        assert!(store.contains(&make_record(2, 0).replay_key).unwrap());
        assert!(!store.contains(&make_record(1, 0).replay_key).unwrap());
    }

    #[test]
    fn test_concurrent_same_key_single_winner() {
        let store = Arc::new(MemoryReplayStore::new());
        let record = make_record(7, 1000);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let record = record.clone();
                std::thread::spawn(move || store.check_and_record(&record))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let accepted = results.iter().filter(|r| r.is_ok()).count();
        let replays = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::Replay { .. })))
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(replays, 7);
        assert_eq!(store.count().unwrap(), 1);
    }
}
