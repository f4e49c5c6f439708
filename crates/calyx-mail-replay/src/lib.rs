//! # Calyx Mail Replay
//!
//! Replay defense for the Calyx mail protocol layer: a durable,
//! transactional map from replay key to first-seen metadata, with pruning.
//!
//! ## Overview
//!
//! The replay guard is consulted only after an envelope has passed the
//! timestamp-window and signature checks. It answers one question
//! atomically: has this exact envelope been accepted before? Storage sits
//! behind the [`ReplayStore`] trait; the primary implementation is
//! [`SqliteReplayStore`], with [`MemoryReplayStore`] for tests.
//!
//! ## Key Types
//!
//! - [`ReplayStore`] - The trait all backends implement
//! - [`ReplayRecord`] - One row of replay state
//! - [`SqliteReplayStore`] - SQLite-backed persistent store
//! - [`MemoryReplayStore`] - In-memory store for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use calyx_mail_replay::{ReplayRecord, ReplayStore, SqliteReplayStore};
//!
//! fn example() {
//!     let store = SqliteReplayStore::open("replay.db").unwrap();
//!
//!     // Or an in-memory store for testing
//!     let store = SqliteReplayStore::open_memory().unwrap();
//!
//!     // let record = ReplayRecord::from_envelope(&envelope, now_ms).unwrap();
//!     // store.check_and_record(&record).unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Atomic check-and-insert**: one transaction, unique key constraint;
//!   exactly one of any set of concurrent duplicates wins
//! - **Fail closed**: a busy timeout is a rejection, never an acceptance
//! - **Explicit handles**: no global store; every call site receives one

pub mod error;
pub mod memory;
pub mod migration;
pub mod record;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryReplayStore;
pub use record::ReplayRecord;
pub use sqlite::{SqliteConfig, SqliteReplayStore};
pub use traits::{now_millis, ReplayStore, ReplayStoreExt, DEFAULT_RETENTION};
