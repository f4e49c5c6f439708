//! Error types for the replay store.

use thiserror::Error;

/// Errors that can occur during replay-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The replay key is already recorded: this envelope was processed before.
    #[error("replay detected: key {replay_key} already recorded")]
    Replay {
        /// Hex form of the replay key that collided.
        replay_key: String,
    },

    /// The transaction could not complete within the busy timeout.
    ///
    /// Callers must treat this as a rejection (fail closed), never as an
    /// acceptance.
    #[error("replay store busy: transaction timed out")]
    Busy,

    /// SQLite failed underneath us.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The schema could not be brought to the version this build expects.
    #[error("migration error: {0}")]
    Migration(String),

    /// A stored row does not parse back into a record.
    #[error("invalid data: {0}")]
    Corrupt(String),
}

/// Result type for replay-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
