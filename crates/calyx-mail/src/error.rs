//! Error types for the Mailbox.

use calyx_mail_core::{EncodeError, EnvelopeError, SignatureError, TimestampError};
use calyx_mail_replay::StoreError;
use thiserror::Error;

/// Errors that can occur during Mailbox operations.
///
/// Every rejection carries exactly one reason, the first check that failed
/// in pipeline order.
#[derive(Debug, Error)]
pub enum MailError {
    /// The envelope declares a protocol version this build does not speak.
    #[error("unsupported protocol version: {version}")]
    UnsupportedVersion { version: String },

    /// Envelope construction or wire-format error.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Canonical encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodeError),

    /// Timestamp malformed or outside the accepted window.
    #[error("timestamp error: {0}")]
    Timestamp(#[from] TimestampError),

    /// Signature verification failure.
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    /// The envelope was already processed.
    #[error("replay detected: {replay_key}")]
    Replay { replay_key: String },

    /// The replay store was busy; the envelope was rejected, not accepted.
    #[error("replay store busy")]
    StoreBusy,

    /// Other storage error.
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for MailError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Replay { replay_key } => MailError::Replay { replay_key },
            StoreError::Busy => MailError::StoreBusy,
            other => MailError::Store(other),
        }
    }
}

/// Result type for Mailbox operations.
pub type Result<T> = std::result::Result<T, MailError>;
