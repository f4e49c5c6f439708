//! The persisted proof that an envelope was processed.

use calyx_mail_core::{EncodeError, Envelope, ReplayKey};

/// One row of replay state: the key plus first-seen metadata.
///
/// Only `replay_key` carries uniqueness. The header fields are denormalized
/// for correlation and audit queries and play no part in replay decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRecord {
    /// SHA-256 of the canonical bytes of the entire envelope. Primary key.
    pub replay_key: ReplayKey,

    /// The envelope's `msg_id`, for correlation lookups.
    pub msg_id: String,

    /// The envelope's `sender_fp`.
    pub sender_fp: String,

    /// The envelope's `recipient_fp`.
    pub recipient_fp: String,

    /// When this record was first created, receiver clock (Unix ms).
    /// Pruning decisions use this, never the envelope's own timestamp.
    pub seen_at: i64,

    /// The header's author-claimed timestamp, kept verbatim for audit.
    pub envelope_timestamp: String,
}

impl ReplayRecord {
    /// Derive a record from a verified envelope.
    ///
    /// `seen_at` is supplied by the caller so tests can plant records at
    /// synthetic instants; production callers pass the current time.
    pub fn from_envelope(envelope: &Envelope, seen_at: i64) -> Result<Self, EncodeError> {
        Ok(Self {
            replay_key: envelope.replay_key()?,
            msg_id: envelope.header.msg_id.clone(),
            sender_fp: envelope.header.sender_fp.clone(),
            recipient_fp: envelope.header.recipient_fp.clone(),
            seen_at,
            envelope_timestamp: envelope.header.timestamp.clone(),
        })
    }
}
