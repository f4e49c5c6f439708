//! Error types for the Calyx Mail core.

use thiserror::Error;

/// Errors raised by the canonical encoder.
///
/// Encoding failures are fatal to the current operation and are never
/// retried: a value that cannot be canonically encoded cannot be signed
/// or hashed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("unsupported type {kind} at {path}")]
    UnsupportedType { path: String, kind: &'static str },

    #[error("duplicate map key {key:?} at {path}")]
    DuplicateKey { path: String, key: String },
}

/// Errors raised while constructing or shape-checking an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("subject exceeds {max} characters (got {chars})")]
    SubjectTooLong { chars: usize, max: usize },

    #[error("msg_id is not a version-4 UUID: {value:?}")]
    InvalidMsgId { value: String },

    #[error("malformed wire envelope: {0}")]
    Wire(#[from] serde_json::Error),

    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

/// Errors raised by the timestamp-window check.
///
/// Enforced before any replay-store access.
#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("timestamp is not valid RFC 3339: {value:?}")]
    Malformed { value: String },

    #[error("timestamp outside acceptance window: skew {skew_seconds}s exceeds {window_seconds}s")]
    OutsideWindow {
        skew_seconds: i64,
        window_seconds: i64,
    },
}

/// Errors raised by signature verification.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature is not base64 of exactly 64 bytes")]
    MalformedSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signature verification failed")]
    Verification,

    #[error(transparent)]
    Encoding(#[from] EncodeError),
}
