//! Error types for the sealed-box primitive.

use thiserror::Error;

/// Errors that can occur while sealing or unsealing.
#[derive(Debug, Error)]
pub enum SealError {
    /// The cipher refused to seal (bad key length, oversized input).
    #[error("encryption error: {0}")]
    EncryptionError(String),

    /// The tag did not authenticate. Wrong key, wrong nonce, and a
    /// tampered box all land here.
    #[error("decryption error: {0}")]
    DecryptionError(String),

    /// The sealed string is not valid base64 or is too short to carry
    /// the ephemeral key, nonce, and authentication tag.
    #[error("malformed sealed box: {0}")]
    Malformed(String),
}

/// Result type for seal operations.
pub type Result<T> = std::result::Result<T, SealError>;
