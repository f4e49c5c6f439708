//! # Calyx Mail Core
//!
//! Pure primitives for the Calyx mail protocol layer: envelopes, canonical
//! encoding, and signature verification.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over cryptographic data structures.
//!
//! ## Key Types
//!
//! - [`Envelope`] - A signed protocol message ready for transport
//! - [`EnvelopeHeader`] - Routing metadata covered by the signature
//! - [`ReplayKey`] - Content-addressed identity of a full envelope (SHA-256)
//! - [`Keypair`] - Ed25519 signing identity
//!
//! ## Canonicalization
//!
//! Signatures and replay keys are computed over a deterministic compact
//! JSON encoding. See [`canonical`] module.

pub mod canonical;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod validation;
pub mod value;

pub use canonical::canonical_bytes;
pub use crypto::{Ed25519PublicKey, Ed25519Signature, Keypair, Sha256Hash};
pub use envelope::{
    now_timestamp, Envelope, EnvelopeBuilder, EnvelopeHeader, ReplayKey, MAX_SUBJECT_CHARS,
    PROTOCOL_VERSION,
};
pub use error::{EncodeError, EnvelopeError, SignatureError, TimestampError};
pub use validation::{check_timestamp, verify_signature, DEFAULT_CLOCK_SKEW_WINDOW};
pub use value::Value;
