//! # Calyx Mail Seal
//!
//! The X25519 sealed-box primitive that produces the `ciphertext` strings
//! mail envelopes carry.
//!
//! This crate sits outside the protocol layer's trust boundary: the
//! envelope, canonical encoder, and replay guard never parse a sealed box,
//! they only move the base64 string. Only the sender (at compose time) and
//! the final recipient (holding the X25519 secret) touch this code.
//!
//! ## Key Types
//!
//! - [`seal`] / [`unseal`] - The sealed-box operations
//! - [`X25519PublicKey`] / [`X25519StaticSecret`] - Recipient key material
//! - [`SealError`] - Failure taxonomy
//!
//! ## Format
//!
//! `base64(ephemeral_pk(32) || nonce(12) || chacha20poly1305_ciphertext)`,
//! with the content key derived via Blake3 from the ephemeral shared
//! secret and both public keys.

pub mod crypto;
pub mod error;
pub mod sealed;

pub use crypto::{BoxKey, BoxNonce, EphemeralKeyPair, X25519PublicKey, X25519StaticSecret};
pub use error::{Result, SealError};
pub use sealed::{seal, unseal, SEALED_OVERHEAD};
