//! X25519 key material and the sealed-box key schedule.
//!
//! The schedule is one-shot: a fresh ephemeral key agrees with the
//! recipient's static key, and the raw agreement output is run through
//! Blake3 in derive-key mode together with both public keys. The derived
//! [`BoxKey`] is the only thing that ever touches the cipher, and the
//! transcript binding means a box sealed for one recipient cannot be
//! re-addressed to another.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use crate::error::{Result, SealError};

/// Domain-separation string for the sealed-box key derivation.
const KEY_CONTEXT: &str = "calyx-mail-v0-seal";

/// An X25519 public key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X25519PublicKey(pub [u8; 32]);

impl X25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<PublicKey> for X25519PublicKey {
    fn from(pk: PublicKey) -> Self {
        Self(*pk.as_bytes())
    }
}

/// The recipient's long-lived X25519 secret.
///
/// Agreement only, never signing; the signing identity is a separate
/// Ed25519 key held elsewhere.
pub struct X25519StaticSecret(StaticSecret);

impl X25519StaticSecret {
    /// Generate a new random secret.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(StaticSecret::from(bytes))
    }

    /// Create from seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Derive the public key.
    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey::from(PublicKey::from(&self.0))
    }

    /// Recompute the box key for a sealed box that arrived under the
    /// given ephemeral public key.
    pub fn unseal_key(&self, ephemeral: &X25519PublicKey) -> BoxKey {
        let shared = self.0.diffie_hellman(&PublicKey::from(ephemeral.0));
        derive_box_key(shared.as_bytes(), ephemeral, &self.public_key())
    }
}

/// The sender-side ephemeral key pair, minted once per sealed box.
///
/// Its public half travels inside the box; its secret half is consumed
/// by [`seal_key`](Self::seal_key) and never stored.
pub struct EphemeralKeyPair {
    secret: EphemeralSecret,
    public: X25519PublicKey,
}

impl EphemeralKeyPair {
    /// Generate a new ephemeral key pair.
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random_from_rng(rand::thread_rng());
        let public = X25519PublicKey::from(PublicKey::from(&secret));
        Self { secret, public }
    }

    /// Get the public key.
    pub fn public_key(&self) -> X25519PublicKey {
        self.public
    }

    /// Derive the box key for sealing to `recipient`, consuming the
    /// ephemeral secret.
    pub fn seal_key(self, recipient: &X25519PublicKey) -> BoxKey {
        let shared = self.secret.diffie_hellman(&PublicKey::from(recipient.0));
        derive_box_key(shared.as_bytes(), &self.public, recipient)
    }
}

/// Blake3 key derivation over the agreement output and both public keys.
fn derive_box_key(
    shared: &[u8; 32],
    ephemeral: &X25519PublicKey,
    recipient: &X25519PublicKey,
) -> BoxKey {
    let mut hasher = blake3::Hasher::new_derive_key(KEY_CONTEXT);
    hasher.update(shared);
    hasher.update(ephemeral.as_bytes());
    hasher.update(recipient.as_bytes());
    BoxKey(*hasher.finalize().as_bytes())
}

/// The derived 256-bit ChaCha20-Poly1305 content key.
#[derive(Clone)]
pub struct BoxKey([u8; 32]);

impl BoxKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encrypt and authenticate plaintext under this key.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &BoxNonce) -> Result<Vec<u8>> {
        ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| SealError::EncryptionError(e.to_string()))?
            .encrypt(Nonce::from_slice(&nonce.0), plaintext)
            .map_err(|e| SealError::EncryptionError(e.to_string()))
    }

    /// Decrypt, failing if the tag does not authenticate.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &BoxNonce) -> Result<Vec<u8>> {
        ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| SealError::DecryptionError(e.to_string()))?
            .decrypt(Nonce::from_slice(&nonce.0), ciphertext)
            .map_err(|e| SealError::DecryptionError(e.to_string()))
    }
}

/// A 96-bit ChaCha20-Poly1305 nonce, fresh per sealed box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxNonce(pub [u8; 12]);

impl BoxNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}
