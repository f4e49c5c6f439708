//! Signing identities for the envelope layer.
//!
//! Ed25519 supplies authorship, SHA-256 supplies replay keys and key
//! fingerprints. The newtypes here hold raw bytes; everything that crosses
//! the wire does so as the base64 or hex strings these types produce.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::SignatureError;

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Digest `data` in one shot.
    pub fn hash(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, 64 characters. This is the form replay keys take
    /// in stores and error messages.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let arr: [u8; 32] = hex::decode(s)?
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", hex::encode(&self.0[..8]))
    }
}

/// A 32-byte Ed25519 public key, the verifying half of a [`Keypair`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The fingerprint of this key: base64 of its SHA-256 hash.
    ///
    /// This is the conventional content of `sender_fp`/`recipient_fp`
    /// header fields; the protocol layer itself treats fingerprints as
    /// opaque strings.
    pub fn fingerprint(&self) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(Sha256Hash::hash(&self.0).0)
    }

    /// Verify `signature` over `message` under this key.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &Ed25519Signature,
    ) -> Result<(), SignatureError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| SignatureError::InvalidPublicKey)?;

        verifying_key
            .verify(message, &Signature::from_bytes(&signature.0))
            .map_err(|_| SignatureError::Verification)
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", hex::encode(&self.0[..8]))
    }
}

/// A 64-byte Ed25519 signature.
///
/// Envelopes carry it base64-encoded in their `signature` field.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ed25519Signature(pub [u8; 64]);

impl Ed25519Signature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Encode as base64 (the envelope wire form).
    pub fn to_base64(&self) -> String {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(self.0)
    }

    /// Decode from base64; must be exactly 64 raw bytes.
    pub fn from_base64(s: &str) -> Result<Self, SignatureError> {
        use base64::Engine as _;
        let arr: [u8; 64] = base64::engine::general_purpose::STANDARD
            .decode(s)
            .map_err(|_| SignatureError::MalformedSignature)?
            .try_into()
            .map_err(|_| SignatureError::MalformedSignature)?;
        Ok(Self(arr))
    }

    /// The all-zero signature. Never verifies; stands in where a value
    /// is structurally required before signing.
    pub const ZERO: Self = Self([0u8; 64]);
}

impl fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Sig({}...)", hex::encode(&self.0[..8]))
    }
}

/// An Ed25519 signing keypair.
///
/// Callers supply one per compose call; nothing in this layer stores
/// secret material.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Deterministic keypair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The verifying half.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// The fingerprint of the public key.
    pub fn fingerprint(&self) -> String {
        self.public_key().fingerprint()
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }

    /// Export the 32-byte seed. Secret material; handle accordingly.
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify() {
        let keypair = Keypair::generate();
        let signature = keypair.sign(b"hello world");

        keypair.public_key().verify(b"hello world", &signature).unwrap();

        assert!(keypair
            .public_key()
            .verify(b"hello worlD", &signature)
            .is_err());
    }

    #[test]
    fn test_verify_under_wrong_key() {
        let signer = Keypair::generate();
        let other = Keypair::generate();

        let signature = signer.sign(b"message");

        assert!(matches!(
            other.public_key().verify(b"message", &signature),
            Err(SignatureError::Verification)
        ));
    }

    #[test]
    fn test_seed_determines_keypair() {
        let seed = [0x42u8; 32];
        assert_eq!(
            Keypair::from_seed(&seed).public_key(),
            Keypair::from_seed(&seed).public_key()
        );
        assert_eq!(Keypair::from_seed(&seed).seed(), seed);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let keypair = Keypair::from_seed(&[0x07; 32]);
        assert_eq!(keypair.sign(b"same input"), keypair.sign(b"same input"));
    }

    #[test]
    fn test_sha256_empty_input_vector() {
        assert_eq!(
            Sha256Hash::hash(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_hex_roundtrip() {
        let h = Sha256Hash::hash(b"roundtrip");
        assert_eq!(h.to_hex().len(), 64);
        assert_eq!(Sha256Hash::from_hex(&h.to_hex()).unwrap(), h);
    }

    #[test]
    fn test_hash_from_hex_rejects_bad_input() {
        assert!(Sha256Hash::from_hex("abcd").is_err());
        assert!(Sha256Hash::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_signature_base64_roundtrip() {
        let sig = Keypair::generate().sign(b"payload");
        assert_eq!(Ed25519Signature::from_base64(&sig.to_base64()).unwrap(), sig);
    }

    #[test]
    fn test_signature_base64_rejects_wrong_length() {
        use base64::Engine as _;
        let short = base64::engine::general_purpose::STANDARD.encode([0u8; 63]);
        assert!(matches!(
            Ed25519Signature::from_base64(&short),
            Err(SignatureError::MalformedSignature)
        ));
        assert!(Ed25519Signature::from_base64("not base64!!").is_err());
    }

    #[test]
    fn test_fingerprint_known_vector() {
        // base64(sha256(pubkey)) for the all-0x42 seed
        let keypair = Keypair::from_seed(&[0x42; 32]);
        assert_eq!(
            keypair.fingerprint(),
            "MJfi3uLLSjS1OEDNtwWu1xBnw29o2w4PVZw/P6BDMV8="
        );
        assert_eq!(keypair.fingerprint(), keypair.public_key().fingerprint());
    }

    #[test]
    fn test_debug_shows_truncated_hex() {
        assert_eq!(
            format!("{:?}", Sha256Hash::hash(b"")),
            "Sha256(e3b0c44298fc1c14)"
        );
    }
}
