//! The sealed-box wire format: `base64(ephemeral_pk || nonce || ciphertext)`.
//!
//! Anyone holding the recipient's public key can seal; only the holder of
//! the matching secret can unseal. The encryption key is derived from the
//! ephemeral shared secret bound to both public keys, so a box sealed for
//! one recipient cannot be re-addressed to another.
//!
//! The output string is what the mail envelope carries as `ciphertext`.
//! The protocol layer treats it as opaque; only this crate knows the
//! layout.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::crypto::{BoxNonce, EphemeralKeyPair, X25519PublicKey, X25519StaticSecret};
use crate::error::{Result, SealError};

/// Fixed bytes every sealed box carries beyond the plaintext:
/// 32-byte ephemeral public key, 12-byte nonce, 16-byte Poly1305 tag.
pub const SEALED_OVERHEAD: usize = 32 + 12 + 16;

/// Seal plaintext for a recipient.
///
/// Every call mints a fresh ephemeral key and nonce, so sealing the same
/// plaintext twice yields different strings.
pub fn seal(plaintext: &[u8], recipient: &X25519PublicKey) -> Result<String> {
    let ephemeral = EphemeralKeyPair::generate();
    let ephemeral_public = ephemeral.public_key();
    let key = ephemeral.seal_key(recipient);

    let nonce = BoxNonce::generate();
    let ciphertext = key.encrypt(plaintext, &nonce)?;

    let mut raw = Vec::with_capacity(32 + 12 + ciphertext.len());
    raw.extend_from_slice(ephemeral_public.as_bytes());
    raw.extend_from_slice(nonce.as_bytes());
    raw.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(raw))
}

/// Unseal a box with the recipient's secret key.
pub fn unseal(sealed: &str, recipient: &X25519StaticSecret) -> Result<Vec<u8>> {
    let raw = STANDARD
        .decode(sealed)
        .map_err(|e| SealError::Malformed(format!("invalid base64: {}", e)))?;

    if raw.len() < SEALED_OVERHEAD {
        return Err(SealError::Malformed(format!(
            "sealed box too short: {} bytes, need at least {}",
            raw.len(),
            SEALED_OVERHEAD
        )));
    }

    // Layout is validated by length above; these splits cannot fail
    let mut ephemeral_bytes = [0u8; 32];
    ephemeral_bytes.copy_from_slice(&raw[..32]);
    let ephemeral_public = X25519PublicKey::from_bytes(ephemeral_bytes);

    let mut nonce_bytes = [0u8; 12];
    nonce_bytes.copy_from_slice(&raw[32..44]);
    let nonce = BoxNonce::from_bytes(nonce_bytes);

    let key = recipient.unseal_key(&ephemeral_public);
    key.decrypt(&raw[44..], &nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_unseal_roundtrip() {
        let recipient = X25519StaticSecret::from_bytes([0x42; 32]);
        let plaintext = b"the quarterly numbers are in";

        let sealed = seal(plaintext, &recipient.public_key()).unwrap();
        let opened = unseal(&sealed, &recipient).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_unseal_wrong_recipient_fails() {
        let recipient = X25519StaticSecret::from_bytes([0x42; 32]);
        let other = X25519StaticSecret::from_bytes([0x43; 32]);

        let sealed = seal(b"secret", &recipient.public_key()).unwrap();

        assert!(matches!(
            unseal(&sealed, &other),
            Err(SealError::DecryptionError(_))
        ));
    }

    #[test]
    fn test_seal_is_randomized() {
        let recipient = X25519StaticSecret::from_bytes([0x42; 32]);

        let s1 = seal(b"same plaintext", &recipient.public_key()).unwrap();
        let s2 = seal(b"same plaintext", &recipient.public_key()).unwrap();

        assert_ne!(s1, s2);
        assert_eq!(unseal(&s1, &recipient).unwrap(), b"same plaintext");
        assert_eq!(unseal(&s2, &recipient).unwrap(), b"same plaintext");
    }

    #[test]
    fn test_sealed_size_overhead() {
        let recipient = X25519StaticSecret::from_bytes([0x42; 32]);
        let plaintext = b"foo";

        let sealed = seal(plaintext, &recipient.public_key()).unwrap();
        let raw = STANDARD.decode(&sealed).unwrap();
        assert_eq!(raw.len(), plaintext.len() + SEALED_OVERHEAD);
    }

    #[test]
    fn test_unseal_rejects_bad_base64() {
        let recipient = X25519StaticSecret::from_bytes([0x42; 32]);
        assert!(matches!(
            unseal("@@not base64@@", &recipient),
            Err(SealError::Malformed(_))
        ));
    }

    #[test]
    fn test_unseal_rejects_truncated_box() {
        let recipient = X25519StaticSecret::from_bytes([0x42; 32]);
        let short = STANDARD.encode([0u8; SEALED_OVERHEAD - 1]);
        assert!(matches!(
            unseal(&short, &recipient),
            Err(SealError::Malformed(_))
        ));
    }

    #[test]
    fn test_unseal_rejects_tampered_ciphertext() {
        let recipient = X25519StaticSecret::from_bytes([0x42; 32]);
        let sealed = seal(b"untouched", &recipient.public_key()).unwrap();

        let mut raw = STANDARD.decode(&sealed).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = STANDARD.encode(raw);

        assert!(matches!(
            unseal(&tampered, &recipient),
            Err(SealError::DecryptionError(_))
        ));
    }

    #[test]
    fn test_empty_plaintext() {
        let recipient = X25519StaticSecret::from_bytes([0x42; 32]);
        let sealed = seal(b"", &recipient.public_key()).unwrap();
        assert_eq!(unseal(&sealed, &recipient).unwrap(), b"");
    }
}
