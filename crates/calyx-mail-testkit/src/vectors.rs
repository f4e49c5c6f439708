//! Golden test vectors for deterministic verification.
//!
//! These vectors ensure that canonical encoding, signing, and replay-key
//! derivation produce identical results across implementations. The
//! expected values were produced with an independent Ed25519/SHA-256
//! implementation over the documented canonical byte layout.

use calyx_mail_core::{Envelope, EnvelopeBuilder, Keypair};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for deterministic key generation.
    pub seed: [u8; 32],
    /// Expected fingerprint of the seeded key; also the `sender_fp`.
    pub sender_fp: &'static str,
    /// Recipient fingerprint.
    pub recipient_fp: &'static str,
    /// Message id (UUID v4).
    pub msg_id: &'static str,
    /// Author timestamp, RFC 3339 UTC.
    pub timestamp: &'static str,
    /// Optional subject.
    pub subject: Option<&'static str>,
    /// Opaque ciphertext.
    pub ciphertext: &'static str,
    /// Expected signature (base64 of 64 bytes).
    pub expected_signature: &'static str,
    /// Expected replay key (hex of SHA-256).
    pub expected_replay_key: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "minimal",
            seed: [0x42; 32],
            sender_fp: "MJfi3uLLSjS1OEDNtwWu1xBnw29o2w4PVZw/P6BDMV8=",
            recipient_fp: "golden-recipient-1",
            msg_id: "9f8b7c6d-5e4f-4a3b-9c2d-1e0f9a8b7c6d",
            timestamp: "2025-01-14T16:00:00Z",
            subject: None,
            ciphertext: "Zm9v",
            expected_signature: "NpERk9Xjzx8uf58LaDsuedxW4ZqsWXtJ4nJk8dns4k8NjCaLr+zn7Ata35Jw9Cg/V0i5HB8CkUDwDFSTqOLJAQ==",
            expected_replay_key: "d45ee81ea76919438a70b4b1b9c18b312b83157adbce0e0a8b701314843f738d",
        },
        GoldenVector {
            name: "with_subject",
            seed: [0x42; 32],
            sender_fp: "MJfi3uLLSjS1OEDNtwWu1xBnw29o2w4PVZw/P6BDMV8=",
            recipient_fp: "golden-recipient-1",
            msg_id: "9f8b7c6d-5e4f-4a3b-9c2d-1e0f9a8b7c6d",
            timestamp: "2025-01-14T16:00:00Z",
            subject: Some("Quarterly report"),
            ciphertext: "Zm9v",
            expected_signature: "/wIQof5+Pi/qkfvjgu81vWQa9qBIpMV7R2yBNaoYzLQh/xSoX6tyROjWAiLsJy+ECE5E8rjM4zi8TWGApf44Bw==",
            expected_replay_key: "ef3a036e39b7079cc24683925070b703e4b2c94dec32321a51ea4a13e51a7f52",
        },
        GoldenVector {
            name: "nfc_subject",
            seed: [0x07; 32],
            sender_fp: "/oEsEvOrTOasXbaaw1L5BssbEe9D+zPiUu9/9VImOIk=",
            recipient_fp: "golden-recipient-2",
            msg_id: "a7b54edf-6c33-4b9a-8f21-d90c2e55f17a",
            timestamp: "2025-06-30T23:59:59Z",
            subject: Some("résumé"),
            ciphertext: "QUFBQQ==",
            expected_signature: "suS5sQ9vbNQsTlw6NSacNWdXJPsXFTtH6ShzGowU3tSYYHrBi5uJPatC6yPYSSIgPmwe9fpUBql1I02uK9ELAw==",
            expected_replay_key: "6e5e68ed506c991e979802ce9768842b3b66ce84908ecbcfc78864e5f67a203e",
        },
    ]
}

/// Generate a signed envelope from a golden vector.
pub fn generate_envelope_from_vector(vector: &GoldenVector) -> Envelope {
    let keypair = Keypair::from_seed(&vector.seed);

    let mut builder = EnvelopeBuilder::new(vector.sender_fp, vector.recipient_fp)
        .msg_id(vector.msg_id)
        .timestamp(vector.timestamp);

    if let Some(subject) = vector.subject {
        builder = builder.subject(subject);
    }

    builder
        .ciphertext(vector.ciphertext)
        .sign(&keypair)
        .expect("golden vectors are valid")
}

/// Verify all golden vectors against their expected outputs.
///
/// Returns `(name, matches, got_replay_key)` per vector, so a failing
/// implementation can print what it produced.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let envelope = generate_envelope_from_vector(v);
            let got = envelope
                .replay_key()
                .expect("golden vectors encode")
                .to_hex();
            let matches =
                envelope.signature == v.expected_signature && got == v.expected_replay_key;
            (v.name.to_string(), matches, got)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_match_expected_outputs() {
        for vector in all_vectors() {
            let keypair = Keypair::from_seed(&vector.seed);
            assert_eq!(
                keypair.fingerprint(),
                vector.sender_fp,
                "fingerprint mismatch for '{}'",
                vector.name
            );

            let envelope = generate_envelope_from_vector(&vector);
            assert_eq!(
                envelope.signature, vector.expected_signature,
                "signature mismatch for '{}'",
                vector.name
            );
            assert_eq!(
                envelope.replay_key().unwrap().to_hex(),
                vector.expected_replay_key,
                "replay key mismatch for '{}'",
                vector.name
            );
            assert!(
                envelope.verify(&keypair.public_key()).is_ok(),
                "verify failed for '{}'",
                vector.name
            );
        }
    }

    #[test]
    fn test_verify_all_vectors_reports_success() {
        for (name, matches, got) in verify_all_vectors() {
            assert!(matches, "vector '{}' produced {}", name, got);
        }
    }

    #[test]
    fn test_vectors_are_deterministic() {
        // Generate each vector twice, verify identical results
        for vector in all_vectors() {
            let e1 = generate_envelope_from_vector(&vector);
            let e2 = generate_envelope_from_vector(&vector);

            assert_eq!(
                e1.signature, e2.signature,
                "Vector '{}' produced different signatures on regeneration",
                vector.name
            );
            assert_eq!(
                e1.replay_key().unwrap(),
                e2.replay_key().unwrap(),
                "Vector '{}' produced different replay keys on regeneration",
                vector.name
            );
        }
    }

    #[test]
    fn test_decomposed_subject_normalizes_to_same_bytes() {
        // "résumé" written with combining accents signs identically to the
        // precomposed vector, because encoding applies NFC first
        let vectors = all_vectors();
        let nfc = &vectors[2];
        let keypair = Keypair::from_seed(&nfc.seed);

        let decomposed = EnvelopeBuilder::new(nfc.sender_fp, nfc.recipient_fp)
            .msg_id(nfc.msg_id)
            .timestamp(nfc.timestamp)
            .subject("re\u{301}sume\u{301}")
            .ciphertext(nfc.ciphertext)
            .sign(&keypair)
            .unwrap();

        assert_eq!(decomposed.signature, nfc.expected_signature);
        assert_eq!(
            decomposed.replay_key().unwrap().to_hex(),
            nfc.expected_replay_key
        );
    }

    #[test]
    fn test_subject_changes_replay_key() {
        let vectors = all_vectors();
        let minimal = generate_envelope_from_vector(&vectors[0]);
        let with_subject = generate_envelope_from_vector(&vectors[1]);

        assert_ne!(
            minimal.replay_key().unwrap(),
            with_subject.replay_key().unwrap()
        );
    }
}
