//! Envelope verification: timestamp-window and signature checks.
//!
//! Order matters for callers: the timestamp window is enforced before
//! signature verification and both before any replay-store access, so
//! out-of-window spam never touches persistent state.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::crypto::{Ed25519PublicKey, Ed25519Signature};
use crate::envelope::Envelope;
use crate::error::{SignatureError, TimestampError};

/// The default acceptance window around the receiver's clock.
pub const DEFAULT_CLOCK_SKEW_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Check that a header timestamp falls within the acceptance window.
///
/// Parses RFC 3339 and compares instants, so any valid offset is
/// accepted; the window boundary itself is inclusive. Returns the parsed
/// instant in UTC.
pub fn check_timestamp(
    timestamp: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<DateTime<Utc>, TimestampError> {
    let parsed = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| TimestampError::Malformed {
            value: timestamp.to_string(),
        })?
        .with_timezone(&Utc);

    let skew_ms = parsed.signed_duration_since(now).num_milliseconds();
    if skew_ms.unsigned_abs() > window.as_millis() as u64 {
        return Err(TimestampError::OutsideWindow {
            skew_seconds: skew_ms / 1000,
            window_seconds: window.as_secs() as i64,
        });
    }

    Ok(parsed)
}

/// Verify an envelope's signature.
///
/// The signed payload is rebuilt from the envelope's own structured
/// fields and re-encoded; received bytes are never trusted, so any
/// post-hoc field tampering is caught regardless of how the envelope
/// was transported.
pub fn verify_signature(
    envelope: &Envelope,
    sender: &Ed25519PublicKey,
) -> Result<(), SignatureError> {
    // 1. Rebuild and canonical-encode the signed payload
    let message = envelope.signing_bytes()?;

    // 2. Decode the claimed signature (exactly 64 raw bytes)
    let signature = Ed25519Signature::from_base64(&envelope.signature)?;

    // 3. Verify against the sender's public key
    sender.verify(&message, &signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::envelope::EnvelopeBuilder;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 14, 16, 0, 0).unwrap()
    }

    #[test]
    fn test_timestamp_within_window() {
        let parsed =
            check_timestamp("2025-01-14T15:58:30Z", now(), DEFAULT_CLOCK_SKEW_WINDOW).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 14, 15, 58, 30).unwrap());
    }

    #[test]
    fn test_timestamp_boundary_inclusive() {
        // Exactly five minutes out, both directions
        assert!(check_timestamp("2025-01-14T15:55:00Z", now(), DEFAULT_CLOCK_SKEW_WINDOW).is_ok());
        assert!(check_timestamp("2025-01-14T16:05:00Z", now(), DEFAULT_CLOCK_SKEW_WINDOW).is_ok());
    }

    #[test]
    fn test_timestamp_six_minutes_stale() {
        let err = check_timestamp("2025-01-14T15:54:00Z", now(), DEFAULT_CLOCK_SKEW_WINDOW)
            .unwrap_err();
        assert!(matches!(
            err,
            TimestampError::OutsideWindow {
                skew_seconds: -360,
                window_seconds: 300,
            }
        ));
    }

    #[test]
    fn test_timestamp_future_rejected() {
        let err = check_timestamp("2025-01-14T16:06:00Z", now(), DEFAULT_CLOCK_SKEW_WINDOW)
            .unwrap_err();
        assert!(matches!(err, TimestampError::OutsideWindow { .. }));
    }

    #[test]
    fn test_timestamp_malformed() {
        for bad in ["", "yesterday", "2025-01-14", "2025-01-14 16:00:00"] {
            assert!(matches!(
                check_timestamp(bad, now(), DEFAULT_CLOCK_SKEW_WINDOW),
                Err(TimestampError::Malformed { .. })
            ));
        }
    }

    #[test]
    fn test_timestamp_offset_forms() {
        // Explicit zero offset and fractional seconds both parse
        assert!(
            check_timestamp("2025-01-14T16:00:00+00:00", now(), DEFAULT_CLOCK_SKEW_WINDOW).is_ok()
        );
        assert!(
            check_timestamp("2025-01-14T16:00:00.250Z", now(), DEFAULT_CLOCK_SKEW_WINDOW).is_ok()
        );
        // Non-zero offsets compare as instants: 17:00+01:00 is 16:00Z
        assert!(
            check_timestamp("2025-01-14T17:00:00+01:00", now(), DEFAULT_CLOCK_SKEW_WINDOW).is_ok()
        );
    }

    #[test]
    fn test_verify_signature_roundtrip() {
        let keypair = Keypair::generate();
        let envelope = EnvelopeBuilder::new("A", "B")
            .ciphertext("Zm9v")
            .sign(&keypair)
            .unwrap();
        verify_signature(&envelope, &keypair.public_key()).unwrap();
    }

    #[test]
    fn test_verify_signature_malformed_base64() {
        let keypair = Keypair::generate();
        let mut envelope = EnvelopeBuilder::new("A", "B")
            .ciphertext("Zm9v")
            .sign(&keypair)
            .unwrap();
        envelope.signature = "@@not-base64@@".to_string();
        assert!(matches!(
            verify_signature(&envelope, &keypair.public_key()),
            Err(SignatureError::MalformedSignature)
        ));
    }

    #[test]
    fn test_verify_signature_truncated() {
        let keypair = Keypair::generate();
        let mut envelope = EnvelopeBuilder::new("A", "B")
            .ciphertext("Zm9v")
            .sign(&keypair)
            .unwrap();
        // Valid base64, wrong byte count
        use base64::Engine as _;
        envelope.signature = base64::engine::general_purpose::STANDARD.encode([0u8; 32]);
        assert!(matches!(
            verify_signature(&envelope, &keypair.public_key()),
            Err(SignatureError::MalformedSignature)
        ));
    }
}
