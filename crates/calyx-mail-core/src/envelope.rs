//! Envelope: the signed unit of exchange.
//!
//! An envelope carries a plaintext header, an opaque base64 ciphertext,
//! and an Ed25519 signature over the canonical bytes of
//! `{protocol_version, header, ciphertext}`. Once signed, changing any of
//! those three fields invalidates the signature; `protocol_version` being
//! inside the signed set is what prevents version-substitution replays.
//!
//! The ciphertext is never inspected here. Sealing and unsealing belong to
//! the encryption primitive outside this layer.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::canonical::canonical_bytes;
use crate::crypto::{Ed25519PublicKey, Keypair, Sha256Hash};
use crate::error::{EncodeError, EnvelopeError, SignatureError};
use crate::value::Value;

/// The protocol version this library speaks.
pub const PROTOCOL_VERSION: &str = "0.1";

/// Maximum subject length in Unicode scalar values.
pub const MAX_SUBJECT_CHARS: usize = 256;

/// The key under which an envelope is tracked for replay defense:
/// SHA-256 of the canonical bytes of the entire envelope, signature
/// included. Corruption or re-signing yields a different key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplayKey(Sha256Hash);

impl ReplayKey {
    /// Create from a hash.
    pub const fn from_hash(hash: Sha256Hash) -> Self {
        Self(hash)
    }

    /// Parse from the 64-character hex form.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Sha256Hash::from_hex(s).map(Self)
    }

    /// The 64-character hex form (the stored primary key).
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ReplayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ReplayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReplayKey({})", &self.to_hex()[..16])
    }
}

impl From<Sha256Hash> for ReplayKey {
    fn from(hash: Sha256Hash) -> Self {
        Self(hash)
    }
}

/// The plaintext header of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvelopeHeader {
    /// Fingerprint of the sender's key. Opaque to this layer.
    pub sender_fp: String,

    /// Fingerprint of the recipient's key. Opaque to this layer.
    pub recipient_fp: String,

    /// UUIDv4 message identifier.
    pub msg_id: String,

    /// RFC 3339 UTC timestamp, author-claimed.
    pub timestamp: String,

    /// Optional subject line, at most 256 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl EnvelopeHeader {
    /// Check header shape: subject length and msg_id format.
    ///
    /// Required fields are present by construction; the timestamp gets its
    /// own check in [`crate::validation`].
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if let Some(subject) = &self.subject {
            let chars = subject.chars().count();
            if chars > MAX_SUBJECT_CHARS {
                return Err(EnvelopeError::SubjectTooLong {
                    chars,
                    max: MAX_SUBJECT_CHARS,
                });
            }
        }

        match Uuid::try_parse(&self.msg_id) {
            Ok(id) if id.get_version_num() == 4 => Ok(()),
            _ => Err(EnvelopeError::InvalidMsgId {
                value: self.msg_id.clone(),
            }),
        }
    }

    /// The header as a canonical-encoder value.
    ///
    /// `subject` appears only when set; an absent subject and a null
    /// subject are different values and would sign differently.
    fn to_value(&self) -> Value {
        let mut entries = vec![
            ("sender_fp".to_string(), Value::from(self.sender_fp.as_str())),
            (
                "recipient_fp".to_string(),
                Value::from(self.recipient_fp.as_str()),
            ),
            ("msg_id".to_string(), Value::from(self.msg_id.as_str())),
            ("timestamp".to_string(), Value::from(self.timestamp.as_str())),
        ];
        if let Some(subject) = &self.subject {
            entries.push(("subject".to_string(), Value::from(subject.as_str())));
        }
        Value::Map(entries)
    }
}

/// A complete envelope: signed payload fields plus the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    /// Protocol version, e.g. "0.1". Part of the signed material.
    pub protocol_version: String,

    /// The plaintext header. Part of the signed material.
    pub header: EnvelopeHeader,

    /// Opaque base64 sealed-box output. Part of the signed material.
    pub ciphertext: String,

    /// Base64 of the 64-byte Ed25519 signature.
    pub signature: String,
}

impl Envelope {
    /// Build and sign an envelope.
    ///
    /// Validates the header, assembles the signed payload, canonically
    /// encodes it, and signs. An encoding failure propagates before any
    /// signing call.
    pub fn build(
        header: EnvelopeHeader,
        ciphertext: impl Into<String>,
        keypair: &Keypair,
    ) -> Result<Self, EnvelopeError> {
        header.validate()?;

        let mut envelope = Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            header,
            ciphertext: ciphertext.into(),
            signature: String::new(),
        };
        let message = envelope.signing_bytes()?;
        envelope.signature = keypair.sign(&message).to_base64();
        Ok(envelope)
    }

    /// The signed payload as a value: exactly `protocol_version`,
    /// `header`, `ciphertext`.
    ///
    /// Logical construction order is version, header, ciphertext; the
    /// canonical encoder sorts keys, so the byte order is its own.
    pub fn payload_value(&self) -> Value {
        Value::map([
            (
                "protocol_version",
                Value::from(self.protocol_version.as_str()),
            ),
            ("header", self.header.to_value()),
            ("ciphertext", Value::from(self.ciphertext.as_str())),
        ])
    }

    /// The full envelope as a value, signature included.
    pub fn to_value(&self) -> Value {
        Value::map([
            (
                "protocol_version",
                Value::from(self.protocol_version.as_str()),
            ),
            ("header", self.header.to_value()),
            ("ciphertext", Value::from(self.ciphertext.as_str())),
            ("signature", Value::from(self.signature.as_str())),
        ])
    }

    /// Canonical bytes of the signed payload. Always rebuilt from the
    /// structured fields, never cached.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        canonical_bytes(&self.payload_value())
    }

    /// The replay key: SHA-256 of the canonical bytes of the entire
    /// envelope including the signature.
    pub fn replay_key(&self) -> Result<ReplayKey, EncodeError> {
        let bytes = canonical_bytes(&self.to_value())?;
        Ok(ReplayKey(Sha256Hash::hash(&bytes)))
    }

    /// Verify the signature against the rebuilt canonical payload.
    pub fn verify(&self, sender: &Ed25519PublicKey) -> Result<(), SignatureError> {
        crate::validation::verify_signature(self, sender)
    }

    /// Serialize to wire JSON.
    ///
    /// The wire form is for transport only. Canonical bytes for hashing
    /// and signing always come from [`canonical_bytes`] over the value
    /// tree, never from this.
    pub fn to_wire_json(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from wire JSON. Unknown fields are rejected.
    pub fn from_wire_json(json: &str) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builder for composing envelopes.
///
/// Fills `msg_id` with a fresh UUIDv4 and `timestamp` with the current
/// UTC instant unless explicitly set.
pub struct EnvelopeBuilder {
    sender_fp: String,
    recipient_fp: String,
    msg_id: Option<String>,
    timestamp: Option<String>,
    subject: Option<String>,
    ciphertext: String,
}

impl EnvelopeBuilder {
    /// Start building an envelope between two parties.
    pub fn new(sender_fp: impl Into<String>, recipient_fp: impl Into<String>) -> Self {
        Self {
            sender_fp: sender_fp.into(),
            recipient_fp: recipient_fp.into(),
            msg_id: None,
            timestamp: None,
            subject: None,
            ciphertext: String::new(),
        }
    }

    /// Set the message id.
    pub fn msg_id(mut self, id: impl Into<String>) -> Self {
        self.msg_id = Some(id.into());
        self
    }

    /// Set the timestamp.
    pub fn timestamp(mut self, ts: impl Into<String>) -> Self {
        self.timestamp = Some(ts.into());
        self
    }

    /// Set the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the ciphertext (opaque base64 from the sealing step).
    pub fn ciphertext(mut self, ciphertext: impl Into<String>) -> Self {
        self.ciphertext = ciphertext.into();
        self
    }

    /// Build and sign the envelope.
    pub fn sign(self, keypair: &Keypair) -> Result<Envelope, EnvelopeError> {
        let header = EnvelopeHeader {
            sender_fp: self.sender_fp,
            recipient_fp: self.recipient_fp,
            msg_id: self
                .msg_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            timestamp: self.timestamp.unwrap_or_else(now_timestamp),
            subject: self.subject,
        };
        Envelope::build(header, self.ciphertext, keypair)
    }
}

/// The current UTC instant in the timestamp format envelopes carry.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
