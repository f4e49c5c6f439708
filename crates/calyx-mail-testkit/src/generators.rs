//! Proptest generators for property-based testing.

use proptest::prelude::*;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use calyx_mail_core::{Envelope, EnvelopeBuilder, Keypair, ReplayKey, Sha256Hash};
use chrono::{SecondsFormat, TimeZone, Utc};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random ReplayKey.
pub fn replay_key() -> impl Strategy<Value = ReplayKey> {
    any::<[u8; 32]>().prop_map(|bytes| ReplayKey::from_hash(Sha256Hash::from_bytes(bytes)))
}

/// Generate a fingerprint string the way real keys produce them.
pub fn fingerprint() -> impl Strategy<Value = String> {
    keypair().prop_map(|kp| kp.fingerprint())
}

/// Generate a valid version-4 `msg_id`.
pub fn msg_id() -> impl Strategy<Value = String> {
    any::<[u8; 16]>().prop_map(|bytes| {
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string()
    })
}

/// Generate an RFC 3339 UTC timestamp in a sane range.
pub fn timestamp() -> impl Strategy<Value = String> {
    // 2020-01-01 through mid-2033
    (1_577_836_800i64..=2_000_000_000i64).prop_map(|secs| {
        Utc.timestamp_opt(secs, 0)
            .single()
            .expect("in-range epoch seconds")
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    })
}

/// Generate an optional subject within the length limit.
pub fn subject() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-zA-Z0-9 .,!?-]{0,64}")
}

/// Generate base64 ciphertext of up to `max_len` raw bytes.
pub fn ciphertext(max_len: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<u8>(), 0..=max_len).prop_map(|bytes| STANDARD.encode(bytes))
}

/// Parameters for generating an envelope.
#[derive(Debug, Clone)]
pub struct EnvelopeParams {
    pub keypair: Keypair,
    pub recipient_fp: String,
    pub msg_id: String,
    pub timestamp: String,
    pub subject: Option<String>,
    pub ciphertext: String,
}

impl Arbitrary for EnvelopeParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // sender seed
            any::<[u8; 32]>(), // recipient seed
            msg_id(),
            timestamp(),
            subject(),
            ciphertext(256),
        )
            .prop_map(
                |(seed, recipient_seed, msg_id, timestamp, subject, ciphertext)| EnvelopeParams {
                    keypair: Keypair::from_seed(&seed),
                    recipient_fp: Keypair::from_seed(&recipient_seed).fingerprint(),
                    msg_id,
                    timestamp,
                    subject,
                    ciphertext,
                },
            )
            .boxed()
    }
}

/// Generate a signed envelope from parameters.
pub fn envelope_from_params(params: &EnvelopeParams) -> Envelope {
    let mut builder = EnvelopeBuilder::new(params.keypair.fingerprint(), &params.recipient_fp)
        .msg_id(&params.msg_id)
        .timestamp(&params.timestamp)
        .ciphertext(&params.ciphertext);

    if let Some(subject) = &params.subject {
        builder = builder.subject(subject);
    }

    builder
        .sign(&params.keypair)
        .expect("generated params are valid")
}
