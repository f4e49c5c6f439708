//! Sender/receiver fixtures for pipeline tests.
//!
//! A [`MailFixture`] is one party: a keypair plus an in-memory mailbox.
//! Integration tests build two or more and pass envelopes between them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use calyx_mail::{Mailbox, MailboxConfig};
use calyx_mail_core::{Ed25519PublicKey, Envelope, EnvelopeBuilder, Keypair};
use calyx_mail_replay::MemoryReplayStore;
use rand::RngCore;

/// A test fixture with a keypair and an in-memory mailbox.
pub struct MailFixture {
    pub keypair: Keypair,
    pub mailbox: Mailbox<MemoryReplayStore>,
}

impl MailFixture {
    /// A party with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
            mailbox: Mailbox::new(MemoryReplayStore::new(), MailboxConfig::default()),
        }
    }

    /// A party with a seed-derived keypair, for reproducible tests.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            mailbox: Mailbox::new(MemoryReplayStore::new(), MailboxConfig::default()),
        }
    }

    /// This party's verifying key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// This party's key fingerprint, as it appears in headers.
    pub fn fingerprint(&self) -> String {
        self.keypair.fingerprint()
    }

    /// Compose a signed envelope addressed to `recipient_fp`.
    pub fn make_envelope(&self, recipient_fp: &str, ciphertext: &str) -> Envelope {
        self.mailbox
            .compose(&self.keypair, recipient_fp, None, ciphertext)
            .expect("fixture envelopes are valid")
    }

    /// Compose a signed envelope with a subject.
    pub fn make_envelope_with_subject(
        &self,
        recipient_fp: &str,
        subject: &str,
        ciphertext: &str,
    ) -> Envelope {
        self.mailbox
            .compose(&self.keypair, recipient_fp, Some(subject), ciphertext)
            .expect("fixture envelopes are valid")
    }

    /// Build an envelope with an explicit timestamp, bypassing the
    /// mailbox defaults. Useful for freshness-window tests.
    pub fn make_envelope_at(
        &self,
        recipient_fp: &str,
        timestamp: &str,
        ciphertext: &str,
    ) -> Envelope {
        EnvelopeBuilder::new(self.keypair.fingerprint(), recipient_fp)
            .timestamp(timestamp)
            .ciphertext(ciphertext)
            .sign(&self.keypair)
            .expect("fixture envelopes are valid")
    }

    /// Receive an envelope into this fixture's mailbox, assuming it was
    /// sent by `sender`.
    pub fn receive_from(
        &self,
        sender: &MailFixture,
        envelope: &Envelope,
    ) -> calyx_mail::Result<calyx_mail_core::ReplayKey> {
        self.mailbox.receive(envelope, &sender.public_key())
    }
}

impl Default for MailFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` parties with distinct deterministic seeds.
pub fn multi_party_fixtures(count: usize) -> Vec<MailFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            MailFixture::with_seed(seed)
        })
        .collect()
}

/// A random base64 payload standing in for sealed-box output.
pub fn random_ciphertext(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}
