//! The Mailbox: unified API for the Calyx mail protocol layer.
//!
//! A `Mailbox` ties envelope construction and the receive-side validation
//! pipeline to a replay store, so callers deal with one handle instead of
//! wiring the pieces together themselves.

use std::sync::Arc;
use std::time::Duration;

use calyx_mail_core::{
    check_timestamp, verify_signature, Ed25519PublicKey, Envelope, EnvelopeBuilder, Keypair,
    ReplayKey, DEFAULT_CLOCK_SKEW_WINDOW, PROTOCOL_VERSION,
};
use calyx_mail_replay::{
    now_millis, ReplayRecord, ReplayStore, ReplayStoreExt, StoreError, DEFAULT_RETENTION,
};
use chrono::{DateTime, Utc};

use crate::error::{MailError, Result};

/// Configuration for a Mailbox.
#[derive(Debug, Clone)]
pub struct MailboxConfig {
    /// Maximum accepted skew between an envelope timestamp and the
    /// receiver's clock, in either direction.
    pub clock_skew_window: Duration,
    /// How long replay records are kept before [`Mailbox::prune`] removes
    /// them. Must comfortably exceed `clock_skew_window`.
    pub retention_window: Duration,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            clock_skew_window: DEFAULT_CLOCK_SKEW_WINDOW,
            retention_window: DEFAULT_RETENTION,
        }
    }
}

/// The main Mailbox struct.
///
/// Provides a unified API for:
/// - Composing and signing outbound envelopes
/// - Validating inbound envelopes (version, shape, freshness, signature)
/// - Replay defense through an atomic check-and-record
/// - Pruning expired replay records
///
/// The mailbox holds no key material. Signing keypairs are passed to
/// [`compose`](Self::compose) and sender public keys to
/// [`receive`](Self::receive), one call at a time.
pub struct Mailbox<S: ReplayStore> {
    /// The replay store. The mailbox owns this handle exclusively.
    store: Arc<S>,
    /// Configuration.
    config: MailboxConfig,
}

impl<S: ReplayStore> Mailbox<S> {
    /// Create a new mailbox over the given replay store.
    pub fn new(store: S, config: MailboxConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &MailboxConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Send Path
    // ─────────────────────────────────────────────────────────────────────────

    /// Compose and sign an outbound envelope.
    ///
    /// Generates a fresh `msg_id` and a current timestamp; the sender
    /// fingerprint is derived from the keypair. The ciphertext is carried
    /// opaquely and never inspected.
    pub fn compose(
        &self,
        keypair: &Keypair,
        recipient_fp: &str,
        subject: Option<&str>,
        ciphertext: &str,
    ) -> Result<Envelope> {
        let mut builder = EnvelopeBuilder::new(keypair.fingerprint(), recipient_fp);
        if let Some(subject) = subject {
            builder = builder.subject(subject);
        }
        Ok(builder.ciphertext(ciphertext).sign(keypair)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Receive Path
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate an inbound envelope and record it against replay.
    ///
    /// The checks run in a fixed order and the first failure wins:
    /// protocol version, header shape, timestamp freshness, signature,
    /// then the atomic replay check-and-record. The store is touched only
    /// after every stateless check passed, so a stale or forged envelope
    /// leaves no trace.
    ///
    /// Returns the envelope's replay key on acceptance.
    pub fn receive(&self, envelope: &Envelope, sender: &Ed25519PublicKey) -> Result<ReplayKey> {
        self.receive_at(envelope, sender, Utc::now())
    }

    /// Like [`receive`](Self::receive), with an explicit clock for tests.
    pub fn receive_at(
        &self,
        envelope: &Envelope,
        sender: &Ed25519PublicKey,
        now: DateTime<Utc>,
    ) -> Result<ReplayKey> {
        // 1. Protocol version
        if envelope.protocol_version != PROTOCOL_VERSION {
            return Err(MailError::UnsupportedVersion {
                version: envelope.protocol_version.clone(),
            });
        }

        // 2. Header shape
        envelope.header.validate()?;

        // 3. Timestamp freshness
        check_timestamp(&envelope.header.timestamp, now, self.config.clock_skew_window)?;

        // 4. Signature over the rebuilt canonical payload
        verify_signature(envelope, sender)?;

        // 5. Atomic replay check-and-record
        let record = ReplayRecord::from_envelope(envelope, now_millis())?;
        match self.store.check_and_record(&record) {
            Ok(()) => {
                tracing::debug!(
                    "Accepted envelope {} from {}",
                    record.msg_id,
                    record.sender_fp
                );
                Ok(record.replay_key)
            }
            Err(e) => {
                if matches!(e, StoreError::Replay { .. }) {
                    tracing::warn!(
                        "Rejected replayed envelope {} (key {})",
                        record.msg_id,
                        record.replay_key
                    );
                }
                Err(e.into())
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Housekeeping
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove replay records older than the configured retention window.
    ///
    /// Returns the number of records removed. Safe to call from a periodic
    /// task while receives are in flight.
    pub fn prune(&self) -> Result<usize> {
        Ok(self.store.prune(self.config.retention_window)?)
    }
}
