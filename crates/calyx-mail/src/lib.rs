//! # Calyx Mail
//!
//! The unified API for the Calyx mail protocol layer - signed envelopes
//! with deterministic canonical encoding and replay defense.
//!
//! ## Overview
//!
//! The mail protocol layer provides a library for:
//!
//! - **Envelopes**: Signed message containers carrying an opaque sealed payload
//! - **Canonical encoding**: One byte sequence per logical value, so every
//!   party signs and hashes the same thing
//! - **Replay defense**: Every accepted envelope is recorded atomically and
//!   never accepted twice
//! - **Sealing**: X25519 + ChaCha20-Poly1305 sealed boxes for the payload
//!
//! ## Key Concepts
//!
//! - **Envelope**: Immutable once signed. The signature covers the protocol
//!   version, the header, and the ciphertext.
//! - **Replay key**: SHA-256 of the canonical bytes of the full envelope,
//!   signature included. The unit of replay detection.
//! - **Pipeline**: Inbound envelopes pass version, shape, freshness, and
//!   signature checks before the store is ever consulted.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use calyx_mail::{Mailbox, MailboxConfig};
//! use calyx_mail::core::Keypair;
//! use calyx_mail::replay::SqliteReplayStore;
//!
//! // Open replay state
//! let store = SqliteReplayStore::open("replay.db").unwrap();
//! let mailbox = Mailbox::new(store, MailboxConfig::default());
//!
//! // Compose an outbound envelope
//! let keypair = Keypair::generate();
//! let envelope = mailbox
//!     .compose(&keypair, "recipient-fp", Some("greetings"), "Zm9v")
//!     .unwrap();
//!
//! // Receive it on the other side
//! let replay_key = mailbox.receive(&envelope, &keypair.public_key()).unwrap();
//! println!("accepted: {}", replay_key);
//! ```
//!
//! ## Re-exports
//!
//! The component crates are reachable without separate dependency lines:
//!
//! - `calyx_mail::core` - Envelope primitives and canonical encoding
//! - `calyx_mail::replay` - Replay store abstraction and SQLite backend
//! - `calyx_mail::seal` - Sealed-box payload encryption

pub mod error;
pub mod mailbox;

pub use calyx_mail_core as core;
pub use calyx_mail_replay as replay;
pub use calyx_mail_seal as seal;

pub use error::{MailError, Result};
pub use mailbox::{Mailbox, MailboxConfig};

// The types most callers touch, lifted to the crate root
pub use calyx_mail_core::{
    Ed25519PublicKey, Ed25519Signature, Envelope, EnvelopeBuilder, EnvelopeHeader, Keypair,
    ReplayKey, MAX_SUBJECT_CHARS, PROTOCOL_VERSION,
};
