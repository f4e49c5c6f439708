//! # Calyx Mail Testkit
//!
//! Shared test machinery for the mail protocol crates: golden vectors
//! pinning the canonical byte formats, proptest strategies over whole
//! envelopes, and sender/receiver fixtures for pipeline scenarios.
//!
//! Anything here may appear in dev-dependencies only; production crates
//! must not link it.
//!
//! ## Golden vectors
//!
//! Each [`GoldenVector`](vectors::GoldenVector) fixes a seed, a header,
//! and the exact canonical string, signature, and replay key an envelope
//! built from them must produce. Another implementation of the protocol
//! can check itself against the same table:
//!
//! ```rust
//! use calyx_mail_testkit::vectors::{all_vectors, generate_envelope_from_vector};
//!
//! for vector in all_vectors() {
//!     let envelope = generate_envelope_from_vector(&vector);
//!     println!("{}: {}", vector.name, envelope.replay_key().unwrap().to_hex());
//! }
//! ```
//!
//! ## Property strategies
//!
//! [`EnvelopeParams`](generators::EnvelopeParams) implements `Arbitrary`,
//! so whole-envelope properties read naturally:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use calyx_mail_testkit::generators::{envelope_from_params, EnvelopeParams};
//!
//! proptest! {
//!     #[test]
//!     fn replay_key_is_deterministic(params: EnvelopeParams) {
//!         let e1 = envelope_from_params(&params);
//!         let e2 = envelope_from_params(&params);
//!         prop_assert_eq!(e1.replay_key().unwrap(), e2.replay_key().unwrap());
//!     }
//! }
//! ```
//!
//! ## Fixtures
//!
//! [`MailFixture`](fixtures::MailFixture) bundles a keypair with an
//! in-memory mailbox, so a send/receive scenario is three lines:
//!
//! ```rust
//! use calyx_mail_testkit::fixtures::MailFixture;
//!
//! let alice = MailFixture::with_seed([0x01; 32]);
//! let bob = MailFixture::with_seed([0x02; 32]);
//! let envelope = alice.make_envelope(&bob.fingerprint(), "Zm9v");
//! bob.receive_from(&alice, &envelope).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{multi_party_fixtures, random_ciphertext, MailFixture};
pub use generators::{envelope_from_params, EnvelopeParams};
pub use vectors::{all_vectors, generate_envelope_from_vector, verify_all_vectors, GoldenVector};
