//! # qrseal-payload: Signed Document Payloads
//!
//! Binds a document to an issuer through a small signed JSON payload and
//! verifies that binding offline.
//!
//! - [`build_and_sign`]: hash a document, assemble the signed fields, sign
//!   them through a [`KeyProvider`](qrseal_crypto::KeyProvider).
//! - [`verify`] / [`Verifier`]: the ordered check pipeline, producing a
//!   [`Verdict`].
//! - [`RevocationSet`]: revoked `(doc_hash, issuer, created)` triples.
//!
//! ## Example
//!
//! ```
//! use qrseal_core::Timestamp;
//! use qrseal_crypto::{KeyProvider, LocalKeyProvider};
//! use qrseal_payload::{build_and_sign, verify, IssueRequest};
//!
//! let signer = LocalKeyProvider::generate();
//! let now = Timestamp::parse("2024-01-01T00:00:00Z").unwrap();
//! let request = IssueRequest::new("acme", "k1").doc_type("txt").validity_days(1);
//! let payload = build_and_sign(b"hello", &request, &signer, now).unwrap();
//!
//! let key = signer.verifying_key().unwrap();
//! let verdict = verify(b"hello", &payload, &key, now, None, None);
//! assert!(verdict.is_authentic());
//! ```

pub mod builder;
pub mod error;
pub mod payload;
pub mod revocation;
pub mod verdict;
pub mod verifier;

pub use builder::{build_and_sign, build_and_sign_reader, IssueRequest, DEFAULT_VALIDITY_DAYS};
pub use error::{PayloadError, RevocationLoadError};
pub use payload::{doc_type_from_path, PayloadFields, SignedPayload, PAYLOAD_VERSION};
pub use revocation::{RevocationEntry, RevocationSet};
pub use verdict::{FailureKind, Verdict, VerificationFailure, AUTHENTIC_REASON};
pub use verifier::{verify, verify_with_key_store, Verifier};
