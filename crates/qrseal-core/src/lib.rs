//! # qrseal-core: Foundational Types
//!
//! The leaf of the qrseal workspace. Both the payload builder and the
//! verifier depend on this crate so that signing and verification operate on
//! byte-identical representations.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every signed message flows through
//!    `CanonicalBytes::new()`: compact JSON, keys sorted, UTF-8. No raw
//!    `serde_json::to_vec()` for signing input.
//!
//! 2. **Streaming document digests.** Document hashing reads in fixed 64 KiB
//!    chunks, so arbitrarily large documents never need to be resident.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces `YYYY-MM-DDTHH:MM:SSZ`
//!    with zero sub-second component, and serializes to exactly that form.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `qrseal-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{
    sha256_bytes, sha256_reader, DigestAlgorithm, DocumentDigest, HashedDocument,
    DIGEST_CHUNK_SIZE,
};
pub use error::{CanonicalizationError, TimestampError};
pub use temporal::Timestamp;
