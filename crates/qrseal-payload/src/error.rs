//! # Payload Error Types
//!
//! Hard errors raised while building, parsing, or persisting payloads and
//! revocation lists. Verification outcomes are not errors; see
//! [`Verdict`](crate::Verdict).

use std::path::PathBuf;

use qrseal_core::{CanonicalizationError, TimestampError};
use qrseal_crypto::CryptoError;
use thiserror::Error;

/// Errors from payload construction and payload I/O.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The document to bind contained no bytes.
    #[error("document is empty")]
    EmptyDocument,

    /// A required string input was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Validity window arithmetic failed.
    #[error("invalid validity window: {0}")]
    Timestamp(#[from] TimestampError),

    /// The unsigned fields could not be canonicalized.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The key provider failed to sign.
    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),

    /// A payload string was not a well-formed payload.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Reading the document or writing a payload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors loading or saving a revocation list.
///
/// [`RevocationSet::load_or_empty`](crate::RevocationSet::load_or_empty)
/// turns exactly these into an empty set; nothing else is swallowed.
#[derive(Error, Debug)]
pub enum RevocationLoadError {
    /// The revocation file could not be read or written.
    #[error("revocation list {} unavailable: {source}", path.display())]
    Io {
        /// The revocation list path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The revocation file is not valid revocation JSON.
    #[error("revocation list {} unparsable: {source}", path.display())]
    Parse {
        /// The revocation list path.
        path: PathBuf,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },
}
