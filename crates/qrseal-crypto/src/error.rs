//! # Cryptographic Error Types
//!
//! Structured errors for all cryptographic operations in `qrseal-crypto`.
//!
//! Verification failures are ordinary outcomes for the payload verifier and
//! are turned into verdicts there. Key material errors (`KeySourceUnavailable`,
//! `InvalidSigningKey`, `InvalidPublicKey`) are operator errors and propagate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("Ed25519 verification failed: {0}")]
    VerificationFailed(String),

    /// The signature string is not valid base64url.
    #[error("signature is not valid base64url: {0}")]
    SignatureEncoding(String),

    /// Invalid Ed25519 signature length.
    #[error("invalid Ed25519 signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),

    /// Invalid Ed25519 public key.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid Ed25519 signing key.
    #[error("invalid Ed25519 signing key: {0}")]
    InvalidSigningKey(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(String),

    /// Key material could not be read from its source.
    #[error("key source unavailable: {}: {source}", path.display())]
    KeySourceUnavailable {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Key store file is not a valid JWKS document.
    #[error("invalid key store {}: {reason}", path.display())]
    KeyStoreFormat {
        /// The key store path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// I/O error writing key material.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
