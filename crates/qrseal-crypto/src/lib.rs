//! # qrseal-crypto: Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for qrseal:
//!
//! - **Ed25519** signing and verification over
//!   [`CanonicalBytes`](qrseal_core::CanonicalBytes), with base64url
//!   signature encoding.
//! - **Key providers** that own signing keys and expose only `sign`.
//! - **Key files** in PKCS#8 / SPKI PEM or hex.
//! - **Key store**: an explicit kid → public key registry persisted as JWKS.
//!
//! ## Crate Policy
//!
//! - Depends only on `qrseal-core` internally.
//! - No mocking of cryptographic operations in tests; all tests use real
//!   Ed25519 keys.

pub mod ed25519;
pub mod error;
pub mod key_file;
pub mod key_provider;
pub mod key_store;

pub use ed25519::{Ed25519Signature, SigningKey, VerifyingKey};
pub use error::CryptoError;
pub use key_file::{
    load_signing_key, load_verifying_key, write_signing_key_pem, write_verifying_key_pem,
};
pub use key_provider::{KeyProvider, LocalKeyProvider};
pub use key_store::{Jwk, KeyStore};
