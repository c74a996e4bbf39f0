//! # Key Provider Abstraction
//!
//! Abstracts Ed25519 signing behind a trait so the payload builder never
//! touches key material directly:
//!
//! - [`LocalKeyProvider`]: holds a [`SigningKey`] in process memory, loaded
//!   from a key file or generated.
//!
//! ## Security Invariants
//!
//! - Key material is zeroized on drop (dalek `zeroize` feature).
//! - `KeyProvider` is `Send + Sync`; one provider can sign from many threads.
//! - Signing input is `&CanonicalBytes`, never raw bytes.

use std::path::Path;

use qrseal_core::CanonicalBytes;

use crate::ed25519::{Ed25519Signature, SigningKey, VerifyingKey};
use crate::error::CryptoError;
use crate::key_file::load_signing_key;

/// Trait for Ed25519 signing backends.
pub trait KeyProvider: Send + Sync {
    /// Sign canonicalized data with the managed Ed25519 key.
    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError>;

    /// Return the Ed25519 verifying (public) key.
    fn verifying_key(&self) -> Result<VerifyingKey, CryptoError>;

    /// Human-readable name for this provider (for diagnostics/logging).
    fn provider_name(&self) -> &str;
}

// ─── LocalKeyProvider ────────────────────────────────────────────────────

/// In-memory Ed25519 key provider.
pub struct LocalKeyProvider {
    key: SigningKey,
}

impl LocalKeyProvider {
    /// Create from an existing signing key.
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Generate a new random key using the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(),
        }
    }

    /// Create from raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_seed(seed),
        }
    }

    /// Load the key from a PKCS#8 PEM or hex seed file.
    pub fn from_file(path: &Path) -> Result<Self, CryptoError> {
        load_signing_key(path).map(Self::new)
    }
}

impl KeyProvider for LocalKeyProvider {
    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, CryptoError> {
        Ok(self.key.sign(data))
    }

    fn verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        Ok(self.key.verifying_key())
    }

    fn provider_name(&self) -> &str {
        "LocalKeyProvider"
    }
}

impl std::fmt::Debug for LocalKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyProvider")
            .field("verifying_key", &self.key.verifying_key())
            .finish()
    }
}
