//! # Ed25519 Signing and Verification
//!
//! Provides Ed25519 key handling, signing, and verification for payload
//! signatures.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&CanonicalBytes`; raw bytes cannot be signed.
//!   The builder and the verifier therefore always agree on the message.
//! - Verification uses `verify_strict`, which rejects small-order public keys
//!   and non-canonical `R`/`s` encodings (signature malleability).
//! - Signatures travel as base64url without padding. Decoding is strict: no
//!   padding, no trailing bits, exactly 64 bytes.
//! - `SigningKey` does not implement `Serialize` and its `Debug` output is
//!   redacted. The dalek key is zeroized on drop.

use base64::engine::{general_purpose::URL_SAFE_NO_PAD as BASE64_URL_NO_PAD, Engine};
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use ed25519_dalek::Signer;
use qrseal_core::CanonicalBytes;

use crate::error::CryptoError;

pub use ed25519_dalek::pkcs8::spki::der::pem::LineEnding;

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 verifying (public) key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// An Ed25519 signing (private) key.
pub struct SigningKey(ed25519_dalek::SigningKey);

// ---------------------------------------------------------------------------
// Ed25519Signature
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Encode as base64url without padding (the payload `sig` form).
    pub fn to_base64url(&self) -> String {
        BASE64_URL_NO_PAD.encode(self.0)
    }

    /// Decode a base64url (no padding) signature string.
    pub fn from_base64url(s: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64_URL_NO_PAD
            .decode(s)
            .map_err(|e| CryptoError::SignatureEncoding(e.to_string()))?;
        let len = bytes.len();
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureLength(len))?;
        Ok(Self(arr))
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", hex_prefix(&self.0))
    }
}

impl std::fmt::Display for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64url())
    }
}

// ---------------------------------------------------------------------------
// VerifyingKey
// ---------------------------------------------------------------------------

impl VerifyingKey {
    /// Create a verifying key from raw 32 bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Return the raw 32-byte public key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Render the public key as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.as_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a public key from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let arr = hex_to_array::<32>(hex.trim())
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Self::from_bytes(&arr)
    }

    /// Encode the raw key as base64url without padding (the JWK `x` member).
    pub fn to_base64url(&self) -> String {
        BASE64_URL_NO_PAD.encode(self.0.as_bytes())
    }

    /// Decode a JWK `x` member.
    pub fn from_base64url(s: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64_URL_NO_PAD
            .decode(s)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        let len = bytes.len();
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidPublicKey(format!("expected 32 bytes, got {len}"))
        })?;
        Self::from_bytes(&arr)
    }

    /// Parse a SubjectPublicKeyInfo PEM document.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, CryptoError> {
        ed25519_dalek::VerifyingKey::from_public_key_pem(pem)
            .map(Self)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Render as a SubjectPublicKeyInfo PEM document.
    pub fn to_public_key_pem(&self) -> Result<String, CryptoError> {
        self.0
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Verify a signature over canonical bytes.
    pub fn verify(
        &self,
        data: &CanonicalBytes,
        signature: &Ed25519Signature,
    ) -> Result<(), CryptoError> {
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.0
            .verify_strict(data.as_bytes(), &sig)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({}...)", hex_prefix(self.0.as_bytes()))
    }
}

impl std::fmt::Display for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// SigningKey
// ---------------------------------------------------------------------------

impl SigningKey {
    /// Generate a new random key using the OS CSPRNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create a signing key from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(seed))
    }

    /// Parse a 64-character hex seed.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let seed = hex_to_array::<32>(hex.trim())
            .map_err(|e| CryptoError::InvalidSigningKey(e.to_string()))?;
        Ok(Self::from_seed(&seed))
    }

    /// Parse an unencrypted PKCS#8 PEM document.
    ///
    /// Passphrase-protected (`ENCRYPTED PRIVATE KEY`) documents are rejected.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CryptoError> {
        if pem.contains("ENCRYPTED PRIVATE KEY") {
            return Err(CryptoError::InvalidSigningKey(
                "passphrase-protected PKCS#8 keys are not supported".to_string(),
            ));
        }
        ed25519_dalek::SigningKey::from_pkcs8_pem(pem)
            .map(Self)
            .map_err(|e| CryptoError::InvalidSigningKey(e.to_string()))
    }

    /// Render as an unencrypted PKCS#8 PEM document.
    pub fn to_pkcs8_pem(&self) -> Result<String, CryptoError> {
        self.0
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.as_str().to_string())
            .map_err(|e| CryptoError::InvalidSigningKey(e.to_string()))
    }

    /// Return the corresponding verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.0.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn hex_to_array<const N: usize>(hex: &str) -> Result<[u8; N], CryptoError> {
    if hex.len() != N * 2 {
        return Err(CryptoError::HexDecode(format!(
            "expected {} hex chars, got {}",
            N * 2,
            hex.len()
        )));
    }
    let mut out = [0u8; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let pair = hex
            .get(i * 2..i * 2 + 2)
            .ok_or_else(|| CryptoError::HexDecode(format!("invalid hex at position {}", i * 2)))?;
        *slot = u8::from_str_radix(pair, 16)
            .map_err(|e| CryptoError::HexDecode(format!("invalid hex at position {}: {e}", i * 2)))?;
    }
    Ok(out)
}
