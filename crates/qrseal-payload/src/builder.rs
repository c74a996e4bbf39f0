//! # Payload Builder
//!
//! Binds a document to an issuer's key: hashes the document, assembles the
//! signed fields, canonicalizes them, and signs through a [`KeyProvider`].
//!
//! The builder never sees key material. It is deterministic for a fixed
//! document, request, key, and `now`, since Ed25519 signing is itself
//! deterministic.

use std::io::Read;

use qrseal_core::{sha256_bytes, sha256_reader, DocumentDigest, Timestamp};
use qrseal_crypto::KeyProvider;

use crate::error::PayloadError;
use crate::payload::{PayloadFields, SignedPayload};

/// Default validity window, in days, for newly issued payloads.
pub const DEFAULT_VALIDITY_DAYS: u32 = 365 * 3;

/// Issuer-side parameters for a new payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    issuer: String,
    kid: String,
    doc_type: String,
    validity_days: u32,
}

impl IssueRequest {
    /// A request with no `doc_type` hint and the default validity window.
    pub fn new(issuer: impl Into<String>, kid: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            kid: kid.into(),
            doc_type: String::new(),
            validity_days: DEFAULT_VALIDITY_DAYS,
        }
    }

    /// Set the `doc_type` hint. Stored lowercased.
    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = doc_type.into().to_lowercase();
        self
    }

    /// Set the validity window. Zero makes `exp` equal to `created`.
    pub fn validity_days(mut self, days: u32) -> Self {
        self.validity_days = days;
        self
    }

    /// Issuer recorded in the payload.
    ///
    /// ```
    /// use qrseal_payload::IssueRequest;
    ///
    /// let request = IssueRequest::new("acme", "k1");
    /// assert_eq!((request.issuer(), request.kid()), ("acme", "k1"));
    /// ```
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Key id recorded in the payload.
    pub fn kid(&self) -> &str {
        &self.kid
    }

    fn validate(&self) -> Result<(), PayloadError> {
        if self.issuer.is_empty() {
            return Err(PayloadError::EmptyField("issuer"));
        }
        if self.kid.is_empty() {
            return Err(PayloadError::EmptyField("kid"));
        }
        Ok(())
    }
}

/// Build and sign a payload for an in-memory document.
///
/// # Errors
///
/// - [`PayloadError::EmptyDocument`] for a zero-length document.
/// - [`PayloadError::EmptyField`] for an empty issuer or kid.
/// - [`PayloadError::Timestamp`] if `now + validity_days` overflows.
/// - [`PayloadError::Signing`] if the key provider fails.
pub fn build_and_sign(
    document: &[u8],
    request: &IssueRequest,
    signer: &dyn KeyProvider,
    now: Timestamp,
) -> Result<SignedPayload, PayloadError> {
    request.validate()?;
    if document.is_empty() {
        return Err(PayloadError::EmptyDocument);
    }
    let hashed = sha256_bytes(document);
    sign_digest(&hashed.digest, request, signer, now)
}

/// Build and sign a payload for a document read from `reader`.
///
/// The document is streamed through the hasher; only the digest is kept.
pub fn build_and_sign_reader<R: Read>(
    reader: R,
    request: &IssueRequest,
    signer: &dyn KeyProvider,
    now: Timestamp,
) -> Result<SignedPayload, PayloadError> {
    request.validate()?;
    let hashed = sha256_reader(reader)?;
    if hashed.len == 0 {
        return Err(PayloadError::EmptyDocument);
    }
    sign_digest(&hashed.digest, request, signer, now)
}

fn sign_digest(
    digest: &DocumentDigest,
    request: &IssueRequest,
    signer: &dyn KeyProvider,
    now: Timestamp,
) -> Result<SignedPayload, PayloadError> {
    let exp = now.checked_add_days(request.validity_days)?;
    let fields = PayloadFields::new(
        digest.to_tagged(),
        request.doc_type.clone(),
        request.issuer.clone(),
        request.kid.clone(),
        now,
        exp,
    );
    let message = fields.signing_message()?;
    let sig = signer.sign(&message)?;

    tracing::debug!(
        provider = signer.provider_name(),
        issuer = %request.issuer,
        kid = %request.kid,
        doc_hash = %digest,
        exp = %exp,
        "payload signed"
    );

    Ok(SignedPayload::new(fields, sig.to_base64url()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrseal_crypto::{Ed25519Signature, LocalKeyProvider};

    fn now() -> Timestamp {
        Timestamp::parse("2024-01-01T00:00:00Z").unwrap()
    }

    #[test]
    fn builds_expected_fields() {
        let signer = LocalKeyProvider::from_seed(&[7u8; 32]);
        let req = IssueRequest::new("acme", "k1").doc_type("TXT").validity_days(1);
        let p = build_and_sign(b"hello", &req, &signer, now()).unwrap();

        let f = p.fields();
        assert_eq!(f.version(), 1);
        assert_eq!(
            f.doc_hash(),
            "SHA256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(f.doc_type(), "txt");
        assert_eq!(f.issuer(), "acme");
        assert_eq!(f.kid(), "k1");
        assert_eq!(f.created().to_iso8601(), "2024-01-01T00:00:00Z");
        assert_eq!(f.exp().unwrap().to_iso8601(), "2024-01-02T00:00:00Z");
        assert!(f.extensions().is_empty());
    }

    #[test]
    fn signature_covers_canonical_fields() {
        let signer = LocalKeyProvider::generate();
        let p = build_and_sign(b"hello", &IssueRequest::new("acme", "k1"), &signer, now()).unwrap();
        let sig = Ed25519Signature::from_base64url(p.sig().unwrap()).unwrap();
        let msg = p.fields().signing_message().unwrap();
        signer.verifying_key().unwrap().verify(&msg, &sig).unwrap();
    }

    #[test]
    fn default_validity_is_three_years() {
        let signer = LocalKeyProvider::generate();
        let p = build_and_sign(b"x", &IssueRequest::new("acme", "k1"), &signer, now()).unwrap();
        let exp = p.fields().exp().unwrap();
        assert_eq!(
            exp.epoch_secs() - now().epoch_secs(),
            i64::from(DEFAULT_VALIDITY_DAYS) * 86_400
        );
    }

    #[test]
    fn zero_validity_sets_exp_to_created() {
        let signer = LocalKeyProvider::generate();
        let req = IssueRequest::new("acme", "k1").validity_days(0);
        let p = build_and_sign(b"x", &req, &signer, now()).unwrap();
        assert_eq!(p.fields().exp(), Some(p.fields().created()));
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let signer = LocalKeyProvider::from_seed(&[9u8; 32]);
        let req = IssueRequest::new("acme", "k1").doc_type("pdf");
        let a = build_and_sign(b"contract", &req, &signer, now()).unwrap();
        let b = build_and_sign(b"contract", &req, &signer, now()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_compact_json().unwrap(), b.to_compact_json().unwrap());
    }

    #[test]
    fn rejects_empty_inputs() {
        let signer = LocalKeyProvider::generate();
        assert!(matches!(
            build_and_sign(b"", &IssueRequest::new("acme", "k1"), &signer, now()),
            Err(PayloadError::EmptyDocument)
        ));
        assert!(matches!(
            build_and_sign(b"x", &IssueRequest::new("", "k1"), &signer, now()),
            Err(PayloadError::EmptyField("issuer"))
        ));
        assert!(matches!(
            build_and_sign(b"x", &IssueRequest::new("acme", ""), &signer, now()),
            Err(PayloadError::EmptyField("kid"))
        ));
        assert!(matches!(
            build_and_sign_reader(std::io::empty(), &IssueRequest::new("acme", "k1"), &signer, now()),
            Err(PayloadError::EmptyDocument)
        ));
    }

    #[test]
    fn validity_overflow_is_an_error() {
        let signer = LocalKeyProvider::generate();
        let far = Timestamp::parse("9999-12-31T00:00:00Z").unwrap();
        let req = IssueRequest::new("acme", "k1").validity_days(u32::MAX);
        assert!(matches!(
            build_and_sign(b"x", &req, &signer, far),
            Err(PayloadError::Timestamp(_))
        ));
    }

    #[test]
    fn reader_and_slice_agree() {
        let signer = LocalKeyProvider::from_seed(&[3u8; 32]);
        let req = IssueRequest::new("acme", "k1");
        let doc = vec![0xA5u8; 200_000];
        let a = build_and_sign(&doc, &req, &signer, now()).unwrap();
        let b = build_and_sign_reader(doc.as_slice(), &req, &signer, now()).unwrap();
        assert_eq!(a, b);
    }
}
