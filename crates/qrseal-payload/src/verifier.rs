//! # Verifier Pipeline
//!
//! Decides whether a document is authentic relative to a signed payload.
//! Checks run in a fixed order and the first failure ends the run:
//!
//! 1. **Key id**: the payload's `kid` must equal the pinned kid, if any, and
//!    must resolve to a key when verifying against a [`KeyStore`].
//! 2. **Signature**: `sig` must be present, decodable, and valid over the
//!    canonical encoding of the signed fields.
//! 3. **Hash binding**: the document must hash to `doc_hash`.
//! 4. **Expiry**: `now` must not be after `exp`. A payload without `exp`
//!    never expires.
//! 5. **Revocation**: the payload's triple must not be in the supplied set.
//!
//! Nothing from an unverified payload is trusted, so the document is not
//! even hashed until the signature stage has passed.

use std::convert::Infallible;
use std::io::{self, Read};

use qrseal_core::{sha256_bytes, sha256_reader, DocumentDigest, Timestamp};
use qrseal_crypto::{Ed25519Signature, KeyStore, VerifyingKey};

use crate::payload::SignedPayload;
use crate::revocation::RevocationSet;
use crate::verdict::{Verdict, VerificationFailure};

/// Where the verifier finds the issuer's public key.
#[derive(Debug, Clone, Copy)]
enum KeySource<'a> {
    Single(&'a VerifyingKey),
    Store(&'a KeyStore),
}

/// A configured verifier. Cheap to build; borrows its inputs.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'a> {
    keys: KeySource<'a>,
    revocations: Option<&'a RevocationSet>,
    expected_kid: Option<&'a str>,
}

impl<'a> Verifier<'a> {
    /// Verify against a single known public key.
    pub fn with_key(key: &'a VerifyingKey) -> Self {
        Self {
            keys: KeySource::Single(key),
            revocations: None,
            expected_kid: None,
        }
    }

    /// Verify against the key registered under the payload's `kid`.
    pub fn with_key_store(store: &'a KeyStore) -> Self {
        Self {
            keys: KeySource::Store(store),
            revocations: None,
            expected_kid: None,
        }
    }

    /// Check revocation against `set`.
    pub fn revocations(mut self, set: &'a RevocationSet) -> Self {
        self.revocations = Some(set);
        self
    }

    /// Require the payload to name `kid`.
    pub fn expected_kid(mut self, kid: &'a str) -> Self {
        self.expected_kid = Some(kid);
        self
    }

    /// Verify an in-memory document.
    pub fn verify(&self, document: &[u8], payload: &SignedPayload, now: Timestamp) -> Verdict {
        let result = self.run(payload, now, || {
            Ok::<_, Infallible>(sha256_bytes(document).digest)
        });
        match result {
            Ok(verdict) => verdict,
            Err(never) => match never {},
        }
    }

    /// Verify a document read from `reader`.
    ///
    /// The reader is consumed only if the signature stage passes. I/O errors
    /// while hashing are returned as errors, not verdicts.
    pub fn verify_reader<R: Read>(
        &self,
        reader: R,
        payload: &SignedPayload,
        now: Timestamp,
    ) -> io::Result<Verdict> {
        self.run(payload, now, || sha256_reader(reader).map(|h| h.digest))
    }

    fn run<E>(
        &self,
        payload: &SignedPayload,
        now: Timestamp,
        hash_document: impl FnOnce() -> Result<DocumentDigest, E>,
    ) -> Result<Verdict, E> {
        let fields = payload.fields();
        let verdict = match self.check_signed(payload) {
            Err(failure) => Verdict::Rejected(failure),
            Ok(()) => {
                let actual = hash_document()?.to_tagged();
                if actual != fields.doc_hash() {
                    tracing::debug!(expected = %fields.doc_hash(), actual = %actual, "hash mismatch");
                    Verdict::Rejected(VerificationFailure::HashMismatch {
                        expected: fields.doc_hash().to_string(),
                        actual,
                    })
                } else {
                    self.check_validity(payload, now)
                }
            }
        };

        tracing::info!(
            kid = %fields.kid(),
            issuer = %fields.issuer(),
            authentic = verdict.is_authentic(),
            reason = %verdict,
            "verification complete"
        );
        Ok(verdict)
    }

    /// Stages 1 and 2: key id and signature.
    fn check_signed(&self, payload: &SignedPayload) -> Result<(), VerificationFailure> {
        let kid = payload.kid();
        if let Some(expected) = self.expected_kid {
            if kid != expected {
                tracing::debug!(expected, found = kid, "kid mismatch");
                return Err(VerificationFailure::UnexpectedKid {
                    expected: expected.to_string(),
                    found: kid.to_string(),
                });
            }
        }

        let key = match self.keys {
            KeySource::Single(key) => key,
            KeySource::Store(store) => store.get(kid).ok_or_else(|| {
                tracing::debug!(kid, "kid not in key store");
                VerificationFailure::UnknownKid(kid.to_string())
            })?,
        };

        let sig = payload.sig().ok_or(VerificationFailure::MissingSignature)?;
        let signature = Ed25519Signature::from_base64url(sig)
            .map_err(|e| VerificationFailure::UndecodableSignature(e.to_string()))?;
        let message = payload
            .fields()
            .signing_message()
            .map_err(|e| VerificationFailure::InvalidSignature(e.to_string()))?;
        key.verify(&message, &signature)
            .map_err(|e| VerificationFailure::InvalidSignature(e.to_string()))?;
        tracing::debug!(kid, "signature valid");
        Ok(())
    }

    /// Stages 4 and 5: expiry and revocation.
    fn check_validity(&self, payload: &SignedPayload, now: Timestamp) -> Verdict {
        match payload.fields().exp() {
            Some(exp) if now > exp => {
                tracing::debug!(%now, %exp, "payload expired");
                return Verdict::Rejected(VerificationFailure::Expired);
            }
            Some(_) => {}
            None => tracing::warn!(kid = %payload.kid(), "payload has no exp; treating as non-expiring"),
        }

        if let Some(set) = self.revocations {
            if set.contains(payload) {
                tracing::debug!(doc_hash = %payload.doc_hash(), "payload revoked");
                return Verdict::Rejected(VerificationFailure::Revoked);
            }
        }
        Verdict::Authentic
    }
}

/// Verify `document` against `payload` with a single public key.
///
/// Returns a [`Verdict`]; bad documents and payloads are never errors.
pub fn verify(
    document: &[u8],
    payload: &SignedPayload,
    public_key: &VerifyingKey,
    now: Timestamp,
    revocations: Option<&RevocationSet>,
    expected_kid: Option<&str>,
) -> Verdict {
    configure(Verifier::with_key(public_key), revocations, expected_kid).verify(document, payload, now)
}

/// Verify `document` against `payload`, resolving the key by the payload's
/// `kid` in `store`. An unregistered kid is rejected before the signature
/// stage with "Unknown kid in payload".
pub fn verify_with_key_store(
    document: &[u8],
    payload: &SignedPayload,
    store: &KeyStore,
    now: Timestamp,
    revocations: Option<&RevocationSet>,
    expected_kid: Option<&str>,
) -> Verdict {
    configure(Verifier::with_key_store(store), revocations, expected_kid)
        .verify(document, payload, now)
}

fn configure<'a>(
    mut verifier: Verifier<'a>,
    revocations: Option<&'a RevocationSet>,
    expected_kid: Option<&'a str>,
) -> Verifier<'a> {
    if let Some(set) = revocations {
        verifier = verifier.revocations(set);
    }
    if let Some(kid) = expected_kid {
        verifier = verifier.expected_kid(kid);
    }
    verifier
}
