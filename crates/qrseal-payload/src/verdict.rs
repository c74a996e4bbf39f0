//! # Verification Verdicts
//!
//! The verifier never returns an error for a bad document or payload. Every
//! such outcome is a [`Verdict::Rejected`] carrying the first failure found;
//! its `Display` is the diagnostic reason shown to the person verifying.

use std::fmt;

/// Human-readable reason for an authentic verdict.
pub const AUTHENTIC_REASON: &str = "Document authentic & unmodified";

/// Coarse classification of a verification failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The payload lacks a signature or its signature is undecodable.
    MalformedPayload,
    /// The signature does not verify against the resolved key.
    SignatureInvalid,
    /// The document digest differs from `doc_hash`.
    HashMismatch,
    /// `now` is past `exp`.
    Expired,
    /// The payload's triple is on the revocation list.
    Revoked,
    /// The payload's `kid` is not the expected or a known one.
    KeyIdMismatch,
}

/// The first check that failed, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// The caller pinned a kid and the payload names another.
    UnexpectedKid {
        /// Kid the caller required.
        expected: String,
        /// Kid the payload carries.
        found: String,
    },
    /// The payload's kid is absent from the key store.
    UnknownKid(String),
    /// `sig` is absent or empty.
    MissingSignature,
    /// `sig` is not base64url or not 64 bytes long.
    UndecodableSignature(String),
    /// The signature does not verify, or the signed view cannot be encoded.
    InvalidSignature(String),
    /// The document does not hash to `doc_hash`.
    HashMismatch {
        /// `doc_hash` from the payload.
        expected: String,
        /// Digest of the document presented.
        actual: String,
    },
    /// `now` is past `exp`.
    Expired,
    /// The payload's triple is revoked.
    Revoked,
}

impl VerificationFailure {
    /// Coarse classification, for callers that branch on the failure class.
    ///
    /// ```
    /// use qrseal_payload::{FailureKind, VerificationFailure};
    ///
    /// let failure = VerificationFailure::UnknownKid("k9".into());
    /// assert_eq!(failure.kind(), FailureKind::KeyIdMismatch);
    /// ```
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::UnexpectedKid { .. } | Self::UnknownKid(_) => FailureKind::KeyIdMismatch,
            Self::MissingSignature | Self::UndecodableSignature(_) => FailureKind::MalformedPayload,
            Self::InvalidSignature(_) => FailureKind::SignatureInvalid,
            Self::HashMismatch { .. } => FailureKind::HashMismatch,
            Self::Expired => FailureKind::Expired,
            Self::Revoked => FailureKind::Revoked,
        }
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedKid { .. } => f.write_str("Unexpected kid in payload"),
            Self::UnknownKid(_) => f.write_str("Unknown kid in payload"),
            Self::MissingSignature => f.write_str("Missing signature"),
            Self::UndecodableSignature(detail) | Self::InvalidSignature(detail) => {
                write!(f, "Invalid signature: {detail}")
            }
            Self::HashMismatch { .. } => {
                f.write_str("Hash mismatch: document does not match this payload")
            }
            Self::Expired => f.write_str("Payload expired"),
            Self::Revoked => f.write_str("Document revoked"),
        }
    }
}

impl std::error::Error for VerificationFailure {}

/// Outcome of running the verifier pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Verdict {
    /// Every check passed.
    Authentic,
    /// A check failed; later checks were not evaluated.
    Rejected(VerificationFailure),
}

impl Verdict {
    /// Returns true if every check passed.
    ///
    /// ```
    /// use qrseal_payload::{Verdict, VerificationFailure};
    ///
    /// assert!(Verdict::Authentic.is_authentic());
    /// assert!(!Verdict::from(VerificationFailure::Expired).is_authentic());
    /// ```
    pub fn is_authentic(&self) -> bool {
        matches!(self, Self::Authentic)
    }

    /// The failure, if rejected.
    pub fn failure(&self) -> Option<&VerificationFailure> {
        match self {
            Self::Authentic => None,
            Self::Rejected(failure) => Some(failure),
        }
    }

    /// Diagnostic reason string for display.
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Convert into a `Result` for callers that prefer `?`.
    pub fn into_result(self) -> Result<(), VerificationFailure> {
        match self {
            Self::Authentic => Ok(()),
            Self::Rejected(failure) => Err(failure),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentic => f.write_str(AUTHENTIC_REASON),
            Self::Rejected(failure) => fmt::Display::fmt(failure, f),
        }
    }
}

impl From<VerificationFailure> for Verdict {
    fn from(failure: VerificationFailure) -> Self {
        Self::Rejected(failure)
    }
}
