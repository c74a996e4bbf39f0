//! # Error Types
//!
//! Errors raised by the foundational primitives. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error constructing or doing arithmetic on a [`Timestamp`](crate::Timestamp).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The string is not in `YYYY-MM-DDTHH:MM:SSZ` form.
    #[error("timestamp must be YYYY-MM-DDTHH:MM:SSZ (UTC), got {0:?}")]
    InvalidFormat(String),

    /// Adding a duration left the representable range.
    #[error("timestamp arithmetic overflowed: {0}")]
    Overflow(String),
}
