//! # Temporal Types: UTC-Only Timestamps
//!
//! Defines `Timestamp`, the type of a payload's `created` and `exp` fields.
//!
//! ## Security Invariant
//!
//! A payload's signature covers the textual form of its timestamps. A local
//! offset, a `+00:00` suffix, or a fractional second would produce different
//! canonical bytes for the same instant, so the only accepted and emitted form
//! is `YYYY-MM-DDTHH:MM:SSZ`.
//!
//! Parsing is strict: a string is accepted only if rendering the parsed value
//! reproduces the input exactly. Serialization and deserialization go through
//! the same rule, so a timestamp read from a payload re-encodes to the bytes
//! that were signed.

use chrono::{DateTime, Duration, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TimestampError;

const ISO_FMT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time, truncated.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`]: from `YYYY-MM-DDTHH:MM:SSZ`, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Parse a timestamp in the exact `YYYY-MM-DDTHH:MM:SSZ` form.
    ///
    /// **Rejects everything else**: explicit offsets (even `+00:00`),
    /// fractional seconds, lowercase `z`, and unpadded fields.
    ///
    /// # Errors
    ///
    /// Returns `TimestampError::InvalidFormat` if the input does not
    /// round-trip through the canonical format.
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        let naive = NaiveDateTime::parse_from_str(s, ISO_FMT)
            .map_err(|_| TimestampError::InvalidFormat(s.to_string()))?;
        let ts = Self(naive.and_utc());
        if ts.to_iso8601() != s {
            return Err(TimestampError::InvalidFormat(s.to_string()));
        }
        Ok(ts)
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Add whole days, as used for a payload's validity window.
    pub fn checked_add_days(&self, days: u32) -> Result<Self, TimestampError> {
        let delta = Duration::try_days(i64::from(days))
            .ok_or_else(|| TimestampError::Overflow(format!("{days} days")))?;
        self.0
            .checked_add_signed(delta)
            .map(Self)
            .ok_or_else(|| TimestampError::Overflow(format!("{self} + {days} days")))
    }

    /// Add (or subtract, if negative) whole seconds.
    pub fn checked_add_secs(&self, secs: i64) -> Result<Self, TimestampError> {
        let delta = Duration::try_seconds(secs)
            .ok_or_else(|| TimestampError::Overflow(format!("{secs} seconds")))?;
        self.0
            .checked_add_signed(delta)
            .map(Self)
            .ok_or_else(|| TimestampError::Overflow(format!("{self} + {secs} seconds")))
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format(ISO_FMT).to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
