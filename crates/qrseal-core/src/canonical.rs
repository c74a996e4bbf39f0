//! # Canonical Serialization: JCS-Compatible Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! that are signed or verified anywhere in qrseal.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which rejects floats and
//! then serializes with sorted keys and compact separators. Any function that
//! signs or verifies must accept `&CanonicalBytes`, so a payload can never be
//! signed over one encoding and verified over another.
//!
//! ## Encoding Rules
//!
//! 1. **Reject floats**: float formatting differs across platforms and
//!    languages; integers and strings only.
//! 2. **Sorted keys**: every object, at every depth, emits keys in ascending
//!    order.
//! 3. **Compact**: no insignificant whitespace.
//! 4. **ASCII only**: every character outside printable ASCII (`0x7F` and
//!    above) is written as a lowercase `\uXXXX` escape, with UTF-16
//!    surrogate pairs above the BMP. Control characters keep the RFC 8785
//!    escapes. Payloads issued by other tools encode text this way, so the
//!    signed bytes must match it exactly.
//!
//! Serialization uses `serde_jcs` (RFC 8785), followed by the ASCII escape
//! pass.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonical serialization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - No floats anywhere in the encoded value.
/// - Keys sorted, compact separators, pure ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// float. Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(escape_non_ascii(&s).into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Non-ASCII only occurs inside JSON strings, so escaping the whole
/// document is equivalent to escaping each string.
fn escape_non_ascii(json: &str) -> String {
    if json.bytes().all(|b| b < 0x7F) {
        return json.to_string();
    }
    let mut out = String::with_capacity(json.len() + 16);
    let mut units = [0u16; 2];
    for c in json.chars() {
        if (c as u32) < 0x7F {
            out.push(c);
            continue;
        }
        for unit in c.encode_utf16(&mut units) {
            out.push_str(&format!("\\u{unit:04x}"));
        }
    }
    out
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return Ok(());
            }
            Err(CanonicalizationError::FloatRejected(
                n.as_f64().unwrap_or(f64::NAN),
            ))
        }
        Value::Object(map) => map.values().try_for_each(reject_floats),
        Value::Array(arr) => arr.iter().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_canonical_bytes_simple_dict() {
        let data = serde_json::json!({"b": 2, "a": 1, "c": "hello"});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn test_canonical_bytes_nested() {
        let data = serde_json::json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        let s = std::str::from_utf8(cb.as_bytes()).unwrap();
        assert_eq!(s, r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_payload_shaped_fields() {
        let data = serde_json::json!({
            "v": 1,
            "kid": "k1",
            "issuer": "acme",
            "exp": "2024-01-02T00:00:00Z",
            "doc_type": "pdf",
            "doc_hash": "SHA256:00",
            "created": "2024-01-01T00:00:00Z"
        });
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"created":"2024-01-01T00:00:00Z","doc_hash":"SHA256:00","doc_type":"pdf","exp":"2024-01-02T00:00:00Z","issuer":"acme","kid":"k1","v":1}"#
        );
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let mut forward = HashMap::new();
        let mut reverse = BTreeMap::new();
        for (k, v) in [("issuer", "acme"), ("kid", "k1"), ("doc_type", "pdf")] {
            forward.insert(k, v);
        }
        for (k, v) in [("doc_type", "pdf"), ("kid", "k1"), ("issuer", "acme")] {
            reverse.insert(k, v);
        }
        assert_eq!(
            CanonicalBytes::new(&forward).unwrap(),
            CanonicalBytes::new(&reverse).unwrap()
        );
    }

    #[test]
    fn test_float_rejection() {
        let data = serde_json::json!({"amount": 1.5});
        match CanonicalBytes::new(&data).unwrap_err() {
            CanonicalizationError::FloatRejected(f) => assert_eq!(f, 1.5),
            other => panic!("Expected FloatRejected, got: {other}"),
        }
    }

    #[test]
    fn test_deeply_nested_float_rejected() {
        let data = serde_json::json!({"a": {"b": [{"c": 3.25}]}});
        assert!(CanonicalBytes::new(&data).is_err());
    }

    #[test]
    fn test_empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 2);
    }

    #[test]
    fn test_non_ascii_escaped() {
        let data = serde_json::json!({"issuer": "Caf\u{00e9}"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"issuer":"Caf\u00e9"}"#);
    }

    #[test]
    fn test_astral_characters_use_surrogate_pairs() {
        let data = serde_json::json!({"issuer": "M\u{00fc}ller \u{1F512}"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"issuer":"M\u00fcller \ud83d\udd12"}"#);
    }

    #[test]
    fn test_delete_character_escaped() {
        let data = serde_json::json!({"a": "\u{7f}~"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"a":"\u007f~"}"#);
    }

    #[test]
    fn test_non_ascii_keys_escaped() {
        let data = serde_json::json!({"\u{00e9}t\u{00e9}": 1});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"\u00e9t\u00e9":1}"#);
        assert!(cb.as_bytes().is_ascii());
    }

    #[test]
    fn test_control_characters_escaped() {
        let data = serde_json::json!({"issuer": "a\nb\"c"});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"issuer":"a\nb\"c"}"#);
    }
}
