//! # Payload Structure
//!
//! A signed payload is an immutable value made of two parts:
//!
//! - [`PayloadFields`]: every field that is signed (`v`, `doc_hash`,
//!   `doc_type`, `issuer`, `kid`, `created`, `exp`, plus any additional
//!   members a foreign issuer included).
//! - `sig`: base64url Ed25519 signature over the canonical encoding of the
//!   fields.
//!
//! The signed set is a separate value, so "the payload without its
//! signature" is a structural view, not a copy-and-delete step.
//!
//! ## Serialized Form
//!
//! Flat JSON object, e.g.
//!
//! ```json
//! {"v":1,"doc_hash":"SHA256:…","doc_type":"pdf","issuer":"acme","kid":"k1",
//!  "created":"2024-01-01T00:00:00Z","exp":"2024-01-02T00:00:00Z","sig":"…"}
//! ```
//!
//! Unknown members are kept and remain part of the signed set, so adding a
//! field to a payload after signing breaks its signature. An absent `exp` and
//! `"exp": null` both mean "never expires", but they sign differently and are
//! kept apart.

use std::collections::BTreeMap;
use std::path::Path;

use qrseal_core::{CanonicalBytes, CanonicalizationError, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::PayloadError;

/// Payload schema version written by this implementation.
pub const PAYLOAD_VERSION: u32 = 1;

/// The signed fields of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadFields {
    v: u32,
    doc_hash: String,
    doc_type: String,
    issuer: String,
    kid: String,
    created: Timestamp,
    /// Outer `None`: key absent. `Some(None)`: explicit `null`.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    exp: Option<Option<Timestamp>>,
    #[serde(flatten)]
    extensions: BTreeMap<String, Value>,
}

impl PayloadFields {
    pub(crate) fn new(
        doc_hash: String,
        doc_type: String,
        issuer: String,
        kid: String,
        created: Timestamp,
        exp: Timestamp,
    ) -> Self {
        Self {
            v: PAYLOAD_VERSION,
            doc_hash,
            doc_type,
            issuer,
            kid,
            created,
            exp: Some(Some(exp)),
            extensions: BTreeMap::new(),
        }
    }

    /// Schema version.
    pub fn version(&self) -> u32 {
        self.v
    }

    /// Tagged document digest, `SHA256:<hex>`.
    pub fn doc_hash(&self) -> &str {
        &self.doc_hash
    }

    /// Lowercase file-extension hint. Informational only.
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    /// Signer identity.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Key identifier.
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Issuance time.
    pub fn created(&self) -> Timestamp {
        self.created
    }

    /// Expiry instant; `None` means the payload never expires.
    pub fn exp(&self) -> Option<Timestamp> {
        self.exp.flatten()
    }

    /// Members beyond the version 1 field set.
    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    /// The canonical byte encoding that is signed and verified.
    pub fn signing_message(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<Timestamp>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Timestamp>::deserialize(deserializer).map(Some)
}

/// A payload together with its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    #[serde(flatten)]
    fields: PayloadFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sig: Option<String>,
}

impl SignedPayload {
    pub(crate) fn new(fields: PayloadFields, sig: String) -> Self {
        Self {
            fields,
            sig: Some(sig),
        }
    }

    /// The signed fields (everything except `sig`).
    pub fn fields(&self) -> &PayloadFields {
        &self.fields
    }

    /// The base64url signature, if present and non-empty.
    pub fn sig(&self) -> Option<&str> {
        self.sig.as_deref().filter(|s| !s.is_empty())
    }

    /// Shorthand for `fields().kid()`.
    pub fn kid(&self) -> &str {
        self.fields.kid()
    }

    /// Shorthand for `fields().doc_hash()`.
    pub fn doc_hash(&self) -> &str {
        self.fields.doc_hash()
    }

    /// Parse a payload from its JSON form (a QR string or a `.payload.json` file).
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| PayloadError::Malformed(e.to_string()))?;
        if !value.is_object() {
            return Err(PayloadError::Malformed(
                "payload must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    /// Read and parse a payload file.
    pub fn from_file(path: &Path) -> Result<Self, PayloadError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Compact JSON, the string handed to QR rendering and metadata embedding.
    pub fn to_compact_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string(self).map_err(|e| PayloadError::Malformed(e.to_string()))
    }

    /// Indented JSON for `.payload.json` files.
    pub fn to_pretty_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string_pretty(self).map_err(|e| PayloadError::Malformed(e.to_string()))
    }
}

/// Derive the `doc_type` hint from a file name: the lowercase extension
/// without the dot, or an empty string when there is none.
pub fn doc_type_from_path(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> Value {
        json!({
            "v": 1,
            "doc_hash": "SHA256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            "doc_type": "pdf",
            "issuer": "acme",
            "kid": "k1",
            "created": "2024-01-01T00:00:00Z",
            "exp": "2024-01-02T00:00:00Z",
            "sig": "c2ln"
        })
    }

    #[test]
    fn parse_full_payload() {
        let p = SignedPayload::from_json(&sample_json().to_string()).unwrap();
        assert_eq!(p.fields().version(), 1);
        assert_eq!(p.kid(), "k1");
        assert_eq!(p.fields().issuer(), "acme");
        assert_eq!(p.fields().doc_type(), "pdf");
        assert_eq!(p.fields().created().to_iso8601(), "2024-01-01T00:00:00Z");
        assert_eq!(
            p.fields().exp().map(|t| t.to_iso8601()).as_deref(),
            Some("2024-01-02T00:00:00Z")
        );
        assert_eq!(p.sig(), Some("c2ln"));
        assert!(p.fields().extensions().is_empty());
    }

    #[test]
    fn signing_message_excludes_sig() {
        let p = SignedPayload::from_json(&sample_json().to_string()).unwrap();
        let msg = p.fields().signing_message().unwrap();
        let s = std::str::from_utf8(msg.as_bytes()).unwrap();
        assert!(!s.contains("\"sig\""));
        assert!(s.starts_with(r#"{"created":"2024-01-01T00:00:00Z","doc_hash":"#));
        assert!(s.ends_with(r#""issuer":"acme","kid":"k1","v":1}"#));
    }

    #[test]
    fn missing_exp_and_sig_are_optional() {
        let mut v = sample_json();
        let obj = v.as_object_mut().unwrap();
        obj.remove("exp");
        obj.remove("sig");
        let p = SignedPayload::from_json(&v.to_string()).unwrap();
        assert!(p.fields().exp().is_none());
        assert!(p.sig().is_none());
        let msg = p.fields().signing_message().unwrap();
        assert!(!std::str::from_utf8(msg.as_bytes()).unwrap().contains("exp"));
    }

    #[test]
    fn null_exp_is_kept_in_signed_set() {
        let mut v = sample_json();
        v["exp"] = Value::Null;
        let p = SignedPayload::from_json(&v.to_string()).unwrap();
        assert!(p.fields().exp().is_none());
        let msg = p.fields().signing_message().unwrap();
        assert!(std::str::from_utf8(msg.as_bytes()).unwrap().contains("\"exp\":null"));
        assert!(p.to_compact_json().unwrap().contains("\"exp\":null"));

        let mut absent = sample_json();
        absent.as_object_mut().unwrap().remove("exp");
        let q = SignedPayload::from_json(&absent.to_string()).unwrap();
        assert_ne!(msg, q.fields().signing_message().unwrap());
    }

    #[test]
    fn empty_sig_counts_as_missing() {
        let mut v = sample_json();
        v["sig"] = json!("");
        assert!(SignedPayload::from_json(&v.to_string()).unwrap().sig().is_none());
    }

    #[test]
    fn extensions_stay_in_signed_set() {
        let mut v = sample_json();
        v["note"] = json!("added later");
        let p = SignedPayload::from_json(&v.to_string()).unwrap();
        assert_eq!(p.fields().extensions().get("note"), Some(&json!("added later")));
        let msg = p.fields().signing_message().unwrap();
        assert!(std::str::from_utf8(msg.as_bytes()).unwrap().contains("\"note\":\"added later\""));
    }

    #[test]
    fn malformed_inputs_rejected() {
        assert!(matches!(
            SignedPayload::from_json("not json"),
            Err(PayloadError::Malformed(_))
        ));
        assert!(matches!(
            SignedPayload::from_json("[1,2]"),
            Err(PayloadError::Malformed(_))
        ));

        let mut missing_hash = sample_json();
        missing_hash.as_object_mut().unwrap().remove("doc_hash");
        assert!(SignedPayload::from_json(&missing_hash.to_string()).is_err());

        let mut bad_time = sample_json();
        bad_time["created"] = json!("2024-01-01T00:00:00+00:00");
        assert!(SignedPayload::from_json(&bad_time.to_string()).is_err());
    }

    #[test]
    fn compact_json_roundtrip() {
        let p = SignedPayload::from_json(&sample_json().to_string()).unwrap();
        let compact = p.to_compact_json().unwrap();
        assert!(!compact.contains(' '));
        assert!(!compact.contains('\n'));
        assert_eq!(SignedPayload::from_json(&compact).unwrap(), p);
        assert_eq!(
            SignedPayload::from_json(&p.to_pretty_json().unwrap()).unwrap(),
            p
        );
    }

    #[test]
    fn doc_type_hint() {
        assert_eq!(doc_type_from_path(Path::new("contract.PDF")), "pdf");
        assert_eq!(doc_type_from_path(Path::new("archive.tar.gz")), "gz");
        assert_eq!(doc_type_from_path(Path::new("README")), "");
        assert_eq!(doc_type_from_path(Path::new(".bashrc")), "");
    }
}
