//! # Key Store
//!
//! An explicit kid → verifying key registry, persisted as a JWKS document:
//!
//! ```json
//! {"keys": [{"kty": "OKP", "crv": "Ed25519", "kid": "k1", "x": "<base64url>"}]}
//! ```
//!
//! The store is an ordinary value. Callers load it, pass it to the verifier,
//! and save it when they choose; nothing in the workspace reads or writes a
//! registry file implicitly. JWKS entries that are not Ed25519 OKP keys are
//! carried through load/save untouched but never used for verification.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ed25519::VerifyingKey;
use crate::error::CryptoError;

/// A single Ed25519 JSON Web Key (RFC 8037).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always `OKP`.
    pub kty: String,
    /// Curve, always `Ed25519`.
    pub crv: String,
    /// Key identifier.
    pub kid: String,
    /// Raw public key, base64url without padding.
    pub x: String,
}

impl Jwk {
    /// Build the JWK for a verifying key.
    pub fn ed25519(kid: &str, key: &VerifyingKey) -> Self {
        Self {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            kid: kid.to_string(),
            x: key.to_base64url(),
        }
    }

    /// Decode the verifying key this JWK carries.
    pub fn verifying_key(&self) -> Result<VerifyingKey, CryptoError> {
        if self.kty != "OKP" || self.crv != "Ed25519" {
            return Err(CryptoError::InvalidPublicKey(format!(
                "unsupported JWK kty={} crv={}",
                self.kty, self.crv
            )));
        }
        VerifyingKey::from_base64url(&self.x)
    }
}

#[derive(Serialize, Deserialize)]
struct JwksDocument {
    #[serde(default)]
    keys: Vec<Value>,
}

/// kid → verifying key registry.
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    keys: BTreeMap<String, VerifyingKey>,
    foreign: Vec<Value>,
}

impl KeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` under `kid`, returning the key it replaced.
    pub fn insert(&mut self, kid: impl Into<String>, key: VerifyingKey) -> Option<VerifyingKey> {
        self.keys.insert(kid.into(), key)
    }

    /// Look up the key registered under `kid`.
    pub fn get(&self, kid: &str) -> Option<&VerifyingKey> {
        self.keys.get(kid)
    }

    /// Remove the key registered under `kid`.
    pub fn remove(&mut self, kid: &str) -> Option<VerifyingKey> {
        self.keys.remove(kid)
    }

    /// Number of Ed25519 keys in the store.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the store holds no Ed25519 keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over registered key ids in ascending order.
    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Parse a JWKS JSON document.
    pub fn from_jwks_str(json: &str) -> Result<Self, String> {
        let doc: JwksDocument = serde_json::from_str(json).map_err(|e| e.to_string())?;
        let mut store = Self::new();
        for entry in doc.keys {
            let jwk = match serde_json::from_value::<Jwk>(entry.clone()) {
                Ok(jwk) if jwk.kty == "OKP" && jwk.crv == "Ed25519" => jwk,
                _ => {
                    store.foreign.push(entry);
                    continue;
                }
            };
            let key = jwk
                .verifying_key()
                .map_err(|e| format!("kid {:?}: {e}", jwk.kid))?;
            if store.insert(jwk.kid.clone(), key).is_some() {
                tracing::warn!(kid = %jwk.kid, "duplicate kid in JWKS; last entry wins");
            }
        }
        Ok(store)
    }

    /// Render as a pretty-printed JWKS JSON document.
    pub fn to_jwks_string(&self) -> Result<String, CryptoError> {
        let mut keys: Vec<Value> = self
            .keys
            .iter()
            .map(|(kid, key)| serde_json::to_value(Jwk::ed25519(kid, key)))
            .collect::<Result<_, _>>()
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        keys.extend(self.foreign.iter().cloned());
        serde_json::to_string_pretty(&JwksDocument { keys })
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Load a JWKS file.
    ///
    /// A missing or unreadable file is `KeySourceUnavailable`; a file that
    /// parses but is not a valid JWKS is `KeyStoreFormat`.
    pub fn load(path: &Path) -> Result<Self, CryptoError> {
        let text = fs::read_to_string(path).map_err(|source| CryptoError::KeySourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_jwks_str(&text).map_err(|reason| CryptoError::KeyStoreFormat {
            path: path.to_path_buf(),
            reason,
        })?;
        tracing::debug!(path = %path.display(), keys = store.len(), "loaded key store");
        Ok(store)
    }

    /// Load a JWKS file, or start an empty store if the file does not exist.
    pub fn load_or_new(path: &Path) -> Result<Self, CryptoError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write the store as a JWKS file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), CryptoError> {
        let json = self.to_jwks_string()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::SigningKey;

    #[test]
    fn insert_replaces_same_kid() {
        let mut store = KeyStore::new();
        let a = SigningKey::generate().verifying_key();
        let b = SigningKey::generate().verifying_key();
        assert!(store.insert("k1", a).is_none());
        assert_eq!(store.insert("k1", b), Some(a));
        assert_eq!(store.get("k1"), Some(&b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn jwk_shape() {
        let vk = SigningKey::from_seed(&[1u8; 32]).verifying_key();
        let json = serde_json::to_value(Jwk::ed25519("k1", &vk)).unwrap();
        assert_eq!(json["kty"], "OKP");
        assert_eq!(json["crv"], "Ed25519");
        assert_eq!(json["kid"], "k1");
        assert_eq!(json["x"], vk.to_base64url());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy/jwks.json");
        let mut store = KeyStore::new();
        let k1 = SigningKey::generate().verifying_key();
        let k2 = SigningKey::generate().verifying_key();
        store.insert("k2", k2);
        store.insert("k1", k1);
        store.save(&path).unwrap();

        let loaded = KeyStore::load(&path).unwrap();
        assert_eq!(loaded.kids().collect::<Vec<_>>(), vec!["k1", "k2"]);
        assert_eq!(loaded.get("k1"), Some(&k1));
        assert_eq!(loaded.get("k2"), Some(&k2));
    }

    #[test]
    fn foreign_entries_preserved() {
        let json = r#"{"keys":[{"kty":"EC","crv":"P-256","kid":"ec1","x":"a","y":"b"}]}"#;
        let store = KeyStore::from_jwks_str(json).unwrap();
        assert!(store.is_empty());
        let out = store.to_jwks_string().unwrap();
        assert!(out.contains("\"ec1\""));
    }

    #[test]
    fn invalid_ed25519_entry_rejected() {
        let json = r#"{"keys":[{"kty":"OKP","crv":"Ed25519","kid":"k1","x":"!!"}]}"#;
        assert!(KeyStore::from_jwks_str(json).is_err());
    }

    #[test]
    fn load_missing_and_load_or_new() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jwks.json");
        assert!(matches!(
            KeyStore::load(&path),
            Err(CryptoError::KeySourceUnavailable { .. })
        ));
        assert!(KeyStore::load_or_new(&path).unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jwks.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            KeyStore::load(&path),
            Err(CryptoError::KeyStoreFormat { .. })
        ));
    }
}
