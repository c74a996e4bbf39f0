//! # Revocation List
//!
//! A revocation list names issued payloads by their
//! `(doc_hash, issuer, created)` triple. On disk it is JSON:
//!
//! ```json
//! {"revoked": [{"doc_hash": "SHA256:…", "issuer": "acme", "created": "2024-01-01T00:00:00Z"}]}
//! ```
//!
//! `created` is matched as the exact string the payload carries. Members
//! beyond the triple are ignored on load. A row that is not a string triple
//! is skipped with a warning and does not disable the rest of the list; it
//! is written back unchanged on save.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RevocationLoadError;
use crate::payload::SignedPayload;

/// One revoked payload.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RevocationEntry {
    /// Tagged digest, `SHA256:<hex>`.
    pub doc_hash: String,
    pub issuer: String,
    /// Issuance time exactly as the payload renders it.
    pub created: String,
}

impl RevocationEntry {
    /// The entry that revokes `payload`.
    pub fn for_payload(payload: &SignedPayload) -> Self {
        let fields = payload.fields();
        Self {
            doc_hash: fields.doc_hash().to_string(),
            issuer: fields.issuer().to_string(),
            created: fields.created().to_iso8601(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RevocationFile {
    #[serde(default)]
    revoked: Vec<Value>,
}

/// A set of revoked payload triples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevocationSet {
    entries: BTreeSet<RevocationEntry>,
    /// Rows from the loaded file that are not triples, kept for `save`.
    unrecognized: Vec<Value>,
}

impl RevocationSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `payload`'s triple is revoked.
    pub fn contains(&self, payload: &SignedPayload) -> bool {
        self.entries.contains(&RevocationEntry::for_payload(payload))
    }

    /// Add an entry. Returns false if it was already present.
    pub fn insert(&mut self, entry: RevocationEntry) -> bool {
        self.entries.insert(entry)
    }

    /// Revoke `payload`. Returns false if it was already revoked.
    pub fn revoke(&mut self, payload: &SignedPayload) -> bool {
        self.insert(RevocationEntry::for_payload(payload))
    }

    /// Number of revoked triples. Skipped rows are not counted.
    ///
    /// ```
    /// use qrseal_payload::RevocationSet;
    ///
    /// let json = r#"{"revoked":[
    ///     {"doc_hash":"SHA256:aa","issuer":"acme","created":"2024-01-01T00:00:00Z"},
    ///     {"doc_hash":"SHA256:bb"}
    /// ]}"#;
    /// let set = RevocationSet::from_json(json).unwrap();
    /// assert_eq!(set.len(), 1);
    /// assert_eq!(set.skipped(), 1);
    /// assert!(RevocationSet::new().is_empty());
    /// ```
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no triple is revoked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Revoked triples in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &RevocationEntry> {
        self.entries.iter()
    }

    /// Number of rows that were skipped because they are not triples.
    pub fn skipped(&self) -> usize {
        self.unrecognized.len()
    }

    /// Parse the JSON revocation file format.
    ///
    /// Fails only if the document is not JSON or has no usable `revoked`
    /// array. Individual rows that are not a `(doc_hash, issuer, created)`
    /// string triple are skipped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: RevocationFile = serde_json::from_str(json)?;
        let mut set = Self::new();
        for (index, row) in file.revoked.into_iter().enumerate() {
            match RevocationEntry::deserialize(&row) {
                Ok(entry) => {
                    set.entries.insert(entry);
                }
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping malformed revocation entry");
                    set.unrecognized.push(row);
                }
            }
        }
        Ok(set)
    }

    /// Render the JSON revocation file format: entries sorted, skipped rows
    /// appended as they were read.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut revoked = self
            .entries
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        revoked.extend(self.unrecognized.iter().cloned());
        serde_json::to_string_pretty(&RevocationFile { revoked })
    }

    /// Load a revocation file.
    pub fn load(path: &Path) -> Result<Self, RevocationLoadError> {
        let text = fs::read_to_string(path).map_err(|source| RevocationLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_json(&text).map_err(|source| RevocationLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), entries = set.len(), "loaded revocation list");
        Ok(set)
    }

    /// Load a revocation file, treating an unreadable or unparsable file as
    /// an empty list.
    ///
    /// Only [`RevocationLoadError`] is absorbed, and each occurrence is logged
    /// at `warn`. Use [`RevocationSet::load`] to see the error instead.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(set) => set,
            Err(err) => {
                tracing::warn!(error = %err, "revocation list unavailable; treating as empty");
                Self::new()
            }
        }
    }

    /// Write the revocation file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), RevocationLoadError> {
        let json = self.to_json().map_err(|source| RevocationLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let io_err = |source: std::io::Error| RevocationLoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        fs::write(path, json).map_err(io_err)
    }
}

impl FromIterator<RevocationEntry> for RevocationSet {
    fn from_iter<I: IntoIterator<Item = RevocationEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            unrecognized: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str) -> RevocationEntry {
        RevocationEntry {
            doc_hash: hash.to_string(),
            issuer: "acme".to_string(),
            created: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn parse_file_format() {
        let json = r#"{"revoked":[
            {"doc_hash":"SHA256:aa","issuer":"acme","created":"2024-01-01T00:00:00Z","reason":"superseded"},
            {"doc_hash":"SHA256:aa","issuer":"acme","created":"2024-01-01T00:00:00Z"}
        ]}"#;
        let set = RevocationSet::from_json(json).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.iter().any(|e| *e == entry("SHA256:aa")));
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let json = r#"{"revoked":[
            {"doc_hash":"SHA256:aa","issuer":"acme","created":"2024-01-01T00:00:00Z"},
            {"doc_hash":"SHA256:ff","issuer":"x"},
            {"doc_hash":"SHA256:ee","issuer":"acme","created":12},
            "SHA256:dd"
        ]}"#;
        let set = RevocationSet::from_json(json).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.skipped(), 3);
        assert!(set.iter().any(|e| *e == entry("SHA256:aa")));
    }

    #[test]
    fn skipped_rows_survive_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revocations.json");
        fs::write(
            &path,
            r#"{"revoked":[{"doc_hash":"SHA256:ff","issuer":"x"}]}"#,
        )
        .unwrap();
        let mut set = RevocationSet::load(&path).unwrap();
        set.insert(entry("SHA256:aa"));
        set.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let saved: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(saved["revoked"].as_array().unwrap().len(), 2);
        assert_eq!(saved["revoked"][1]["doc_hash"], "SHA256:ff");
        assert_eq!(RevocationSet::load(&path).unwrap(), set);
    }

    #[test]
    fn revoked_must_be_an_array() {
        assert!(RevocationSet::from_json(r#"{"revoked":{"doc_hash":"SHA256:aa"}}"#).is_err());
        assert!(RevocationSet::from_json(r#"{"revoked":null}"#).is_err());
    }

    #[test]
    fn missing_revoked_key_is_empty() {
        assert!(RevocationSet::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn insert_is_idempotent() {
        let mut set = RevocationSet::new();
        assert!(set.insert(entry("SHA256:aa")));
        assert!(!set.insert(entry("SHA256:aa")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/revocations.json");
        let set: RevocationSet = [entry("SHA256:bb"), entry("SHA256:aa")].into_iter().collect();
        set.save(&path).unwrap();
        assert_eq!(RevocationSet::load(&path).unwrap(), set);
    }

    #[test]
    fn load_errors_are_typed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            RevocationSet::load(&missing),
            Err(RevocationLoadError::Io { .. })
        ));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "{not json").unwrap();
        assert!(matches!(
            RevocationSet::load(&garbage),
            Err(RevocationLoadError::Parse { .. })
        ));
    }

    #[test]
    fn load_or_empty_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RevocationSet::load_or_empty(&dir.path().join("absent.json")).is_empty());

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "42").unwrap();
        assert!(RevocationSet::load_or_empty(&garbage).is_empty());

        let good = dir.path().join("good.json");
        let set: RevocationSet = [entry("SHA256:aa")].into_iter().collect();
        set.save(&good).unwrap();
        assert_eq!(RevocationSet::load_or_empty(&good), set);
    }
}
