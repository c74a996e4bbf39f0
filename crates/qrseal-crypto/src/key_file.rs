//! # Key Files
//!
//! Reads and writes Ed25519 key material on disk.
//!
//! Two encodings are accepted on read, detected from content:
//!
//! - PEM: PKCS#8 `PRIVATE KEY` for signing keys, SubjectPublicKeyInfo
//!   `PUBLIC KEY` for verifying keys.
//! - Hex: a 64-character string holding the 32-byte seed or public key.
//!
//! Writes always produce PEM. A file that cannot be read is reported as
//! [`CryptoError::KeySourceUnavailable`]; that is an operator error and is
//! never folded into a verification verdict.

use std::fs;
use std::path::Path;

use crate::ed25519::{SigningKey, VerifyingKey};
use crate::error::CryptoError;

const PEM_MARKER: &str = "-----BEGIN";

fn read_key_text(path: &Path) -> Result<String, CryptoError> {
    fs::read_to_string(path).map_err(|source| CryptoError::KeySourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a signing key from a PKCS#8 PEM or hex seed file.
pub fn load_signing_key(path: &Path) -> Result<SigningKey, CryptoError> {
    let text = read_key_text(path)?;
    let key = if text.contains(PEM_MARKER) {
        SigningKey::from_pkcs8_pem(&text)?
    } else {
        SigningKey::from_hex(&text)?
    };
    tracing::debug!(path = %path.display(), "loaded signing key");
    Ok(key)
}

/// Load a verifying key from a SubjectPublicKeyInfo PEM or hex file.
pub fn load_verifying_key(path: &Path) -> Result<VerifyingKey, CryptoError> {
    let text = read_key_text(path)?;
    let key = if text.contains(PEM_MARKER) {
        VerifyingKey::from_public_key_pem(&text)?
    } else {
        VerifyingKey::from_hex(&text)?
    };
    tracing::debug!(path = %path.display(), key = %key, "loaded verifying key");
    Ok(key)
}

/// Write a signing key as PKCS#8 PEM, creating parent directories.
pub fn write_signing_key_pem(path: &Path, key: &SigningKey) -> Result<(), CryptoError> {
    let pem = key.to_pkcs8_pem()?;
    ensure_parent(path)?;
    fs::write(path, pem)?;
    Ok(())
}

/// Write a verifying key as SubjectPublicKeyInfo PEM, creating parent directories.
pub fn write_verifying_key_pem(path: &Path, key: &VerifyingKey) -> Result<(), CryptoError> {
    let pem = key.to_public_key_pem()?;
    ensure_parent(path)?;
    fs::write(path, pem)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), CryptoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pem_files_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let sk_path = dir.path().join("keys/issuer.pem");
        let pk_path = dir.path().join("keys/issuer.pub.pem");
        let sk = SigningKey::generate();

        write_signing_key_pem(&sk_path, &sk).unwrap();
        write_verifying_key_pem(&pk_path, &sk.verifying_key()).unwrap();

        let loaded_sk = load_signing_key(&sk_path).unwrap();
        let loaded_pk = load_verifying_key(&pk_path).unwrap();
        assert_eq!(loaded_sk.verifying_key(), sk.verifying_key());
        assert_eq!(loaded_pk, sk.verifying_key());
    }

    #[test]
    fn hex_files_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let sk_path = dir.path().join("issuer.key");
        let pk_path = dir.path().join("issuer.pub");
        fs::write(&sk_path, format!("{}\n", "2a".repeat(32))).unwrap();

        let sk = load_signing_key(&sk_path).unwrap();
        assert_eq!(
            sk.verifying_key(),
            SigningKey::from_seed(&[42u8; 32]).verifying_key()
        );

        fs::write(&pk_path, sk.verifying_key().to_hex()).unwrap();
        assert_eq!(load_verifying_key(&pk_path).unwrap(), sk.verifying_key());
    }

    #[test]
    fn missing_file_is_key_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_verifying_key(&dir.path().join("absent.pem")).unwrap_err();
        match err {
            CryptoError::KeySourceUnavailable { path, .. } => {
                assert!(path.ends_with("absent.pem"));
            }
            other => panic!("expected KeySourceUnavailable, got {other}"),
        }
    }

    #[test]
    fn corrupt_pem_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pem");
        fs::write(&path, "-----BEGIN PUBLIC KEY-----\nnope\n-----END PUBLIC KEY-----\n").unwrap();
        assert!(matches!(
            load_verifying_key(&path),
            Err(CryptoError::InvalidPublicKey(_))
        ));
    }
}
