//! # qrseal-cli: Command-Line Tool
//!
//! Provides the `qrseal` command-line interface over the payload library.
//!
//! ## Subcommands
//!
//! - `qrseal keygen`: Ed25519 keypair generation, optional JWKS upsert.
//! - `qrseal export-pubkey`: derive a public key file from a private key.
//! - `qrseal sign`: issue a signed payload for a document.
//! - `qrseal verify`: verify a document against a payload.
//! - `qrseal revoke`: add a payload to a revocation list.
//!
//! ```bash
//! qrseal keygen --out keys/issuer_sk.pem --pub keys/issuer_pk.pem --kid k1 --key-store policy/jwks.json
//! qrseal sign --doc contract.pdf --issuer acme --kid k1 --sk keys/issuer_sk.pem
//! qrseal verify --doc contract.pdf --payload out/contract.payload.json --pk keys/issuer_pk.pem
//! ```
//!
//! Handlers return the process exit code: `0` success, `1` a document that
//! failed verification. Hard errors propagate as `anyhow::Error` and become
//! exit code `2` in `main`.

pub mod config;
pub mod keys;
pub mod revoke;
pub mod sign;
pub mod verify;

use std::path::{Path, PathBuf};

/// Resolve a path taken from the configuration file.
///
/// Absolute paths are returned as-is. Relative paths are joined onto
/// `base`, the directory holding the configuration file, whether or not the
/// target exists yet.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
