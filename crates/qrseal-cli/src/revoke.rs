//! # Revoke Subcommand
//!
//! Adds a payload's `(doc_hash, issuer, created)` triple to a revocation
//! list file, creating the file if needed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use qrseal_payload::{RevocationSet, SignedPayload};

use crate::config::CliConfig;

/// Arguments for `qrseal revoke`.
#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Payload to revoke.
    #[arg(long)]
    pub payload: PathBuf,

    /// Revocation list file.
    #[arg(long)]
    pub rev: Option<PathBuf>,
}

/// Execute `qrseal revoke`.
pub fn run_revoke(args: &RevokeArgs, config: &CliConfig) -> Result<u8> {
    let rev_path = config
        .pick_path(args.rev.as_deref(), config.revocations.as_ref())
        .context("no revocation list: pass --rev or set revocations in the config")?;
    let text = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("failed to read payload: {}", args.payload.display()))?;
    let payload = SignedPayload::from_json(text.trim())
        .with_context(|| format!("failed to parse payload: {}", args.payload.display()))?;

    if cmd_revoke(&payload, &rev_path)? {
        println!("OK: revoked {} ({})", payload.doc_hash(), payload.fields().issuer());
    } else {
        println!("OK: already revoked {}", payload.doc_hash());
    }
    Ok(0)
}

/// Add `payload` to the list at `rev_path`. Returns false if it was already
/// present.
///
/// A list that exists but cannot be parsed is an error here, unlike during
/// verification, so that a corrupt file is never silently overwritten.
pub fn cmd_revoke(payload: &SignedPayload, rev_path: &Path) -> Result<bool> {
    let mut set = if rev_path.exists() {
        RevocationSet::load(rev_path)?
    } else {
        RevocationSet::new()
    };
    let added = set.revoke(payload);
    if added {
        set.save(rev_path)?;
        tracing::info!(doc_hash = %payload.doc_hash(), entries = set.len(), "revocation recorded");
    }
    Ok(added)
}
