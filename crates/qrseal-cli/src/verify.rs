//! # Verify Subcommand
//!
//! Runs the verifier pipeline for a document and a payload file and prints
//! the verdict. Exit code `0` means authentic, `1` means the document or
//! payload was rejected. Missing key material, an unreadable document, or an
//! unreadable key store are hard errors.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;

use qrseal_core::Timestamp;
use qrseal_crypto::{load_verifying_key, KeyStore, VerifyingKey};
use qrseal_payload::{PayloadError, RevocationSet, SignedPayload, Verdict, Verifier};

use crate::config::CliConfig;

/// Arguments for `qrseal verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Document to verify.
    #[arg(long)]
    pub doc: PathBuf,

    /// Payload file (`.payload.json` or a `.qr.txt` string).
    #[arg(long)]
    pub payload: PathBuf,

    /// Issuer public key (SubjectPublicKeyInfo PEM or hex).
    #[arg(long, conflicts_with = "key_store")]
    pub pk: Option<PathBuf>,

    /// JWKS file; the key is chosen by the payload's kid.
    #[arg(long)]
    pub key_store: Option<PathBuf>,

    /// Revocation list. Unreadable lists are treated as empty.
    #[arg(long)]
    pub rev: Option<PathBuf>,

    /// Require the payload to carry this kid.
    #[arg(long)]
    pub kid: Option<String>,

    /// Verify as of this instant (`YYYY-MM-DDTHH:MM:SSZ`) instead of now.
    #[arg(long)]
    pub at: Option<String>,
}

/// Key material the verifier resolves against.
#[derive(Debug)]
pub enum VerificationKeys {
    Single(VerifyingKey),
    Store(KeyStore),
}

impl VerificationKeys {
    fn verifier(&self) -> Verifier<'_> {
        match self {
            Self::Single(key) => Verifier::with_key(key),
            Self::Store(store) => Verifier::with_key_store(store),
        }
    }
}

/// Execute `qrseal verify`.
pub fn run_verify(args: &VerifyArgs, config: &CliConfig) -> Result<u8> {
    let keys = load_keys(args, config)?;
    let revocations = config
        .pick_path(args.rev.as_deref(), config.revocations.as_ref())
        .map(|path| RevocationSet::load_or_empty(&path));
    let now = match &args.at {
        Some(at) => Timestamp::parse(at).map_err(|e| anyhow!("invalid --at: {e}"))?,
        None => Timestamp::now(),
    };

    let verdict = match load_payload(&args.payload)? {
        Ok(payload) => cmd_verify(
            &args.doc,
            &payload,
            &keys,
            revocations.as_ref(),
            args.kid.as_deref(),
            now,
        )?,
        Err(reason) => {
            println!("FAIL: {reason}");
            return Ok(1);
        }
    };

    if verdict.is_authentic() {
        println!("OK: {verdict}");
        Ok(0)
    } else {
        println!("FAIL: {verdict}");
        Ok(1)
    }
}

/// Run the pipeline over a document file.
pub fn cmd_verify(
    doc: &Path,
    payload: &SignedPayload,
    keys: &VerificationKeys,
    revocations: Option<&RevocationSet>,
    expected_kid: Option<&str>,
    now: Timestamp,
) -> Result<Verdict> {
    let file = File::open(doc).with_context(|| format!("document not found: {}", doc.display()))?;
    let mut verifier = keys.verifier();
    if let Some(set) = revocations {
        verifier = verifier.revocations(set);
    }
    if let Some(kid) = expected_kid {
        verifier = verifier.expected_kid(kid);
    }
    verifier
        .verify_reader(BufReader::new(file), payload, now)
        .with_context(|| format!("failed to read document: {}", doc.display()))
}

fn load_keys(args: &VerifyArgs, config: &CliConfig) -> Result<VerificationKeys> {
    if let Some(pk) = &args.pk {
        return single_key(pk);
    }
    if let Some(store) = &args.key_store {
        return key_store(store);
    }
    if let Some(pk) = config.public_key.as_ref().map(|p| config.resolve(p)) {
        return single_key(&pk);
    }
    if let Some(store) = config.key_store.as_ref().map(|p| config.resolve(p)) {
        return key_store(&store);
    }
    bail!("no verification key: pass --pk or --key-store, or set one in the config")
}

fn single_key(path: &Path) -> Result<VerificationKeys> {
    let key = load_verifying_key(path)
        .with_context(|| format!("failed to load public key: {}", path.display()))?;
    Ok(VerificationKeys::Single(key))
}

fn key_store(path: &Path) -> Result<VerificationKeys> {
    let store = KeyStore::load(path)
        .with_context(|| format!("failed to load key store: {}", path.display()))?;
    Ok(VerificationKeys::Store(store))
}

/// Read a payload file. A file that is not a well-formed payload yields the
/// rejection reason; a file that cannot be read is a hard error.
fn load_payload(path: &Path) -> Result<std::result::Result<SignedPayload, String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload: {}", path.display()))?;
    match SignedPayload::from_json(text.trim()) {
        Ok(payload) => Ok(Ok(payload)),
        Err(e @ PayloadError::Malformed(_)) => Ok(Err(e.to_string())),
        Err(e) => Err(e.into()),
    }
}
