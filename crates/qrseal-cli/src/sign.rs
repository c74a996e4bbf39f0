//! # Sign Subcommand
//!
//! Issues a payload for a document file and writes two outputs next to each
//! other in the output directory:
//!
//! - `<stem>.payload.json`: the payload, pretty-printed.
//! - `<file name>.qr.txt`: the compact payload string to hand to a QR
//!   renderer or embed as document metadata.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use qrseal_core::Timestamp;
use qrseal_crypto::LocalKeyProvider;
use qrseal_payload::{build_and_sign_reader, doc_type_from_path, IssueRequest, SignedPayload};

use crate::config::CliConfig;

/// Arguments for `qrseal sign`.
#[derive(Args, Debug)]
pub struct SignArgs {
    /// Document to sign.
    #[arg(long)]
    pub doc: PathBuf,

    /// Issuer name.
    #[arg(long)]
    pub issuer: Option<String>,

    /// Key identifier.
    #[arg(long)]
    pub kid: Option<String>,

    /// Private key file (PKCS#8 PEM or hex seed).
    #[arg(long)]
    pub sk: Option<PathBuf>,

    /// Validity window in days.
    #[arg(long)]
    pub days: Option<u32>,

    /// Directory for the payload and QR string files.
    #[arg(long)]
    pub outdir: Option<PathBuf>,
}

/// Paths written by a successful sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutputs {
    pub payload_json: PathBuf,
    pub qr_text: PathBuf,
}

/// Execute `qrseal sign`.
pub fn run_sign(args: &SignArgs, config: &CliConfig) -> Result<u8> {
    let issuer = args
        .issuer
        .as_deref()
        .or(config.issuer.as_deref())
        .context("no issuer: pass --issuer or set issuer in the config")?;
    let kid = args
        .kid
        .as_deref()
        .or(config.kid.as_deref())
        .context("no key id: pass --kid or set kid in the config")?;
    let sk_path = config
        .pick_path(args.sk.as_deref(), config.signing_key.as_ref())
        .context("no private key: pass --sk or set signing_key in the config")?;
    let outdir = config
        .pick_path(args.outdir.as_deref(), config.output_dir.as_ref())
        .unwrap_or_else(|| PathBuf::from("out"));
    let days = args.days.unwrap_or(config.validity_days);

    let signer = LocalKeyProvider::from_file(&sk_path)
        .with_context(|| format!("failed to load private key: {}", sk_path.display()))?;
    let request = IssueRequest::new(issuer, kid)
        .doc_type(doc_type_from_path(&args.doc))
        .validity_days(days);

    let (payload, outputs) = cmd_sign(&args.doc, &request, &signer, &outdir, Timestamp::now())?;

    println!("OK: signed {}", args.doc.display());
    println!("  Payload:   {}", outputs.payload_json.display());
    println!("  QR string: {}", outputs.qr_text.display());
    println!("  Expires:   {}", payload.fields().exp().map(|t| t.to_string()).unwrap_or_default());
    Ok(0)
}

/// Sign `doc` and write the payload files into `outdir`.
pub fn cmd_sign(
    doc: &Path,
    request: &IssueRequest,
    signer: &LocalKeyProvider,
    outdir: &Path,
    now: Timestamp,
) -> Result<(SignedPayload, SignOutputs)> {
    let file = File::open(doc).with_context(|| format!("document not found: {}", doc.display()))?;
    let payload = build_and_sign_reader(BufReader::new(file), request, signer, now)
        .with_context(|| format!("failed to sign {}", doc.display()))?;

    let (Some(stem), Some(name)) = (doc.file_stem(), doc.file_name()) else {
        bail!("document path has no file name: {}", doc.display());
    };
    std::fs::create_dir_all(outdir)
        .with_context(|| format!("failed to create output directory: {}", outdir.display()))?;

    let outputs = SignOutputs {
        payload_json: outdir.join(format!("{}.payload.json", stem.to_string_lossy())),
        qr_text: outdir.join(format!("{}.qr.txt", name.to_string_lossy())),
    };
    std::fs::write(&outputs.payload_json, payload.to_pretty_json()?)
        .with_context(|| format!("failed to write {}", outputs.payload_json.display()))?;
    std::fs::write(&outputs.qr_text, payload.to_compact_json()?)
        .with_context(|| format!("failed to write {}", outputs.qr_text.display()))?;

    tracing::info!(doc = %doc.display(), kid = %payload.kid(), "payload issued");
    Ok((payload, outputs))
}
