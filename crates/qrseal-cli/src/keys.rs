//! # Key Subcommands
//!
//! `qrseal keygen` writes a fresh Ed25519 keypair as PEM and, when a key
//! store path is known, upserts the public key as a JWK under its kid.
//! `qrseal export-pubkey` re-derives the public key file from a private key.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use qrseal_crypto::{
    load_signing_key, write_signing_key_pem, write_verifying_key_pem, KeyStore, SigningKey,
};

use crate::config::CliConfig;

/// Arguments for `qrseal keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Private key output (PKCS#8 PEM).
    #[arg(long = "out", value_name = "SK_PEM")]
    pub out: Option<PathBuf>,

    /// Public key output (SubjectPublicKeyInfo PEM).
    #[arg(long = "pub", value_name = "PK_PEM")]
    pub public: Option<PathBuf>,

    /// Key identifier recorded in the key store.
    #[arg(long)]
    pub kid: Option<String>,

    /// JWKS file to add the public key to.
    #[arg(long)]
    pub key_store: Option<PathBuf>,
}

/// Arguments for `qrseal export-pubkey`.
#[derive(Args, Debug)]
pub struct ExportPubkeyArgs {
    /// Private key file (PKCS#8 PEM or hex seed).
    #[arg(long)]
    pub sk: Option<PathBuf>,

    /// Public key output (SubjectPublicKeyInfo PEM).
    #[arg(long)]
    pub pk: Option<PathBuf>,
}

/// Execute `qrseal keygen`.
pub fn run_keygen(args: &KeygenArgs, config: &CliConfig) -> Result<u8> {
    let sk_path = config
        .pick_path(args.out.as_deref(), config.signing_key.as_ref())
        .context("no private key output: pass --out or set signing_key in the config")?;
    let pk_path = config
        .pick_path(args.public.as_deref(), config.public_key.as_ref())
        .context("no public key output: pass --pub or set public_key in the config")?;
    let kid = args
        .kid
        .as_deref()
        .or(config.kid.as_deref())
        .context("no key id: pass --kid or set kid in the config")?;
    let store_path = config.pick_path(args.key_store.as_deref(), config.key_store.as_ref());

    cmd_keygen(&sk_path, &pk_path, kid, store_path.as_deref())
}

fn cmd_keygen(sk_path: &Path, pk_path: &Path, kid: &str, store_path: Option<&Path>) -> Result<u8> {
    let sk = SigningKey::generate();
    let vk = sk.verifying_key();

    write_signing_key_pem(sk_path, &sk)
        .with_context(|| format!("failed to write private key: {}", sk_path.display()))?;
    write_verifying_key_pem(pk_path, &vk)
        .with_context(|| format!("failed to write public key: {}", pk_path.display()))?;

    println!("OK: generated Ed25519 keypair");
    println!("  Private key: {}", sk_path.display());
    println!("  Public key:  {}", pk_path.display());
    println!("  Key id:      {kid}");

    if let Some(store_path) = store_path {
        let mut store = KeyStore::load_or_new(store_path)
            .with_context(|| format!("failed to read key store: {}", store_path.display()))?;
        if store.insert(kid, vk).is_some() {
            tracing::info!(kid, "replaced existing key store entry");
        }
        store
            .save(store_path)
            .with_context(|| format!("failed to write key store: {}", store_path.display()))?;
        println!("  Key store:   {}", store_path.display());
    }

    Ok(0)
}

/// Execute `qrseal export-pubkey`.
pub fn run_export_pubkey(args: &ExportPubkeyArgs, config: &CliConfig) -> Result<u8> {
    let sk_path = config
        .pick_path(args.sk.as_deref(), config.signing_key.as_ref())
        .context("no private key: pass --sk or set signing_key in the config")?;
    let pk_path = config
        .pick_path(args.pk.as_deref(), config.public_key.as_ref())
        .context("no public key output: pass --pk or set public_key in the config")?;

    let sk = load_signing_key(&sk_path)
        .with_context(|| format!("failed to load private key: {}", sk_path.display()))?;
    write_verifying_key_pem(&pk_path, &sk.verifying_key())
        .with_context(|| format!("failed to write public key: {}", pk_path.display()))?;

    println!("OK: public key exported to {}", pk_path.display());
    Ok(0)
}
