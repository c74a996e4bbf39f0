//! # qrseal CLI entry point
//!
//! Parses command-line arguments, loads the optional YAML configuration,
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qrseal_cli::config::CliConfig;
use qrseal_cli::keys::{run_export_pubkey, run_keygen, ExportPubkeyArgs, KeygenArgs};
use qrseal_cli::revoke::{run_revoke, RevokeArgs};
use qrseal_cli::sign::{run_sign, SignArgs};
use qrseal_cli::verify::{run_verify, VerifyArgs};

/// Exit code for errors that prevented a verdict.
const EXIT_HARD_ERROR: u8 = 2;

/// qrseal: signed document-authenticity payloads.
///
/// Binds a document to an issuer with a compact Ed25519-signed JSON payload
/// suitable for a QR code, and verifies documents against such payloads
/// offline.
#[derive(Parser, Debug)]
#[command(name = "qrseal", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (default: ./qrseal.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 keypair, optionally registering it in a JWKS file.
    Keygen(KeygenArgs),

    /// Write the public key for a private key file.
    ExportPubkey(ExportPubkeyArgs),

    /// Issue a signed payload for a document.
    Sign(SignArgs),

    /// Verify a document against a payload.
    Verify(VerifyArgs),

    /// Add a payload to a revocation list.
    Revoke(RevokeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "qrseal starting");

    let result = CliConfig::discover(cli.config.as_deref()).and_then(|config| {
        tracing::debug!(base_dir = %config.base_dir.display(), "configuration resolved");
        match &cli.command {
            Commands::Keygen(args) => run_keygen(args, &config),
            Commands::ExportPubkey(args) => run_export_pubkey(args, &config),
            Commands::Sign(args) => run_sign(args, &config),
            Commands::Verify(args) => run_verify(args, &config),
            Commands::Revoke(args) => run_revoke(args, &config),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("ERROR: {e:#}");
            ExitCode::from(EXIT_HARD_ERROR)
        }
    }
}
