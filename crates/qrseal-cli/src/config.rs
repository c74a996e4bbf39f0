//! # CLI Configuration
//!
//! Optional YAML file supplying defaults for command-line flags:
//!
//! ```yaml
//! issuer: acme
//! kid: k1
//! validity_days: 1095
//! signing_key: keys/issuer_sk.pem
//! public_key: keys/issuer_pk.pem
//! revocations: state/revocations.json
//! key_store: policy/jwks.json
//! output_dir: out
//! ```
//!
//! Relative paths in the file are resolved against the directory holding
//! the file. Flags given on the command line always win and are taken
//! relative to the working directory, like any other command argument.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use qrseal_payload::DEFAULT_VALIDITY_DAYS;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "qrseal.yaml";

fn default_validity_days() -> u32 {
    DEFAULT_VALIDITY_DAYS
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
    #[serde(default)]
    pub signing_key: Option<PathBuf>,
    #[serde(default)]
    pub public_key: Option<PathBuf>,
    #[serde(default)]
    pub revocations: Option<PathBuf>,
    #[serde(default)]
    pub key_store: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            issuer: None,
            kid: None,
            validity_days: DEFAULT_VALIDITY_DAYS,
            signing_key: None,
            public_key: None,
            revocations: None,
            key_store: None,
            output_dir: None,
            base_dir: PathBuf::from("."),
        }
    }
}

impl CliConfig {
    /// Parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `explicit` if given, else [`DEFAULT_CONFIG_FILE`] if present,
    /// else built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Resolve a path read from the config file.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        crate::resolve_path(path, &self.base_dir)
    }

    /// Pick the flag value as given if present, else the config value
    /// resolved against [`CliConfig::base_dir`].
    pub fn pick_path(&self, flag: Option<&Path>, configured: Option<&PathBuf>) -> Option<PathBuf> {
        match flag {
            Some(path) => Some(path.to_path_buf()),
            None => configured.map(|p| self.resolve(p)),
        }
    }
}
