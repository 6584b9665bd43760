//! # CLI Configuration
//!
//! Optional YAML file, then `VCS_*` environment overrides:
//!
//! ```yaml
//! debug: false
//! did_dir: dids
//! key_store: keys.json
//! default_signature_type: Ed25519Signature2018
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "vcs.yaml";

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Log at debug level regardless of `-v`.
    pub debug: bool,
    /// Directory of `<did>.json` DID documents.
    pub did_dir: PathBuf,
    /// JSON key-store file.
    pub key_store: PathBuf,
    /// Signature type used when request options name none.
    pub default_signature_type: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            debug: false,
            did_dir: PathBuf::from("dids"),
            key_store: PathBuf::from("keys.json"),
            default_signature_type: "Ed25519Signature2018".to_string(),
        }
    }
}

impl CliConfig {
    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] if it exists. An explicit
    /// path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !path.exists() {
            if required {
                bail!("config file {} does not exist", path.display());
            }
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Apply `VCS_DEBUG`, `VCS_DID_DIR` and `VCS_KEY_STORE` from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("VCS_DEBUG") {
            self.debug = match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => bail!("VCS_DEBUG must be a boolean, got {other:?}"),
            };
        }
        if let Some(value) = lookup("VCS_DID_DIR") {
            self.did_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("VCS_KEY_STORE") {
            self.key_store = PathBuf::from(value);
        }
        Ok(())
    }
}
