//! # File-Backed Stores
//!
//! A DID registry that reads `<did>.json` documents from a directory, and a
//! key store persisted as a JSON array of key records.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use vcs_core::Did;
use vcs_crypto::{InMemoryKeyManager, StoredKey};
use vcs_vc::{DidDocument, DidResolver, ResolutionError};

/// DID documents stored one per file as `<did>.json`.
#[derive(Debug, Clone)]
pub struct FileDidRegistry {
    dir: PathBuf,
}

impl FileDidRegistry {
    /// Registry over `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, did: &str) -> PathBuf {
        self.dir.join(format!("{did}.json"))
    }

    /// Validate and store a DID document, replacing any previous version.
    pub fn register(&self, document: serde_json::Value) -> Result<PathBuf> {
        let parsed = DidDocument::from_json(document.clone()).context("invalid DID document")?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.path_for(&parsed.id);
        let text = serde_json::to_string_pretty(&document)?;
        std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        debug!(did = %parsed.id, path = %path.display(), "registered DID document");
        Ok(path)
    }
}

impl DidResolver for FileDidRegistry {
    fn resolve(&self, did: &Did) -> Result<DidDocument, ResolutionError> {
        let path = self.path_for(did.as_str());
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ResolutionError::NotFound(did.to_string()))
            }
            Err(e) => return Err(ResolutionError::Backend(format!("{}: {e}", path.display()))),
        };
        let value = serde_json::from_str(&text)
            .map_err(|e| ResolutionError::Backend(format!("{}: {e}", path.display())))?;
        DidDocument::from_json(value).map_err(|e| ResolutionError::Backend(e.to_string()))
    }
}

/// Load a key manager from `path`. A missing file is an empty store.
pub fn load_keys(path: &Path) -> Result<InMemoryKeyManager> {
    if !path.exists() {
        return Ok(InMemoryKeyManager::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key store {}", path.display()))?;
    let records: Vec<StoredKey> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse key store {}", path.display()))?;
    InMemoryKeyManager::from_stored(&records)
        .with_context(|| format!("invalid key in {}", path.display()))
}

/// Persist every key of `keys` to `path`.
pub fn save_keys(keys: &InMemoryKeyManager, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(&keys.export())?;
    std::fs::write(path, text)
        .with_context(|| format!("failed to write key store {}", path.display()))
}
