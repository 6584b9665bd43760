//! # JSON-LD Document Loader
//!
//! Contexts referenced by URL are fetched through a [`DocumentLoader`].
//! [`CachingDocumentLoader`] serves a set of built-in contexts, caches
//! whatever an optional fallback loader returns, and accepts static
//! overrides. The engine always installs the BBS+ vocabulary as an
//! override so its proof terms resolve without network access.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::VcError;

/// W3C credentials vocabulary.
pub const CREDENTIALS_V1_URL: &str = "https://www.w3.org/2018/credentials/v1";
/// Example claims vocabulary used by the W3C data-model examples.
pub const EXAMPLES_V1_URL: &str = "https://www.w3.org/2018/credentials/examples/v1";
/// Security vocabulary (proof terms).
pub const SECURITY_V2_URL: &str = "https://w3id.org/security/v2";
/// BBS+ signature vocabulary.
pub const BBS_V1_URL: &str = "https://w3id.org/security/bbs/v1";

const CREDENTIALS_V1: &str = include_str!("../contexts/credentials-v1.jsonld");
const EXAMPLES_V1: &str = include_str!("../contexts/examples-v1.jsonld");
const SECURITY_V2: &str = include_str!("../contexts/security-v2.jsonld");
const BBS_V1: &str = include_str!("../contexts/bbs-v1.jsonld");

/// Loads remote JSON-LD documents (contexts) by URL.
pub trait DocumentLoader: Send + Sync {
    /// Return the document at `url`.
    fn load(&self, url: &str) -> Result<Arc<Value>, VcError>;
}

/// Loader with a static cache in front of an optional fallback.
#[derive(Default)]
pub struct CachingDocumentLoader {
    cache: RwLock<HashMap<String, Arc<Value>>>,
    fallback: Option<Arc<dyn DocumentLoader>>,
}

impl CachingDocumentLoader {
    /// An empty loader with no fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader preloaded with the built-in contexts.
    pub fn with_builtin_contexts() -> Result<Self, VcError> {
        let loader = Self::new();
        for (url, text) in [
            (CREDENTIALS_V1_URL, CREDENTIALS_V1),
            (EXAMPLES_V1_URL, EXAMPLES_V1),
            (SECURITY_V2_URL, SECURITY_V2),
        ] {
            loader.add_document_str(url, text)?;
        }
        Ok(loader)
    }

    /// Consult `fallback` for URLs not in the cache.
    pub fn with_fallback(mut self, fallback: Arc<dyn DocumentLoader>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Install or replace a document.
    pub fn add_document(&self, url: impl Into<String>, document: Value) {
        self.cache.write().insert(url.into(), Arc::new(document));
    }

    /// Install or replace a document given as JSON text.
    pub fn add_document_str(&self, url: &str, text: &str) -> Result<(), VcError> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| VcError::Parse(format!("context {url}: {e}")))?;
        self.add_document(url, document);
        Ok(())
    }

    /// Whether `url` is served from the cache.
    pub fn contains(&self, url: &str) -> bool {
        self.cache.read().contains_key(url)
    }
}

impl DocumentLoader for CachingDocumentLoader {
    fn load(&self, url: &str) -> Result<Arc<Value>, VcError> {
        if let Some(doc) = self.cache.read().get(url) {
            return Ok(Arc::clone(doc));
        }
        let fallback = self
            .fallback
            .as_ref()
            .ok_or_else(|| VcError::Parse(format!("unable to load context {url}")))?;
        let doc = fallback.load(url)?;
        self.cache.write().insert(url.to_string(), Arc::clone(&doc));
        Ok(doc)
    }
}

impl std::fmt::Debug for CachingDocumentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingDocumentLoader")
            .field("cached", &self.cache.read().len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// The engine's loader: built-in contexts, the BBS+ vocabulary override,
/// then `fallback` for anything else.
pub fn bbs_document_loader(
    fallback: Option<Arc<dyn DocumentLoader>>,
) -> Result<CachingDocumentLoader, VcError> {
    let mut loader = CachingDocumentLoader::with_builtin_contexts()?;
    if let Some(fallback) = fallback {
        loader = loader.with_fallback(fallback);
    }
    loader.add_document_str(BBS_V1_URL, BBS_V1)?;
    Ok(loader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: AtomicUsize,
    }

    impl DocumentLoader for CountingLoader {
        fn load(&self, url: &str) -> Result<Arc<Value>, VcError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(serde_json::json!({"@context": {"remote": url}})))
        }
    }

    #[test]
    fn builtin_contexts_parse() {
        let loader = bbs_document_loader(None).unwrap();
        for url in [CREDENTIALS_V1_URL, EXAMPLES_V1_URL, SECURITY_V2_URL, BBS_V1_URL] {
            let doc = loader.load(url).unwrap();
            assert!(doc.get("@context").is_some(), "{url}");
        }
    }

    #[test]
    fn bbs_vocabulary_defines_signature_terms() {
        let loader = bbs_document_loader(None).unwrap();
        let doc = loader.load(BBS_V1_URL).unwrap();
        let ctx = &doc["@context"];
        assert!(ctx.get("BbsBlsSignature2020").is_some());
        assert!(ctx.get("BbsBlsSignatureProof2020").is_some());
        assert_eq!(ctx["Bls12381G2Key2020"], "ldssk:Bls12381G2Key2020");
    }

    #[test]
    fn unknown_url_without_fallback_fails() {
        let loader = CachingDocumentLoader::new();
        assert!(matches!(
            loader.load("https://example.com/ctx"),
            Err(VcError::Parse(_))
        ));
    }

    #[test]
    fn fallback_results_are_cached() {
        let remote = Arc::new(CountingLoader {
            calls: AtomicUsize::new(0),
        });
        let loader = CachingDocumentLoader::new().with_fallback(remote.clone());
        loader.load("https://example.com/a").unwrap();
        loader.load("https://example.com/a").unwrap();
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
        assert!(loader.contains("https://example.com/a"));
    }

    #[test]
    fn bbs_override_takes_precedence_over_fallback() {
        let remote = Arc::new(CountingLoader {
            calls: AtomicUsize::new(0),
        });
        let loader = bbs_document_loader(Some(remote.clone())).unwrap();
        let doc = loader.load(BBS_V1_URL).unwrap();
        assert!(doc["@context"].get("BbsBlsSignature2020").is_some());
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }
}
