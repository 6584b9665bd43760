//! # Engine
//!
//! The five document operations plus key-set creation, wired to injected
//! collaborators. Each call builds its own signer and suite; the engine
//! holds no mutable state of its own, so one instance serves concurrent
//! requests.

use std::str::FromStr;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;
use tracing::info;

use vcs_crypto::{Crypto, KeyManager, KeyType};

use crate::attach::{attach_proof, SigningContext};
use crate::canonize::{Canonicalizer, StatementCanonicalizer};
use crate::credential::{Credential, Presentation};
use crate::derive;
use crate::did::{resolve_did, DidResolver, VerificationRelationship};
use crate::error::VcError;
use crate::frame::{Frame, FrameInput};
use crate::loader::{bbs_document_loader, DocumentLoader};
use crate::models::{DeriveOptions, KeySet};
use crate::proof::{document_proofs, ProofOptions};
use crate::verify::{verify_document, DidKeyFetcher};

/// Proof orchestration over injected capabilities.
pub struct Engine {
    resolver: Arc<dyn DidResolver>,
    keys: Arc<dyn KeyManager>,
    crypto: Arc<dyn Crypto>,
    loader: Arc<dyn DocumentLoader>,
    canonicalizer: Arc<dyn Canonicalizer>,
}

impl Engine {
    /// Build an engine with the built-in context loader and canonicalizer.
    pub fn new(
        resolver: Arc<dyn DidResolver>,
        keys: Arc<dyn KeyManager>,
        crypto: Arc<dyn Crypto>,
    ) -> Result<Self, VcError> {
        Ok(Self {
            resolver,
            keys,
            crypto,
            loader: Arc::new(bbs_document_loader(None)?),
            canonicalizer: Arc::new(StatementCanonicalizer),
        })
    }

    /// Consult `fallback` for contexts that are not built in. The BBS+
    /// vocabulary is always served locally.
    pub fn with_document_loader(mut self, fallback: Arc<dyn DocumentLoader>) -> Result<Self, VcError> {
        self.loader = Arc::new(bbs_document_loader(Some(fallback))?);
        Ok(self)
    }

    /// Replace the canonicalizer.
    pub fn with_canonicalizer(mut self, canonicalizer: Arc<dyn Canonicalizer>) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    fn signing_context(&self) -> SigningContext<'_> {
        SigningContext {
            keys: self.keys.as_ref(),
            crypto: self.crypto.as_ref(),
            loader: self.loader.as_ref(),
            canonicalizer: self.canonicalizer.as_ref(),
        }
    }

    fn verify(&self, document: &Value) -> Result<(), VcError> {
        verify_document(
            document,
            &DidKeyFetcher::new(self.resolver.as_ref()),
            self.loader.as_ref(),
            self.canonicalizer.as_ref(),
        )
    }

    /// Sign `credential` with an `assertionMethod` key of its issuer.
    pub fn issue_credential(&self, credential: &Value, options: &ProofOptions) -> Result<Value, VcError> {
        let parsed = Credential::parse(credential.clone())?;
        let issuer = parsed.issuer()?;
        let did_doc = resolve_did(self.resolver.as_ref(), issuer)?;
        let signed = attach_proof(
            self.signing_context(),
            credential,
            &did_doc,
            options,
            VerificationRelationship::AssertionMethod,
        )?;
        info!(issuer = %issuer, signature_type = %options.signature_type, "credential issued");
        Ok(signed)
    }

    /// Verify every proof of a credential.
    pub fn verify_credential(&self, credential: &Value) -> Result<(), VcError> {
        Credential::parse(credential.clone())?;
        self.verify(credential)
    }

    /// Derive a credential that discloses only what `frame` selects.
    ///
    /// The nonce is used as given, as UTF-8 bytes; missing options mean an
    /// empty nonce. Choosing a fresh nonce per derivation is up to the
    /// caller.
    pub fn derive_credential(
        &self,
        credential: &Value,
        frame: impl Into<FrameInput>,
        options: Option<&DeriveOptions>,
    ) -> Result<Value, VcError> {
        Credential::parse(credential.clone())?;
        let frame = Frame::from_input(frame)?;
        let nonce = options.map(|o| o.nonce.as_bytes()).unwrap_or_default();
        let derived = derive::derive_credential(
            credential,
            &frame,
            nonce,
            &DidKeyFetcher::new(self.resolver.as_ref()),
            self.loader.as_ref(),
            self.canonicalizer.as_ref(),
        )?;
        info!("credential derived");
        Ok(derived)
    }

    /// Sign `presentation` with an `assertionMethod` key of its holder.
    pub fn prove_presentation(&self, presentation: &Value, options: &ProofOptions) -> Result<Value, VcError> {
        let parsed = Presentation::parse(presentation.clone())?;
        let holder = parsed
            .holder()
            .ok_or_else(|| VcError::Parse("presentation has no holder".into()))?;
        let did_doc = resolve_did(self.resolver.as_ref(), holder)?;
        let signed = attach_proof(
            self.signing_context(),
            presentation,
            &did_doc,
            options,
            VerificationRelationship::AssertionMethod,
        )?;
        info!(holder = %holder, signature_type = %options.signature_type, "presentation proved");
        Ok(signed)
    }

    /// Verify a presentation's proofs and the proofs of every embedded
    /// credential that carries one.
    pub fn verify_presentation(&self, presentation: &Value) -> Result<(), VcError> {
        Presentation::parse(presentation.clone())?;
        self.verify(presentation)?;
        let embedded: Vec<&Value> = match presentation.get("verifiableCredential") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => Vec::new(),
        };
        for credential in embedded {
            if !document_proofs(credential).is_empty() {
                self.verify(credential)?;
            }
        }
        Ok(())
    }

    /// Create a key of `key_type` (`ED25519` or `BLS12381G2`).
    pub fn create_key_set(&self, key_type: &str) -> Result<KeySet, VcError> {
        let invalid = || VcError::Parse(format!("invalid key type: {key_type}"));
        if key_type.is_empty() {
            return Err(invalid());
        }
        let key_type = KeyType::from_str(key_type).map_err(|_| invalid())?;
        let (key_id, public_key) = self
            .keys
            .create_and_export_public_key(key_type)
            .map_err(VcError::signing("create key set"))?;
        info!(kid = %key_id, key_type = %key_type, "key set created");
        Ok(KeySet {
            key_id,
            public_key: URL_SAFE_NO_PAD.encode(public_key),
        })
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").finish_non_exhaustive()
    }
}
