//! # Proof Verification
//!
//! Checks every proof embedded in a credential or presentation. The key
//! for each proof is looked up through a [`PublicKeyFetcher`]; the default
//! fetcher resolves the DID of the verification method and reads the key
//! material from the DID document.
//!
//! Verification never mutates its input.

use serde_json::Value;
use tracing::debug;

use vcs_crypto::PublicKey;

use crate::canonize::{Canonicalizer, Dataset};
use crate::derive::verify_derived_proof;
use crate::did::{resolve_did, DidResolver};
use crate::error::VcError;
use crate::loader::DocumentLoader;
use crate::proof::{document_proofs, Proof, ProofType};
use crate::suite::{canonical_proof_config, SignatureSuite};

/// Looks up the public key behind a verification method.
pub trait PublicKeyFetcher {
    /// Fetch the key for the absolute verification-method URL.
    fn fetch(&self, verification_method: &str) -> Result<PublicKey, VcError>;
}

/// Fetches keys by resolving the verification method's DID.
#[derive(Clone, Copy)]
pub struct DidKeyFetcher<'a> {
    resolver: &'a dyn DidResolver,
}

impl<'a> DidKeyFetcher<'a> {
    /// Wrap a resolver.
    pub fn new(resolver: &'a dyn DidResolver) -> Self {
        Self { resolver }
    }
}

impl PublicKeyFetcher for DidKeyFetcher<'_> {
    fn fetch(&self, verification_method: &str) -> Result<PublicKey, VcError> {
        let did_doc = resolve_did(self.resolver, verification_method)?;
        let method = did_doc.find_method(verification_method).ok_or_else(|| {
            VcError::PublicKeyNotFound(format!(
                "{verification_method} is not in the DID document of {}",
                did_doc.id
            ))
        })?;
        method
            .public_key()
            .map_err(|e| VcError::InvalidProof(format!("{verification_method}: {e}")))
    }
}

/// Canonicalize a document that is being verified. Content that cannot be
/// canonicalized cannot carry a valid proof.
pub(crate) fn canonicalize_for_verification(
    document: &Value,
    canonicalizer: &dyn Canonicalizer,
    loader: &dyn DocumentLoader,
) -> Result<Dataset, VcError> {
    canonicalizer
        .canonicalize(document, loader)
        .map_err(|e| match e {
            VcError::Parse(reason) => VcError::InvalidProof(reason),
            other => other,
        })
}

/// Verify every proof of `document`. A document without proofs is invalid.
pub fn verify_document(
    document: &Value,
    fetcher: &dyn PublicKeyFetcher,
    loader: &dyn DocumentLoader,
    canonicalizer: &dyn Canonicalizer,
) -> Result<(), VcError> {
    let proofs = document_proofs(document);
    if proofs.is_empty() {
        return Err(VcError::InvalidProof("document has no proof".into()));
    }
    let document_data = canonicalize_for_verification(document, canonicalizer, loader)?;
    let context = document.get("@context");

    for value in proofs {
        let proof = Proof::from_value(value)?;
        let key = fetcher.fetch(&proof.verification_method)?;
        match (proof.proof_type, SignatureSuite::for_proof_type(proof.proof_type)) {
            (_, Some(suite)) => {
                let config = canonical_proof_config(proof.config()?, context, canonicalizer, loader)
                    .map_err(|e| VcError::InvalidProof(e.to_string()))?;
                let verify_data = suite.create_verify_data(&config, &document_data);
                suite.verify(&proof, &verify_data, &key)?;
            }
            (ProofType::BbsBlsSignatureProof2020, None) => {
                verify_derived_proof(&proof, &document_data, context, &key, loader, canonicalizer)?;
            }
            (other, None) => {
                return Err(VcError::UnsupportedSignatureType(other.to_string()));
            }
        }
        debug!(
            proof_type = %proof.proof_type,
            verification_method = %proof.verification_method,
            "proof verified"
        );
    }
    Ok(())
}
