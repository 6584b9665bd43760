//! # Proof Attachment
//!
//! Shared by credential issuance and presentation proving. The caller has
//! already resolved the signing DID document; this module picks the key,
//! signs the canonical form of the document and adds the proof.
//!
//! The input document is never touched. Signing works on a copy and the
//! copy is returned only when the proof is complete.

use serde_json::Value;
use tracing::debug;

use vcs_core::Timestamp;
use vcs_crypto::{Crypto, KeyManager};

use crate::canonize::Canonicalizer;
use crate::did::{DidDocument, VerificationRelationship};
use crate::error::VcError;
use crate::loader::DocumentLoader;
use crate::method::{key_id, resolve_verification_method};
use crate::proof::{Proof, ProofOptions};
use crate::signer::SignerAdapter;
use crate::suite::{canonical_proof_config, SignatureSuite};

/// Collaborators needed to produce a proof.
#[derive(Clone, Copy)]
pub struct SigningContext<'a> {
    /// Key-management capability.
    pub keys: &'a dyn KeyManager,
    /// Cryptographic operations.
    pub crypto: &'a dyn Crypto,
    /// JSON-LD context loader.
    pub loader: &'a dyn DocumentLoader,
    /// Statement canonicalizer.
    pub canonicalizer: &'a dyn Canonicalizer,
}

/// Sign `document` for `relationship` and return it with the new proof.
///
/// An existing `proof` object becomes an array holding the old and new
/// proofs.
pub fn attach_proof(
    ctx: SigningContext<'_>,
    document: &Value,
    did_doc: &DidDocument,
    options: &ProofOptions,
    relationship: VerificationRelationship,
) -> Result<Value, VcError> {
    let resolved = resolve_verification_method(
        did_doc,
        relationship,
        Some(options.verification_method.as_str()),
    )?;
    let kid = key_id(&options.kid, &resolved.verification_method);
    let signer = SignerAdapter::new(ctx.keys, ctx.crypto, &kid)?;

    let suite = SignatureSuite::select(&options.signature_type)?;
    let repr = options.signature_representation.unwrap_or_default();
    suite.check_representation(repr)?;

    let mut proof = Proof {
        proof_type: suite.proof_type(),
        created: options.created.unwrap_or_else(Timestamp::now),
        verification_method: did_doc.qualify(&resolved.verification_method),
        proof_purpose: resolved.purpose,
        domain: non_empty(&options.domain),
        challenge: non_empty(&options.challenge),
        nonce: None,
        proof_value: None,
        jws: None,
    };

    let document_data = ctx.canonicalizer.canonicalize(document, ctx.loader)?;
    let config_data = canonical_proof_config(
        proof.config()?,
        document.get("@context"),
        ctx.canonicalizer,
        ctx.loader,
    )?;
    let verify_data = suite.create_verify_data(&config_data, &document_data);
    suite.sign(&signer, &mut proof, &verify_data, repr)?;

    debug!(
        suite = %suite.proof_type(),
        verification_method = %proof.verification_method,
        purpose = %proof.proof_purpose,
        statements = document_data.len(),
        "proof attached"
    );

    let proof_value = serde_json::to_value(&proof)
        .map_err(|e| VcError::Parse(format!("serialize proof: {e}")))?;
    let mut signed = document.clone();
    add_proof(&mut signed, proof_value)?;
    Ok(signed)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn add_proof(document: &mut Value, proof: Value) -> Result<(), VcError> {
    let obj = document
        .as_object_mut()
        .ok_or_else(|| VcError::Parse("document must be a JSON object".into()))?;
    match obj.remove("proof") {
        None | Some(Value::Null) => {
            obj.insert("proof".into(), proof);
        }
        Some(Value::Array(mut proofs)) => {
            proofs.push(proof);
            obj.insert("proof".into(), Value::Array(proofs));
        }
        Some(existing) => {
            obj.insert("proof".into(), Value::Array(vec![existing, proof]));
        }
    }
    Ok(())
}
