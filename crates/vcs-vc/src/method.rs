//! # Verification-Method Resolution
//!
//! Picks the key that signs a proof for a given purpose:
//!
//! 1. The purpose's relationship list decides. Without an explicit method
//!    the first entry wins; an explicit method must appear in that list,
//!    either verbatim or after both sides are qualified with the subject
//!    DID.
//! 2. If the list is empty, fall back over the whole document: first
//!    Ed25519 verification method, else the first method of any type, else
//!    the first `authentication` entry. The fallback id is qualified with
//!    the subject DID when it is not already a DID URL.

use tracing::warn;

use vcs_core::is_did;

use crate::did::{DidDocument, VerificationRelationship, ED25519_VERIFICATION_KEY};
use crate::error::VcError;
use crate::proof::ProofPurpose;

/// A resolved verification method together with the proof purpose it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMethod {
    /// Verification method id as listed in the DID document.
    pub verification_method: String,
    /// Proof purpose derived from the relationship.
    pub purpose: ProofPurpose,
}

/// Resolve the verification method for `relationship` in `did_doc`.
///
/// An explicit method matches an entry when the two ids are equal, and
/// also when they are equal once relative ids are qualified with
/// `did_doc.id`: `#k` matches an entry `did:x:y#k` and the reverse. The
/// explicit id is returned as the caller wrote it.
pub fn resolve_verification_method(
    did_doc: &DidDocument,
    relationship: VerificationRelationship,
    explicit: Option<&str>,
) -> Result<ResolvedMethod, VcError> {
    let purpose = ProofPurpose::for_relationship(relationship)?;
    let entries = did_doc.relationship(relationship);
    let explicit = explicit.filter(|vm| !vm.is_empty());

    if let Some(first) = entries.first() {
        let verification_method = match explicit {
            None => first.id().to_string(),
            Some(wanted) => {
                let wanted_abs = did_doc.qualify(wanted);
                entries
                    .iter()
                    .find(|e| e.id() == wanted || did_doc.qualify(e.id()) == wanted_abs)
                    .map(|_| wanted.to_string())
                    .ok_or_else(|| VcError::VerificationMethodMismatch {
                        purpose: purpose.to_string(),
                        verification_method: wanted.to_string(),
                    })?
            }
        };
        return Ok(ResolvedMethod {
            verification_method,
            purpose,
        });
    }

    if let Some(wanted) = explicit {
        return Err(VcError::VerificationMethodMismatch {
            purpose: purpose.to_string(),
            verification_method: wanted.to_string(),
        });
    }

    warn!(
        did = %did_doc.id,
        purpose = %purpose,
        "could not find matching verification method for proof purpose, using default"
    );
    Ok(ResolvedMethod {
        verification_method: default_verification_method(did_doc)?,
        purpose,
    })
}

/// Default key selection for documents with no entries for the purpose.
pub fn default_verification_method(did_doc: &DidDocument) -> Result<String, VcError> {
    let id = if let Some(first) = did_doc.verification_method.first() {
        did_doc
            .verification_method
            .iter()
            .find(|vm| vm.method_type.starts_with(ED25519_VERIFICATION_KEY))
            .unwrap_or(first)
            .id
            .clone()
    } else if let Some(entry) = did_doc.authentication.first() {
        entry.id().to_string()
    } else {
        return Err(VcError::PublicKeyNotFound(format!(
            "no verification method in DID document {}",
            did_doc.id
        )));
    };

    if is_did(&id) {
        Ok(id)
    } else {
        Ok(format!("{}{}", did_doc.id, id))
    }
}

/// Key identifier for signing: explicit `kid`, else the fragment of the
/// verification method when it contains exactly one `#`.
pub fn key_id(kid: &str, verification_method: &str) -> String {
    if !kid.is_empty() {
        return kid.to_string();
    }
    let parts: Vec<&str> = verification_method.split('#').collect();
    match parts.as_slice() {
        [_, fragment] => (*fragment).to_string(),
        _ => String::new(),
    }
}
