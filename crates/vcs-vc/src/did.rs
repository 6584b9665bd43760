//! # DID Documents and Resolution
//!
//! A parsed DID document: verification methods plus the verification
//! relationships that reference them. Resolution is an external capability
//! behind [`DidResolver`]; [`InMemoryDidRegistry`] is the in-process fake.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vcs_core::{is_did, Did, DidUrl};
use vcs_crypto::{CryptoError, KeyType, PublicKey};

use crate::error::VcError;

/// Verification method type prefix for Ed25519 keys.
pub const ED25519_VERIFICATION_KEY: &str = "Ed25519VerificationKey";

/// A key entry in a DID document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Absolute DID URL or document-relative `#fragment`.
    pub id: String,
    /// Key type name, e.g. `Ed25519VerificationKey2018`.
    #[serde(rename = "type")]
    pub method_type: String,
    /// DID of the controller.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub controller: String,
    /// base58 key bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,
    /// Multibase key bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,
    /// JWK key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<serde_json::Value>,
}

impl VerificationMethod {
    /// Key family implied by the method type, if recognizable.
    pub fn key_type_hint(&self) -> Option<KeyType> {
        if self.method_type.starts_with(ED25519_VERIFICATION_KEY) {
            Some(KeyType::Ed25519)
        } else if self.method_type.starts_with("Bls12381G2Key") {
            Some(KeyType::Bls12381G2)
        } else {
            None
        }
    }

    /// Decode the public key material.
    pub fn public_key(&self) -> Result<PublicKey, CryptoError> {
        let hint = self.key_type_hint();
        if let Some(b58) = &self.public_key_base58 {
            return PublicKey::from_base58(b58, hint);
        }
        if let Some(mb) = &self.public_key_multibase {
            return PublicKey::from_multibase(mb, hint);
        }
        if let Some(jwk) = &self.public_key_jwk {
            return PublicKey::from_jwk(jwk);
        }
        Err(CryptoError::InvalidPublicKey(format!(
            "verification method {} carries no key material",
            self.id
        )))
    }
}

/// A verification relationship entry: a reference or an embedded method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipEntry {
    /// Reference to a method in `verificationMethod`.
    Reference(String),
    /// A method defined inline.
    Embedded(VerificationMethod),
}

impl RelationshipEntry {
    /// The referenced or embedded method id.
    pub fn id(&self) -> &str {
        match self {
            Self::Reference(id) => id,
            Self::Embedded(vm) => &vm.id,
        }
    }
}

/// Verification relationships defined by DID Core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationRelationship {
    /// `authentication`
    Authentication,
    /// `assertionMethod`
    AssertionMethod,
    /// `keyAgreement`
    KeyAgreement,
    /// `capabilityInvocation`
    CapabilityInvocation,
    /// `capabilityDelegation`
    CapabilityDelegation,
}

impl fmt::Display for VerificationRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "authentication",
            Self::AssertionMethod => "assertionMethod",
            Self::KeyAgreement => "keyAgreement",
            Self::CapabilityInvocation => "capabilityInvocation",
            Self::CapabilityDelegation => "capabilityDelegation",
        };
        f.write_str(name)
    }
}

/// A parsed DID document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    /// Subject DID.
    pub id: String,
    /// Key entries. `publicKey` is accepted for older documents.
    #[serde(default, alias = "publicKey")]
    pub verification_method: Vec<VerificationMethod>,
    /// `authentication` relationship.
    #[serde(default)]
    pub authentication: Vec<RelationshipEntry>,
    /// `assertionMethod` relationship.
    #[serde(default)]
    pub assertion_method: Vec<RelationshipEntry>,
    /// `keyAgreement` relationship.
    #[serde(default)]
    pub key_agreement: Vec<RelationshipEntry>,
    /// `capabilityInvocation` relationship.
    #[serde(default)]
    pub capability_invocation: Vec<RelationshipEntry>,
    /// `capabilityDelegation` relationship.
    #[serde(default)]
    pub capability_delegation: Vec<RelationshipEntry>,
}

impl DidDocument {
    /// Parse and validate a DID document from JSON.
    pub fn from_json(value: serde_json::Value) -> Result<Self, VcError> {
        let doc: Self = serde_json::from_value(value)
            .map_err(|e| VcError::Parse(format!("malformed DID document: {e}")))?;
        Did::new(doc.id.clone())?;
        Ok(doc)
    }

    /// An empty document for `did`.
    pub fn new(did: impl Into<String>) -> Self {
        Self {
            id: did.into(),
            verification_method: Vec::new(),
            authentication: Vec::new(),
            assertion_method: Vec::new(),
            key_agreement: Vec::new(),
            capability_invocation: Vec::new(),
            capability_delegation: Vec::new(),
        }
    }

    /// Entries of one relationship, in document order.
    pub fn relationship(&self, rel: VerificationRelationship) -> &[RelationshipEntry] {
        match rel {
            VerificationRelationship::Authentication => &self.authentication,
            VerificationRelationship::AssertionMethod => &self.assertion_method,
            VerificationRelationship::KeyAgreement => &self.key_agreement,
            VerificationRelationship::CapabilityInvocation => &self.capability_invocation,
            VerificationRelationship::CapabilityDelegation => &self.capability_delegation,
        }
    }

    /// Prefix a document-relative id with the subject DID. Absolute DID
    /// URLs are returned unchanged.
    pub fn qualify(&self, id: &str) -> String {
        if is_did(id) {
            id.to_string()
        } else {
            format!("{}{}", self.id, id)
        }
    }

    /// Find a verification method by absolute or relative id, searching
    /// `verificationMethod` and embedded relationship entries.
    pub fn find_method(&self, id: &str) -> Option<&VerificationMethod> {
        let wanted = self.qualify(id);
        let embedded = [
            &self.authentication,
            &self.assertion_method,
            &self.key_agreement,
            &self.capability_invocation,
            &self.capability_delegation,
        ]
        .into_iter()
        .flatten()
        .filter_map(|entry| match entry {
            RelationshipEntry::Embedded(vm) => Some(vm),
            RelationshipEntry::Reference(_) => None,
        });
        self.verification_method
            .iter()
            .chain(embedded)
            .find(|vm| self.qualify(&vm.id) == wanted)
    }
}

/// Failure reported by a DID resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The DID is not known to the resolver.
    #[error("DID not found: {0}")]
    NotFound(String),
    /// The resolver backend failed.
    #[error("resolver error: {0}")]
    Backend(String),
}

/// DID resolution capability.
pub trait DidResolver: Send + Sync {
    /// Resolve a bare DID to its document.
    fn resolve(&self, did: &Did) -> Result<DidDocument, ResolutionError>;
}

/// Resolve a DID or DID URL through `resolver`, mapping failures to
/// [`VcError::DidResolutionFailed`].
pub fn resolve_did(resolver: &dyn DidResolver, did_or_url: &str) -> Result<DidDocument, VcError> {
    let failed = |reason: String| VcError::DidResolutionFailed {
        did: did_or_url.to_string(),
        reason,
    };
    let url = DidUrl::parse(did_or_url).map_err(|e| failed(e.to_string()))?;
    resolver
        .resolve(url.did())
        .map_err(|e| failed(e.to_string()))
}

/// In-memory DID registry.
#[derive(Debug, Default)]
pub struct InMemoryDidRegistry {
    documents: RwLock<HashMap<String, DidDocument>>,
}

impl InMemoryDidRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a document under its subject DID.
    pub fn insert(&self, doc: DidDocument) {
        self.documents.write().insert(doc.id.clone(), doc);
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl DidResolver for InMemoryDidRegistry {
    fn resolve(&self, did: &Did) -> Result<DidDocument, ResolutionError> {
        self.documents
            .read()
            .get(did.as_str())
            .cloned()
            .ok_or_else(|| ResolutionError::NotFound(did.to_string()))
    }
}
