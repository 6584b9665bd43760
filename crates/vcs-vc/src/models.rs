//! Request and response payloads for the engine operations.
//!
//! Documents are carried as raw JSON values; the engine validates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::proof::ProofOptions;

/// Issue a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCredentialRequest {
    /// Unsigned credential.
    pub credential: Value,
    /// Signing options.
    #[serde(default)]
    pub options: Option<ProofOptions>,
}

/// Verify a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCredentialRequest {
    /// Signed credential.
    pub verifiable_credential: Value,
}

/// Options for derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeriveOptions {
    /// Anti-replay nonce; its UTF-8 bytes bind the derived proof.
    #[serde(default)]
    pub nonce: String,
}

/// Derive a selectively disclosed credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveCredentialRequest {
    /// Credential signed with `BbsBlsSignature2020`.
    pub verifiable_credential: Value,
    /// Disclosure frame: an object, or JSON text of one.
    pub frame: Value,
    /// Derivation options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<DeriveOptions>,
}

/// Sign a presentation as its holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvePresentationRequest {
    /// Unsigned presentation.
    pub presentation: Value,
    /// Signing options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ProofOptions>,
}

/// Verify a presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPresentationRequest {
    /// Signed presentation.
    pub verifiable_presentation: Value,
}

/// Create a key in the key manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeySetRequest {
    /// `ED25519` or `BLS12381G2`.
    #[serde(default)]
    pub key_type: String,
}

/// A created key: its identifier and base64url public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    /// Key identifier in the key manager.
    #[serde(rename = "keyID")]
    pub key_id: String,
    /// Unpadded base64url public key bytes.
    #[serde(rename = "publicKey")]
    pub public_key: String,
}
