//! # Linked-Data Proof Types
//!
//! The proof object embedded in credentials and presentations, the caller's
//! proof options, and the vocabulary enums (`type`, `proofPurpose`,
//! signature representation).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use vcs_core::Timestamp;

use crate::did::VerificationRelationship;
use crate::error::VcError;

/// Proof types produced or accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofType {
    /// Ed25519 signature over the canonical document.
    Ed25519Signature2018,
    /// Ed25519 signature, conventionally carried as a detached JWS.
    JsonWebSignature2020,
    /// BBS+ signature over the canonical statements.
    BbsBlsSignature2020,
    /// Selective-disclosure proof derived from a BBS+ signature.
    BbsBlsSignatureProof2020,
}

impl ProofType {
    /// Vocabulary name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519Signature2018 => "Ed25519Signature2018",
            Self::JsonWebSignature2020 => "JsonWebSignature2020",
            Self::BbsBlsSignature2020 => "BbsBlsSignature2020",
            Self::BbsBlsSignatureProof2020 => "BbsBlsSignatureProof2020",
        }
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProofType {
    type Err = VcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ed25519Signature2018" => Ok(Self::Ed25519Signature2018),
            "JsonWebSignature2020" => Ok(Self::JsonWebSignature2020),
            "BbsBlsSignature2020" => Ok(Self::BbsBlsSignature2020),
            "BbsBlsSignatureProof2020" => Ok(Self::BbsBlsSignatureProof2020),
            other => Err(VcError::UnsupportedSignatureType(other.to_string())),
        }
    }
}

/// The purpose of a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the claims.
    AssertionMethod,
    /// The holder authenticates.
    Authentication,
}

impl ProofPurpose {
    /// Map a DID relationship to the proof purpose it authorizes.
    pub fn for_relationship(rel: VerificationRelationship) -> Result<Self, VcError> {
        match rel {
            VerificationRelationship::AssertionMethod => Ok(Self::AssertionMethod),
            VerificationRelationship::Authentication => Ok(Self::Authentication),
            other => Err(VcError::UnsupportedProofPurpose(other.to_string())),
        }
    }

    /// The DID relationship whose keys may produce this proof.
    pub fn relationship(&self) -> VerificationRelationship {
        match self {
            Self::AssertionMethod => VerificationRelationship::AssertionMethod,
            Self::Authentication => VerificationRelationship::Authentication,
        }
    }
}

impl fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssertionMethod => f.write_str("assertionMethod"),
            Self::Authentication => f.write_str("authentication"),
        }
    }
}

/// Where the signature goes in the proof object.
///
/// Serialized as `0`/`1`; deserialized from those integers or from the
/// strings `"proofValue"` / `"jws"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureRepresentation {
    /// base64 `proofValue`.
    #[default]
    ProofValue,
    /// Detached compact JWS in `jws`.
    Jws,
}

impl Serialize for SignatureRepresentation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::ProofValue => serializer.serialize_u8(0),
            Self::Jws => serializer.serialize_u8(1),
        }
    }
}

impl<'de> Deserialize<'de> for SignatureRepresentation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match &raw {
            serde_json::Value::Number(n) if n.as_u64() == Some(0) => Ok(Self::ProofValue),
            serde_json::Value::Number(n) if n.as_u64() == Some(1) => Ok(Self::Jws),
            serde_json::Value::String(s) if s == "proofValue" => Ok(Self::ProofValue),
            serde_json::Value::String(s) if s == "jws" => Ok(Self::Jws),
            _ => Err(serde::de::Error::custom(format!(
                "invalid signature representation: {raw}"
            ))),
        }
    }
}

/// Caller-supplied signing parameters.
///
/// `proofPurpose` is not accepted here; it is fixed by the operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofOptions {
    /// Key identifier in the key manager. Derived from the verification
    /// method fragment when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kid: String,
    /// Explicit verification method URI.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub verification_method: String,
    /// Embedded proof value or detached JWS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_representation: Option<SignatureRepresentation>,
    /// Proof creation time; now if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
    /// Operational domain.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    /// Challenge for authentication proofs.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub challenge: String,
    /// Signature suite name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature_type: String,
}

/// An embedded linked-data proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Proof type.
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    /// Creation time.
    pub created: Timestamp,
    /// Absolute DID URL of the signing key.
    pub verification_method: String,
    /// Proof purpose.
    pub proof_purpose: ProofPurpose,
    /// Operational domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    /// base64 derivation nonce (derived proofs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// base64 signature or proof bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    /// Detached compact JWS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jws: Option<String>,
}

impl Proof {
    /// Parse a proof object, reporting an unknown `type` as
    /// [`VcError::UnsupportedSignatureType`] and anything else malformed as
    /// [`VcError::InvalidProof`].
    pub fn from_value(value: &serde_json::Value) -> Result<Self, VcError> {
        let type_name = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| VcError::InvalidProof("proof has no type".into()))?;
        ProofType::from_str(type_name)?;
        serde_json::from_value(value.clone())
            .map_err(|e| VcError::InvalidProof(format!("malformed proof: {e}")))
    }

    /// The proof configuration that is canonicalized alongside the
    /// document: this proof without its signature fields.
    pub fn config(&self) -> Result<serde_json::Map<String, serde_json::Value>, VcError> {
        let mut config = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(_) => return Err(VcError::InvalidProof("proof is not an object".into())),
            Err(e) => return Err(VcError::InvalidProof(e.to_string())),
        };
        for key in ["proofValue", "jws", "nonce"] {
            config.remove(key);
        }
        Ok(config)
    }
}

/// Collect the proofs of a document (`proof` may be an object or an array).
pub fn document_proofs(document: &serde_json::Value) -> Vec<&serde_json::Value> {
    match document.get("proof") {
        Some(serde_json::Value::Array(items)) => items.iter().collect(),
        Some(serde_json::Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    }
}
