//! # Signature Suites
//!
//! The closed set of suites the engine can sign with. Each suite carries its
//! [`SigningMode`], builds the bytes to sign from the canonical proof
//! configuration and document, and encodes or checks the resulting proof.
//!
//! | Suite | Mode | Signed data |
//! |---|---|---|
//! | `Ed25519Signature2018` | single | `sha256(proof config) ‖ sha256(document)` |
//! | `JsonWebSignature2020` | single | same, wrapped in a detached JWS by default |
//! | `BbsBlsSignature2020` | multi | proof config statements then document statements |

use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use vcs_crypto::bbs::{bbs_verify, BbsSignature};
use vcs_crypto::jws::{self, DetachedJws, JwsHeader};
use vcs_crypto::{Ed25519Signature, KeyType, PublicKey};

use crate::canonize::{Canonicalizer, Dataset};
use crate::error::VcError;
use crate::loader::{DocumentLoader, SECURITY_V2_URL};
use crate::proof::{Proof, ProofType, SignatureRepresentation};
use crate::signer::{text_to_lines, SignerAdapter};

/// How a suite's signer treats its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningMode {
    /// The whole input is one message.
    Single,
    /// Each non-blank input line is one message.
    Multi,
}

/// A signature suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureSuite {
    /// Ed25519 with an embedded proof value.
    Ed25519Signature2018,
    /// Ed25519 under the JSON Web Signature suite name.
    JsonWebSignature2020,
    /// BBS+ over BLS12-381.
    BbsBlsSignature2020,
}

impl SignatureSuite {
    /// Select the suite for a signature type name.
    pub fn select(signature_type: &str) -> Result<Self, VcError> {
        match ProofType::from_str(signature_type)? {
            ProofType::Ed25519Signature2018 => Ok(Self::Ed25519Signature2018),
            ProofType::JsonWebSignature2020 => Ok(Self::JsonWebSignature2020),
            ProofType::BbsBlsSignature2020 => Ok(Self::BbsBlsSignature2020),
            ProofType::BbsBlsSignatureProof2020 => Err(VcError::UnsupportedSignatureType(
                "BbsBlsSignatureProof2020 is produced by derivation, not signing".into(),
            )),
        }
    }

    /// The suite that verifies proofs of `proof_type`, if any.
    pub fn for_proof_type(proof_type: ProofType) -> Option<Self> {
        match proof_type {
            ProofType::Ed25519Signature2018 => Some(Self::Ed25519Signature2018),
            ProofType::JsonWebSignature2020 => Some(Self::JsonWebSignature2020),
            ProofType::BbsBlsSignature2020 => Some(Self::BbsBlsSignature2020),
            ProofType::BbsBlsSignatureProof2020 => None,
        }
    }

    /// Signing mode carried by this suite.
    pub fn signing_mode(&self) -> SigningMode {
        match self {
            Self::BbsBlsSignature2020 => SigningMode::Multi,
            Self::Ed25519Signature2018 | Self::JsonWebSignature2020 => SigningMode::Single,
        }
    }

    /// Proof type written into produced proofs.
    pub fn proof_type(&self) -> ProofType {
        match self {
            Self::Ed25519Signature2018 => ProofType::Ed25519Signature2018,
            Self::JsonWebSignature2020 => ProofType::JsonWebSignature2020,
            Self::BbsBlsSignature2020 => ProofType::BbsBlsSignature2020,
        }
    }

    /// Key family this suite signs with.
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::BbsBlsSignature2020 => KeyType::Bls12381G2,
            Self::Ed25519Signature2018 | Self::JsonWebSignature2020 => KeyType::Ed25519,
        }
    }

    /// Reject representations the suite cannot produce.
    pub fn check_representation(&self, repr: SignatureRepresentation) -> Result<(), VcError> {
        match (self, repr) {
            (Self::BbsBlsSignature2020, SignatureRepresentation::Jws) => {
                Err(VcError::UnsupportedSignatureType(
                    "BbsBlsSignature2020 does not support the JWS representation".into(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// The bytes handed to the signer.
    pub fn create_verify_data(&self, proof_config: &Dataset, document: &Dataset) -> Vec<u8> {
        match self.signing_mode() {
            SigningMode::Single => {
                let mut data = Sha256::digest(proof_config.to_nquads().as_bytes()).to_vec();
                data.extend_from_slice(&Sha256::digest(document.to_nquads().as_bytes()));
                data
            }
            SigningMode::Multi => {
                let mut text = proof_config.to_nquads();
                text.push_str(&document.to_nquads());
                text.into_bytes()
            }
        }
    }

    /// Sign `verify_data` and store the signature in `proof`.
    pub fn sign(
        &self,
        signer: &SignerAdapter<'_>,
        proof: &mut Proof,
        verify_data: &[u8],
        repr: SignatureRepresentation,
    ) -> Result<(), VcError> {
        self.check_representation(repr)?;
        match repr {
            SignatureRepresentation::ProofValue => {
                let signature = signer.sign(verify_data, self.signing_mode())?;
                proof.proof_value = Some(STANDARD.encode(signature));
            }
            SignatureRepresentation::Jws => {
                let header = JwsHeader::eddsa()
                    .encode()
                    .map_err(VcError::signing("encode JWS header"))?;
                let input = jws::signing_input(&header, verify_data);
                let signature = signer.sign(&input, self.signing_mode())?;
                proof.jws = Some(jws::encode_detached(&header, &signature));
            }
        }
        Ok(())
    }

    /// Check the signature in `proof` over `verify_data`.
    pub fn verify(
        &self,
        proof: &Proof,
        verify_data: &[u8],
        key: &PublicKey,
    ) -> Result<(), VcError> {
        let invalid = |e: vcs_crypto::CryptoError| VcError::InvalidProof(e.to_string());
        match self.signing_mode() {
            SigningMode::Single => {
                let pk = key.to_ed25519().map_err(invalid)?;
                let (message, signature) = match (&proof.jws, &proof.proof_value) {
                    (Some(compact), _) => {
                        let parsed = DetachedJws::parse(compact).map_err(invalid)?;
                        if parsed.header.alg != "EdDSA" {
                            return Err(VcError::InvalidProof(format!(
                                "unsupported JWS alg {}",
                                parsed.header.alg
                            )));
                        }
                        (
                            jws::signing_input(&parsed.header_segment, verify_data),
                            parsed.signature,
                        )
                    }
                    (None, Some(value)) => (verify_data.to_vec(), decode_base64(value)?),
                    (None, None) => {
                        return Err(VcError::InvalidProof("proof has no signature".into()))
                    }
                };
                let signature = Ed25519Signature::from_slice(&signature).map_err(invalid)?;
                pk.verify(&message, &signature).map_err(invalid)
            }
            SigningMode::Multi => {
                let pk = key.to_bbs().map_err(invalid)?;
                let value = proof
                    .proof_value
                    .as_deref()
                    .ok_or_else(|| VcError::InvalidProof("proof has no proofValue".into()))?;
                let signature =
                    BbsSignature::from_slice(&decode_base64(value)?).map_err(invalid)?;
                bbs_verify(&pk, &signature, &text_to_lines(verify_data)).map_err(invalid)
            }
        }
    }
}

/// Canonicalize a proof configuration under the document's `@context`
/// followed by the security vocabulary.
pub fn canonical_proof_config(
    mut config: Map<String, Value>,
    document_context: Option<&Value>,
    canonicalizer: &dyn Canonicalizer,
    loader: &dyn DocumentLoader,
) -> Result<Dataset, VcError> {
    let mut contexts = match document_context {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single.clone()],
    };
    contexts.push(Value::String(SECURITY_V2_URL.to_string()));
    config.insert("@context".into(), Value::Array(contexts));
    canonicalizer.canonicalize(&Value::Object(config), loader)
}

/// Decode padded standard base64, accepting unpadded base64url as well.
pub(crate) fn decode_base64(value: &str) -> Result<Vec<u8>, VcError> {
    STANDARD
        .decode(value)
        .or_else(|_| URL_SAFE_NO_PAD.decode(value))
        .map_err(|e| VcError::InvalidProof(format!("invalid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_closed_set() {
        assert_eq!(
            SignatureSuite::select("Ed25519Signature2018").unwrap(),
            SignatureSuite::Ed25519Signature2018
        );
        assert_eq!(
            SignatureSuite::select("JsonWebSignature2020").unwrap(),
            SignatureSuite::JsonWebSignature2020
        );
        assert_eq!(
            SignatureSuite::select("BbsBlsSignature2020").unwrap(),
            SignatureSuite::BbsBlsSignature2020
        );
        for bad in ["", "RsaSignature2018", "BbsBlsSignatureProof2020"] {
            assert!(matches!(
                SignatureSuite::select(bad),
                Err(VcError::UnsupportedSignatureType(_))
            ));
        }
    }

    #[test]
    fn bbs_suite_carries_multi_mode() {
        assert_eq!(
            SignatureSuite::BbsBlsSignature2020.signing_mode(),
            SigningMode::Multi
        );
        assert_eq!(
            SignatureSuite::Ed25519Signature2018.signing_mode(),
            SigningMode::Single
        );
        assert_eq!(
            SignatureSuite::JsonWebSignature2020.signing_mode(),
            SigningMode::Single
        );
    }

    #[test]
    fn bbs_rejects_jws_representation() {
        assert!(SignatureSuite::BbsBlsSignature2020
            .check_representation(SignatureRepresentation::Jws)
            .is_err());
        assert!(SignatureSuite::JsonWebSignature2020
            .check_representation(SignatureRepresentation::Jws)
            .is_ok());
    }

    #[test]
    fn verify_data_shapes() {
        let p = Dataset::from_statements(vec!["p1 .".into()]);
        let d = Dataset::from_statements(vec!["d2 .".into(), "d1 .".into()]);
        let single = SignatureSuite::Ed25519Signature2018.create_verify_data(&p, &d);
        assert_eq!(single.len(), 64);
        let multi = SignatureSuite::BbsBlsSignature2020.create_verify_data(&p, &d);
        assert_eq!(String::from_utf8(multi).unwrap(), "p1 .\nd1 .\nd2 .\n");
    }

    #[test]
    fn base64_accepts_both_alphabets() {
        assert_eq!(decode_base64("AQID").unwrap(), vec![1, 2, 3]);
        assert_eq!(decode_base64("-_8").unwrap(), vec![0xfb, 0xff]);
        assert!(matches!(decode_base64("%%%"), Err(VcError::InvalidProof(_))));
    }
}
