//! # Selective Disclosure
//!
//! Turns a credential signed with `BbsBlsSignature2020` into a derived
//! credential that reveals only the framed properties, carrying a
//! `BbsBlsSignatureProof2020` proof. The holder needs no private key: the
//! proof of knowledge is built from the issuer's signature, the issuer's
//! public key and a caller-chosen nonce.
//!
//! Signed messages are the proof-configuration statements followed by the
//! document statements. A derived proof always reveals every
//! proof-configuration statement, plus the document statements that
//! survive framing. Framing runs on the skolemized document, so blank
//! nodes keep their original canonical labels: the derived credential
//! names them `urn:bnid:_:c14nN`, and verification maps those ids back to
//! the labels before matching messages.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::debug;

use vcs_crypto::bbs::{bbs_create_proof, bbs_verify_proof, BbsProof, BbsSignature};
use vcs_crypto::PublicKey;

use crate::canonize::{Canonicalizer, Dataset};
use crate::error::VcError;
use crate::frame::Frame;
use crate::loader::DocumentLoader;
use crate::proof::{document_proofs, Proof, ProofType};
use crate::signer::text_to_lines;
use crate::suite::{canonical_proof_config, decode_base64, SignatureSuite};
use crate::verify::{canonicalize_for_verification, PublicKeyFetcher};

/// Decoded `proofValue` of a derived proof.
///
/// Wire form, big endian: `u16 total ‖ u16 revealed ‖ u16[revealed]
/// indices ‖ proof bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedProofValue {
    /// Number of messages the original signature covers.
    pub total: usize,
    /// Revealed message positions, ascending.
    pub indices: Vec<usize>,
    /// BBS+ proof of knowledge.
    pub proof: Vec<u8>,
}

impl DerivedProofValue {
    /// Serialize to the wire form.
    pub fn encode(&self) -> Result<Vec<u8>, VcError> {
        let mut out = Vec::with_capacity(4 + 2 * self.indices.len() + self.proof.len());
        out.extend_from_slice(&narrow(self.total)?.to_be_bytes());
        out.extend_from_slice(&narrow(self.indices.len())?.to_be_bytes());
        for &i in &self.indices {
            out.extend_from_slice(&narrow(i)?.to_be_bytes());
        }
        out.extend_from_slice(&self.proof);
        Ok(out)
    }

    /// Parse the wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, VcError> {
        let truncated = || VcError::InvalidProof("derived proof value is truncated".into());
        let read_u16 = |at: usize| -> Result<usize, VcError> {
            let pair = bytes.get(at..at + 2).ok_or_else(truncated)?;
            Ok(usize::from(u16::from_be_bytes([pair[0], pair[1]])))
        };
        let total = read_u16(0)?;
        let revealed = read_u16(2)?;
        let indices = (0..revealed)
            .map(|k| read_u16(4 + 2 * k))
            .collect::<Result<Vec<_>, _>>()?;
        let proof = bytes
            .get(4 + 2 * revealed..)
            .filter(|rest| !rest.is_empty())
            .ok_or_else(truncated)?
            .to_vec();
        if indices.windows(2).any(|w| w[0] >= w[1]) || indices.iter().any(|&i| i >= total) {
            return Err(VcError::InvalidProof(
                "derived proof indices are not ascending within range".into(),
            ));
        }
        Ok(Self {
            total,
            indices,
            proof,
        })
    }
}

fn narrow(n: usize) -> Result<u16, VcError> {
    u16::try_from(n)
        .map_err(|_| VcError::UnsupportedDerivation(format!("{n} exceeds the message limit")))
}

/// Presentation header of the proof of knowledge: the signed message
/// count followed by the nonce. The count travels in the clear in the
/// proof value, so it has to be covered by the proof itself.
fn presentation_header(total: usize, nonce: &[u8]) -> Result<Vec<u8>, VcError> {
    let mut header = Vec::with_capacity(2 + nonce.len());
    header.extend_from_slice(&narrow(total)?.to_be_bytes());
    header.extend_from_slice(nonce);
    Ok(header)
}

/// Derive a selectively disclosed credential from `document`.
///
/// The source signature is verified before anything is derived. `nonce`
/// binds the proof; uniqueness is up to the caller.
pub fn derive_credential(
    document: &Value,
    frame: &Frame,
    nonce: &[u8],
    fetcher: &dyn PublicKeyFetcher,
    loader: &dyn DocumentLoader,
    canonicalizer: &dyn Canonicalizer,
) -> Result<Value, VcError> {
    let source = bbs_source_proof(document)?;
    let key = fetcher.fetch(&source.verification_method)?;
    let suite = SignatureSuite::BbsBlsSignature2020;

    let config = canonical_proof_config(
        source.config()?,
        document.get("@context"),
        canonicalizer,
        loader,
    )?;
    let full = canonicalize_for_verification(document, canonicalizer, loader)?;
    let verify_data = suite.create_verify_data(&config, &full);
    suite.verify(&source, &verify_data, &key)?;

    let skolemized = canonicalizer.skolemize(document, loader)?;
    let mut derived = frame.apply(&skolemized)?;
    let revealed = canonicalizer.canonicalize(&derived, loader)?.deskolemize();
    let indices = revealed_indices(&config, &full, &revealed)?;

    let invalid = |e: vcs_crypto::CryptoError| VcError::InvalidProof(e.to_string());
    let public_key = key.to_bbs().map_err(invalid)?;
    let signature = BbsSignature::from_slice(&decode_base64(
        source.proof_value.as_deref().unwrap_or_default(),
    )?)
    .map_err(invalid)?;
    let messages = text_to_lines(&verify_data);
    let header = presentation_header(messages.len(), nonce)?;
    let pok = bbs_create_proof(&public_key, &signature, &messages, &indices, &header)
        .map_err(VcError::signing("derive proof"))?;

    let proof_value = DerivedProofValue {
        total: messages.len(),
        indices,
        proof: pok.as_bytes().to_vec(),
    }
    .encode()?;
    let derived_proof = Proof {
        proof_type: ProofType::BbsBlsSignatureProof2020,
        nonce: Some(STANDARD.encode(nonce)),
        proof_value: Some(STANDARD.encode(proof_value)),
        jws: None,
        ..source
    };

    debug!(
        revealed = revealed.len(),
        total = full.len(),
        "derived selective disclosure proof"
    );

    let proof_json = serde_json::to_value(&derived_proof)
        .map_err(|e| VcError::Parse(format!("serialize proof: {e}")))?;
    if let Some(obj) = derived.as_object_mut() {
        obj.insert("proof".into(), proof_json);
    }
    Ok(derived)
}

/// Verify a `BbsBlsSignatureProof2020` proof against the statements of
/// the derived document.
pub fn verify_derived_proof(
    proof: &Proof,
    document_data: &Dataset,
    document_context: Option<&Value>,
    key: &PublicKey,
    loader: &dyn DocumentLoader,
    canonicalizer: &dyn Canonicalizer,
) -> Result<(), VcError> {
    let invalid = |e: vcs_crypto::CryptoError| VcError::InvalidProof(e.to_string());
    let nonce = decode_base64(
        proof
            .nonce
            .as_deref()
            .ok_or_else(|| VcError::InvalidProof("derived proof has no nonce".into()))?,
    )?;
    let value = DerivedProofValue::decode(&decode_base64(
        proof
            .proof_value
            .as_deref()
            .ok_or_else(|| VcError::InvalidProof("derived proof has no proofValue".into()))?,
    )?)?;

    let original = Proof {
        proof_type: ProofType::BbsBlsSignature2020,
        ..proof.clone()
    };
    let config = canonical_proof_config(original.config()?, document_context, canonicalizer, loader)
        .map_err(|e| VcError::InvalidProof(e.to_string()))?;

    let mut disclosed: Vec<Vec<u8>> = config
        .statements()
        .iter()
        .map(|s| s.as_bytes().to_vec())
        .collect();
    disclosed.extend(
        document_data
            .deskolemize()
            .statements()
            .iter()
            .map(|s| s.as_bytes().to_vec()),
    );
    if disclosed.len() != value.indices.len() {
        return Err(VcError::InvalidProof(format!(
            "derived proof reveals {} messages, document has {}",
            value.indices.len(),
            disclosed.len()
        )));
    }

    let public_key = key.to_bbs().map_err(invalid)?;
    let header = presentation_header(value.total, &nonce)?;
    bbs_verify_proof(
        &public_key,
        &BbsProof::from_bytes(value.proof),
        &disclosed,
        &value.indices,
        &header,
    )
    .map_err(invalid)
}

fn bbs_source_proof(document: &Value) -> Result<Proof, VcError> {
    let candidate = document_proofs(document)
        .into_iter()
        .find(|p| p.get("type").and_then(Value::as_str) == Some(ProofType::BbsBlsSignature2020.as_str()))
        .ok_or_else(|| {
            VcError::UnsupportedDerivation(
                "document has no BbsBlsSignature2020 proof to derive from".into(),
            )
        })?;
    Proof::from_value(candidate)
}

/// Message positions revealed by `revealed`: every proof-configuration
/// statement, then each revealed document statement's position in the
/// full document offset by the configuration length.
fn revealed_indices(config: &Dataset, full: &Dataset, revealed: &Dataset) -> Result<Vec<usize>, VcError> {
    let mut indices: Vec<usize> = (0..config.len()).collect();
    for statement in revealed.statements() {
        let position = full.position(statement).ok_or_else(|| {
            VcError::InvalidFrame(format!("framed statement was not signed: {statement}"))
        })?;
        indices.push(config.len() + position);
    }
    indices.sort_unstable();
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_value_wire_form() {
        let value = DerivedProofValue {
            total: 5,
            indices: vec![0, 2, 4],
            proof: vec![0xaa, 0xbb],
        };
        let bytes = value.encode().unwrap();
        assert_eq!(bytes, vec![0, 5, 0, 3, 0, 0, 0, 2, 0, 4, 0xaa, 0xbb]);
        assert_eq!(DerivedProofValue::decode(&bytes).unwrap(), value);
    }

    #[test]
    fn truncated_value_is_invalid() {
        for bytes in [&[][..], &[0, 3][..], &[0, 3, 0, 2, 0, 1][..], &[0, 3, 0, 1, 0, 1][..]] {
            assert!(matches!(
                DerivedProofValue::decode(bytes),
                Err(VcError::InvalidProof(_))
            ));
        }
    }

    #[test]
    fn unordered_or_out_of_range_indices_are_invalid() {
        let descending = [0, 4, 0, 2, 0, 3, 0, 1, 0xff];
        let out_of_range = [0, 2, 0, 1, 0, 7, 0xff];
        assert!(DerivedProofValue::decode(&descending).is_err());
        assert!(DerivedProofValue::decode(&out_of_range).is_err());
    }

    #[test]
    fn presentation_header_leads_with_message_count() {
        assert_eq!(
            presentation_header(258, b"n0").unwrap(),
            vec![1, 2, b'n', b'0']
        );
        assert_ne!(
            presentation_header(10, b"n0").unwrap(),
            presentation_header(11, b"n0").unwrap()
        );
        assert!(matches!(
            presentation_header(70_000, b""),
            Err(VcError::UnsupportedDerivation(_))
        ));
    }

    #[test]
    fn indices_reveal_config_and_framed_statements() {
        let config = Dataset::from_statements(vec!["c1 .".into(), "c2 .".into()]);
        let full = Dataset::from_statements(vec!["a .".into(), "b .".into(), "c .".into()]);
        let revealed = Dataset::from_statements(vec!["c .".into(), "a .".into()]);
        assert_eq!(
            revealed_indices(&config, &full, &revealed).unwrap(),
            vec![0, 1, 2, 4]
        );
    }

    #[test]
    fn unsigned_statement_is_invalid_frame() {
        let config = Dataset::from_statements(vec!["c1 .".into()]);
        let full = Dataset::from_statements(vec!["a .".into()]);
        let revealed = Dataset::from_statements(vec!["z .".into()]);
        assert!(matches!(
            revealed_indices(&config, &full, &revealed),
            Err(VcError::InvalidFrame(_))
        ));
    }

    #[test]
    fn non_bbs_document_is_unsupported() {
        let doc = serde_json::json!({
            "proof": {"type": "Ed25519Signature2018"}
        });
        assert!(matches!(
            bbs_source_proof(&doc),
            Err(VcError::UnsupportedDerivation(_))
        ));
        assert!(matches!(
            bbs_source_proof(&serde_json::json!({})),
            Err(VcError::UnsupportedDerivation(_))
        ));
    }
}
