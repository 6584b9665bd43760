//! # Selective Disclosure
//!
//! A BBS+ signed credential is reduced by a frame into a derived
//! credential carrying a zero-knowledge proof. The derived credential
//! must verify against the issuer key while omitting undisclosed claims.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use vcs_core::Timestamp;
use vcs_crypto::{BbsKeyPair, Ed25519KeyPair, InMemoryKeyManager, KeyManager, LocalCrypto};
use vcs_vc::{
    DeriveOptions, DidDocument, Engine, ErrorClass, InMemoryDidRegistry, ProofOptions, VcError,
};

const ISSUER: &str = "did:example:489398593";

fn engine() -> Engine {
    let keys = Arc::new(InMemoryKeyManager::new());
    keys.insert_bbs("bls", BbsKeyPair::from_ikm(&[21u8; 32]).unwrap());
    keys.insert_ed25519("ed", Ed25519KeyPair::from_seed(&[22u8; 32]));
    let b58 = |kid: &str| keys.get_handle(kid).unwrap().public_key().to_base58();

    let registry = Arc::new(InMemoryDidRegistry::new());
    registry.insert(
        DidDocument::from_json(json!({
            "id": ISSUER,
            "verificationMethod": [
                {"id": format!("{ISSUER}#bls"), "type": "Bls12381G2Key2020", "publicKeyBase58": b58("bls")},
                {"id": format!("{ISSUER}#ed"), "type": "Ed25519VerificationKey2018", "publicKeyBase58": b58("ed")}
            ],
            "assertionMethod": [format!("{ISSUER}#bls"), format!("{ISSUER}#ed")]
        }))
        .unwrap(),
    );
    Engine::new(registry, keys, Arc::new(LocalCrypto)).unwrap()
}

fn credential() -> Value {
    json!({
        "@context": [
            "https://www.w3.org/2018/credentials/v1",
            "https://www.w3.org/2018/credentials/examples/v1",
            "https://w3id.org/security/bbs/v1"
        ],
        "id": "https://issuer.example/credentials/1872",
        "type": ["VerifiableCredential"],
        "issuer": ISSUER,
        "issuanceDate": "2019-12-03T12:19:52Z",
        "credentialSubject": {
            "id": "did:example:b34ca6cd37bbf23",
            "name": "Jayden Doe",
            "birthDate": "1958-07-17"
        }
    })
}

fn sign(engine: &Engine, signature_type: &str, vm: &str) -> Value {
    let options = ProofOptions {
        signature_type: signature_type.into(),
        verification_method: vm.into(),
        created: Some(Timestamp::parse("2020-04-02T18:28:08Z").unwrap()),
        ..ProofOptions::default()
    };
    engine.issue_credential(&credential(), &options).unwrap()
}

fn signed_bbs(engine: &Engine) -> Value {
    sign(engine, "BbsBlsSignature2020", &format!("{ISSUER}#bls"))
}

fn name_frame() -> Value {
    json!({
        "@context": credential()["@context"],
        "type": ["VerifiableCredential"],
        "credentialSubject": {"name": {}}
    })
}

// ---------------------------------------------------------------------------
// 1. Disclosure
// ---------------------------------------------------------------------------

#[test]
fn derived_credential_hides_undisclosed_claims() {
    let engine = engine();
    let signed = signed_bbs(&engine);
    let derived = engine.derive_credential(&signed, name_frame(), None).unwrap();

    let subject = &derived["credentialSubject"];
    assert_eq!(subject["id"], "did:example:b34ca6cd37bbf23");
    assert_eq!(subject["name"], "Jayden Doe");
    assert!(subject.get("birthDate").is_none());
    assert_eq!(derived["issuer"], ISSUER);

    let proof = &derived["proof"];
    assert_eq!(proof["type"], "BbsBlsSignatureProof2020");
    assert_eq!(proof["verificationMethod"], format!("{ISSUER}#bls"));
    assert_eq!(proof["created"], signed["proof"]["created"]);
    assert_eq!(proof["proofPurpose"], "assertionMethod");
    // no options: empty nonce
    assert_eq!(proof["nonce"], "");

    engine.verify_credential(&derived).unwrap();
}

#[test]
fn explicit_nonce_is_recorded() {
    let engine = engine();
    let signed = signed_bbs(&engine);
    let options = DeriveOptions {
        nonce: "lEixQKDQvRecCifKl789TQj+Ii6YWDLSwn3AxR0VpPJ1QV5htod/0VCchVf1zVM0y2E=".into(),
    };
    let derived = engine
        .derive_credential(&signed, name_frame(), Some(&options))
        .unwrap();
    assert_eq!(
        derived["proof"]["nonce"],
        STANDARD.encode(options.nonce.as_bytes())
    );
    engine.verify_credential(&derived).unwrap();
}

#[test]
fn frame_as_json_text_is_accepted() {
    let engine = engine();
    let signed = signed_bbs(&engine);
    let text = name_frame().to_string();
    let derived = engine.derive_credential(&signed, text.as_str(), None).unwrap();
    assert!(derived["credentialSubject"].get("birthDate").is_none());
    engine.verify_credential(&derived).unwrap();
}

#[test]
fn blank_nodes_keep_their_signed_labels() {
    let engine = engine();
    let mut vc = credential();
    vc.as_object_mut().unwrap().remove("id");
    vc["credentialSubject"].as_object_mut().unwrap().remove("id");
    let options = ProofOptions {
        signature_type: "BbsBlsSignature2020".into(),
        verification_method: format!("{ISSUER}#bls"),
        ..ProofOptions::default()
    };
    let signed = engine.issue_credential(&vc, &options).unwrap();
    let derived = engine.derive_credential(&signed, name_frame(), None).unwrap();

    assert!(derived["id"].as_str().unwrap().starts_with("urn:bnid:_:c14n"));
    let subject = &derived["credentialSubject"];
    assert!(subject["id"].as_str().unwrap().starts_with("urn:bnid:_:c14n"));
    assert_eq!(subject["name"], "Jayden Doe");
    assert!(subject.get("birthDate").is_none());
    engine.verify_credential(&derived).unwrap();

    let mut relabelled = derived.clone();
    relabelled["credentialSubject"]["id"] = json!("urn:bnid:_:c14n9");
    assert!(matches!(
        engine.verify_credential(&relabelled),
        Err(VcError::InvalidProof(_))
    ));
}

#[test]
fn two_derivations_are_unlinkable() {
    let engine = engine();
    let signed = signed_bbs(&engine);
    let a = engine.derive_credential(&signed, name_frame(), None).unwrap();
    let b = engine.derive_credential(&signed, name_frame(), None).unwrap();
    assert_ne!(a["proof"]["proofValue"], b["proof"]["proofValue"]);
}

// ---------------------------------------------------------------------------
// 2. Derived proof tampering
// ---------------------------------------------------------------------------

#[test]
fn changed_disclosed_claim_is_invalid() {
    let engine = engine();
    let mut derived = engine
        .derive_credential(&signed_bbs(&engine), name_frame(), None)
        .unwrap();
    derived["credentialSubject"]["name"] = json!("Someone Else");
    let err = engine.verify_credential(&derived).unwrap_err();
    assert!(matches!(err, VcError::InvalidProof(_)));
    assert_eq!(err.class(), ErrorClass::Verification);
}

#[test]
fn reinserted_hidden_claim_is_invalid() {
    let engine = engine();
    let mut derived = engine
        .derive_credential(&signed_bbs(&engine), name_frame(), None)
        .unwrap();
    derived["credentialSubject"]["birthDate"] = json!("1958-07-17");
    assert!(matches!(
        engine.verify_credential(&derived),
        Err(VcError::InvalidProof(_))
    ));
}

#[test]
fn swapped_nonce_is_invalid() {
    let engine = engine();
    let mut derived = engine
        .derive_credential(&signed_bbs(&engine), name_frame(), None)
        .unwrap();
    derived["proof"]["nonce"] = json!(STANDARD.encode([7u8; 32]));
    assert!(matches!(
        engine.verify_credential(&derived),
        Err(VcError::InvalidProof(_))
    ));
}

#[test]
fn any_altered_derived_proof_value_byte_is_invalid() {
    let engine = engine();
    let derived = engine
        .derive_credential(&signed_bbs(&engine), name_frame(), None)
        .unwrap();
    engine.verify_credential(&derived).unwrap();

    let bytes = STANDARD
        .decode(derived["proof"]["proofValue"].as_str().unwrap())
        .unwrap();
    for index in 0..bytes.len() {
        let mut altered = bytes.clone();
        altered[index] ^= 0x80;
        let mut tampered = derived.clone();
        tampered["proof"]["proofValue"] = json!(STANDARD.encode(&altered));
        let err = engine.verify_credential(&tampered).unwrap_err();
        assert!(matches!(err, VcError::InvalidProof(_)), "byte {index}: {err}");
        assert_eq!(err.class(), ErrorClass::Verification);
    }
}

#[test]
fn altered_message_count_is_invalid() {
    let engine = engine();
    let derived = engine
        .derive_credential(&signed_bbs(&engine), name_frame(), None)
        .unwrap();
    let mut bytes = STANDARD
        .decode(derived["proof"]["proofValue"].as_str().unwrap())
        .unwrap();
    let total = u16::from_be_bytes([bytes[0], bytes[1]]);
    bytes[..2].copy_from_slice(&(total + 1).to_be_bytes());

    let mut tampered = derived.clone();
    tampered["proof"]["proofValue"] = json!(STANDARD.encode(&bytes));
    assert!(matches!(
        engine.verify_credential(&tampered),
        Err(VcError::InvalidProof(_))
    ));
}

// ---------------------------------------------------------------------------
// 3. Rejected derivations
// ---------------------------------------------------------------------------

#[test]
fn non_object_frame_is_invalid_frame() {
    let engine = engine();
    let signed = signed_bbs(&engine);
    for frame in [json!([1, 2]), json!(42), json!("not json")] {
        let err = engine.derive_credential(&signed, frame, None).unwrap_err();
        assert!(matches!(err, VcError::InvalidFrame(_)), "{err}");
        assert_eq!(err.class(), ErrorClass::Verification);
    }
}

#[test]
fn ed25519_credential_cannot_be_derived() {
    let engine = engine();
    let signed = sign(&engine, "Ed25519Signature2018", &format!("{ISSUER}#ed"));
    let err = engine.derive_credential(&signed, name_frame(), None).unwrap_err();
    assert!(matches!(err, VcError::UnsupportedDerivation(_)));
}

#[test]
fn unsigned_credential_cannot_be_derived() {
    let engine = engine();
    let err = engine
        .derive_credential(&credential(), name_frame(), None)
        .unwrap_err();
    assert!(matches!(err, VcError::UnsupportedDerivation(_)));
}

#[test]
fn tampered_source_is_rejected_before_deriving() {
    let engine = engine();
    let mut signed = signed_bbs(&engine);
    signed["credentialSubject"]["birthDate"] = json!("2001-01-01");
    assert!(matches!(
        engine.derive_credential(&signed, name_frame(), None),
        Err(VcError::InvalidProof(_))
    ));
}
