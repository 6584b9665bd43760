//! # BBS+ Multi-Message Signatures and Selective Disclosure
//!
//! BBS+ signatures let an issuer sign an ordered list of messages with a
//! single signature. A holder can later derive a zero-knowledge proof of
//! knowledge that reveals only a chosen subset of those messages, bound to
//! a verifier-supplied nonce. The verifier checks the proof against the
//! issuer's public key and the revealed messages alone.
//!
//! Backed by `zkryptium` with the BLS12-381 / SHA-256 ciphersuite. The
//! signature header is always empty; the derivation nonce travels as the
//! presentation header of the proof.
//!
//! ## Security Invariant
//!
//! The secret scalar is held in a [`Zeroizing`] buffer and never
//! serialized. [`BbsKeyPair`] has a redacted `Debug` implementation.

use rand_core::{OsRng, RngCore};
use zeroize::Zeroizing;
use zkryptium::bbsplus::keys::{BBSplusPublicKey, BBSplusSecretKey};
use zkryptium::keys::pair::KeyPair;
use zkryptium::schemes::algorithms::BbsBls12381Sha256;
use zkryptium::schemes::generics::{PoKSignature, Signature};

use crate::error::CryptoError;

/// Length of a compressed BLS12-381 G2 public key.
pub const BBS_PUBLIC_KEY_LENGTH: usize = 96;

/// Length of a BBS+ secret scalar.
pub const BBS_SECRET_KEY_LENGTH: usize = 32;

/// Length of a BBS+ signature.
pub const BBS_SIGNATURE_LENGTH: usize = 80;

const KEY_INFO: &[u8] = b"vcs-bbs-key";

/// A BLS12-381 G2 public key used to verify BBS+ signatures and proofs.
#[derive(Clone, PartialEq, Eq)]
pub struct BbsPublicKey([u8; BBS_PUBLIC_KEY_LENGTH]);

/// A BBS+ signature over an ordered list of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BbsSignature {
    bytes: Vec<u8>,
}

/// A BBS+ proof of knowledge of a signature, revealing a subset of the
/// signed messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BbsProof {
    bytes: Vec<u8>,
}

/// A BBS+ key pair for issuers.
pub struct BbsKeyPair {
    secret: Zeroizing<[u8; BBS_SECRET_KEY_LENGTH]>,
    public: BbsPublicKey,
}

impl BbsPublicKey {
    /// Parse a public key from its 96-byte compressed encoding.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; BBS_PUBLIC_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidPublicKey(format!(
                "BLS12-381 G2 public key must be {BBS_PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        // Reject points that are not on the curve up front.
        BBSplusPublicKey::from_bytes(&arr)
            .map_err(|e| CryptoError::InvalidPublicKey(format!("{e:?}")))?;
        Ok(Self(arr))
    }

    /// Return the compressed encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    fn to_zk(&self) -> Result<BBSplusPublicKey, CryptoError> {
        BBSplusPublicKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(format!("{e:?}")))
    }
}

impl std::fmt::Debug for BbsPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.iter().take(4).map(|b| format!("{b:02x}")).collect();
        write!(f, "BbsPublicKey({prefix}...)")
    }
}

impl BbsSignature {
    /// Wrap raw signature bytes, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != BBS_SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignatureLength {
                scheme: "BBS+",
                expected: BBS_SIGNATURE_LENGTH,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Access the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn to_array(&self) -> Result<[u8; BBS_SIGNATURE_LENGTH], CryptoError> {
        self.bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidSignatureLength {
                scheme: "BBS+",
                expected: BBS_SIGNATURE_LENGTH,
                actual: self.bytes.len(),
            })
    }
}

impl BbsProof {
    /// Wrap raw proof bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Access the raw proof bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl BbsKeyPair {
    /// Generate a new key pair from OS randomness.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut ikm = Zeroizing::new([0u8; 32]);
        OsRng.fill_bytes(ikm.as_mut());
        Self::from_ikm(ikm.as_ref())
    }

    /// Derive a key pair deterministically from input key material
    /// (at least 32 bytes).
    pub fn from_ikm(ikm: &[u8]) -> Result<Self, CryptoError> {
        let pair = KeyPair::<BbsBls12381Sha256>::generate(ikm, Some(KEY_INFO), None)
            .map_err(|e| CryptoError::InvalidSigningKey(format!("{e:?}")))?;
        let secret = Zeroizing::new(pair.private_key().to_bytes());
        let public = BbsPublicKey(pair.public_key().to_bytes());
        Ok(Self { secret, public })
    }

    /// Rebuild a key pair from a stored secret scalar.
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, CryptoError> {
        let sk = BBSplusSecretKey::from_bytes(secret)
            .map_err(|e| CryptoError::InvalidSigningKey(format!("{e:?}")))?;
        let public = BbsPublicKey(sk.public_key().to_bytes());
        Ok(Self {
            secret: Zeroizing::new(sk.to_bytes()),
            public,
        })
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> &BbsPublicKey {
        &self.public
    }

    /// Export the secret scalar for persistence by a key store.
    pub fn secret_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.secret.to_vec())
    }

    fn secret_key(&self) -> Result<BBSplusSecretKey, CryptoError> {
        BBSplusSecretKey::from_bytes(self.secret.as_ref())
            .map_err(|e| CryptoError::InvalidSigningKey(format!("{e:?}")))
    }
}

impl std::fmt::Debug for BbsKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BbsKeyPair(<private>)")
    }
}

/// Sign an ordered list of messages with BBS+.
pub fn bbs_sign(key: &BbsKeyPair, messages: &[Vec<u8>]) -> Result<BbsSignature, CryptoError> {
    let sk = key.secret_key()?;
    let pk = key.public.to_zk()?;
    let signature = Signature::<BbsBls12381Sha256>::sign(Some(messages), &sk, &pk, None)
        .map_err(|e| CryptoError::Bbs(format!("sign: {e:?}")))?;
    Ok(BbsSignature {
        bytes: signature.to_bytes().to_vec(),
    })
}

/// Verify a BBS+ signature over the full ordered message list.
pub fn bbs_verify(
    public_key: &BbsPublicKey,
    signature: &BbsSignature,
    messages: &[Vec<u8>],
) -> Result<(), CryptoError> {
    let pk = public_key.to_zk()?;
    let sig = Signature::<BbsBls12381Sha256>::from_bytes(&signature.to_array()?)
        .map_err(|e| CryptoError::VerificationFailed(format!("BBS+ signature: {e:?}")))?;
    sig.verify(&pk, Some(messages), None)
        .map_err(|e| CryptoError::VerificationFailed(format!("BBS+: {e:?}")))
}

/// Create a selective-disclosure proof from a BBS+ signature.
///
/// `messages` is the complete signed list. `disclosed_indices` must be
/// sorted ascending; the proof reveals exactly those positions and is
/// bound to `nonce`.
pub fn bbs_create_proof(
    public_key: &BbsPublicKey,
    signature: &BbsSignature,
    messages: &[Vec<u8>],
    disclosed_indices: &[usize],
    nonce: &[u8],
) -> Result<BbsProof, CryptoError> {
    if let Some(&bad) = disclosed_indices.iter().find(|&&i| i >= messages.len()) {
        return Err(CryptoError::Bbs(format!(
            "disclosed index {bad} out of range for {} messages",
            messages.len()
        )));
    }
    let pk = public_key.to_zk()?;
    let sig = signature.to_array()?;
    let proof = PoKSignature::<BbsBls12381Sha256>::proof_gen(
        &pk,
        &sig,
        None,
        Some(nonce),
        Some(messages),
        Some(disclosed_indices),
    )
    .map_err(|e| CryptoError::Bbs(format!("proof generation: {e:?}")))?;
    Ok(BbsProof {
        bytes: proof.to_bytes(),
    })
}

/// Verify a selective-disclosure proof against the revealed messages.
pub fn bbs_verify_proof(
    public_key: &BbsPublicKey,
    proof: &BbsProof,
    disclosed_messages: &[Vec<u8>],
    disclosed_indices: &[usize],
    nonce: &[u8],
) -> Result<(), CryptoError> {
    if disclosed_messages.len() != disclosed_indices.len() {
        return Err(CryptoError::VerificationFailed(format!(
            "BBS+ proof: {} disclosed messages for {} indices",
            disclosed_messages.len(),
            disclosed_indices.len()
        )));
    }
    let pk = public_key.to_zk()?;
    let pok = PoKSignature::<BbsBls12381Sha256>::from_bytes(&proof.bytes)
        .map_err(|e| CryptoError::VerificationFailed(format!("BBS+ proof: {e:?}")))?;
    pok.proof_verify(
        &pk,
        Some(disclosed_messages),
        Some(disclosed_indices),
        None,
        Some(nonce),
    )
    .map_err(|e| CryptoError::VerificationFailed(format!("BBS+ proof: {e:?}")))
}
