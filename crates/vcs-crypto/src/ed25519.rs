//! # Ed25519
//!
//! Keys and signatures for the `Ed25519Signature2018` and
//! `JsonWebSignature2020` suites. Verification is strict: small-order keys
//! and non-canonical signature scalars are rejected, so a proof value
//! cannot be altered into another encoding that still verifies.
//!
//! [`Ed25519KeyPair`] is not `Serialize` and its `Debug` output is
//! redacted. The seed leaves this module only wrapped in `Zeroizing`.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use rand_core::OsRng;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Length of an Ed25519 public key.
pub const ED25519_PUBLIC_KEY_LENGTH: usize = 32;

/// Length of an Ed25519 signature.
pub const ED25519_SIGNATURE_LENGTH: usize = 64;

/// Raw Ed25519 verification key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; ED25519_PUBLIC_KEY_LENGTH]);

/// Raw Ed25519 signature `R ‖ S`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; ED25519_SIGNATURE_LENGTH]);

/// Issuer-side Ed25519 signing key.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519PublicKey {
    /// Key bytes from DID-document key material. Only the length is
    /// checked here; curve validity is checked on verification.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        bytes.try_into().map(Self).map_err(|_| {
            CryptoError::InvalidPublicKey(format!(
                "Ed25519 public key must be {ED25519_PUBLIC_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; ED25519_PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Check `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let key = VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(format!("Ed25519 point: {e}")))?;
        key.verify_strict(message, &ed25519_dalek::Signature::from_bytes(&signature.0))
            .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519: {e}")))
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({}...)", short_hex(&self.0))
    }
}

impl Ed25519Signature {
    /// Signature bytes decoded from a proof value or JWS segment.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| CryptoError::InvalidSignatureLength {
                scheme: "Ed25519",
                expected: ED25519_SIGNATURE_LENGTH,
                actual: bytes.len(),
            })
    }

    /// The raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; ED25519_SIGNATURE_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519Signature({}...)", short_hex(&self.0))
    }
}

impl Ed25519KeyPair {
    /// Fresh key from OS randomness.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic key from a stored 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The seed, for a key store to persist.
    pub fn seed(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// The matching verification key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign `message` as is; callers hash or frame it first.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Ed25519KeyPair(<private>)")
    }
}

fn short_hex(bytes: &[u8]) -> String {
    bytes[..4].iter().map(|b| format!("{b:02x}")).collect()
}
