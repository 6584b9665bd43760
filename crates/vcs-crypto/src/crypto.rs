//! # Cryptographic Operations Capability
//!
//! Signs with an opaque [`KeyHandle`]. Single-message signing covers the
//! Ed25519 and JSON Web Signature suites; multi-message signing covers the
//! BBS+ suite.

use crate::bbs::bbs_sign;
use crate::error::CryptoError;
use crate::key_manager::{KeyHandle, KeyMaterial};

/// Signing operations over opaque key handles.
pub trait Crypto: Send + Sync {
    /// Sign `message` as a single message.
    fn sign_single(&self, message: &[u8], handle: &KeyHandle) -> Result<Vec<u8>, CryptoError>;

    /// Sign an ordered list of messages with one aggregate signature.
    fn sign_multi(&self, messages: &[Vec<u8>], handle: &KeyHandle)
        -> Result<Vec<u8>, CryptoError>;
}

/// In-process implementation over [`crate::InMemoryKeyManager`] handles.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalCrypto;

impl Crypto for LocalCrypto {
    fn sign_single(&self, message: &[u8], handle: &KeyHandle) -> Result<Vec<u8>, CryptoError> {
        match handle.material.as_ref() {
            KeyMaterial::Ed25519(kp) => Ok(kp.sign(message).as_bytes().to_vec()),
            KeyMaterial::Bls12381G2(_) => Err(CryptoError::UnsupportedKeyType(format!(
                "key {} is BLS12381G2 and cannot produce a single-message signature",
                handle.kid()
            ))),
        }
    }

    fn sign_multi(
        &self,
        messages: &[Vec<u8>],
        handle: &KeyHandle,
    ) -> Result<Vec<u8>, CryptoError> {
        match handle.material.as_ref() {
            KeyMaterial::Bls12381G2(kp) => Ok(bbs_sign(kp, messages)?.as_bytes().to_vec()),
            KeyMaterial::Ed25519(_) => Err(CryptoError::UnsupportedKeyType(format!(
                "key {} is ED25519 and cannot produce a multi-message signature",
                handle.kid()
            ))),
        }
    }
}
