//! # Key Management Capability
//!
//! The engine obtains signing keys only as opaque [`KeyHandle`]s. The
//! [`KeyManager`] trait is the seam where a deployment plugs in its key
//! store; [`InMemoryKeyManager`] is the in-process implementation used by
//! tests and the CLI.
//!
//! ## Security Invariants
//!
//! - A `KeyHandle` exposes no accessor for private material. Only
//!   [`crate::crypto::LocalCrypto`] inside this crate can sign with it.
//! - Exported [`StoredKey`] records zeroize their secret on drop.
//! - `KeyManager` is `Send + Sync`; lookups take a shared read lock.

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::bbs::BbsKeyPair;
use crate::ed25519::Ed25519KeyPair;
use crate::error::CryptoError;
use crate::key::{KeyType, PublicKey};

/// Key material behind a handle.
pub(crate) enum KeyMaterial {
    Ed25519(Ed25519KeyPair),
    Bls12381G2(BbsKeyPair),
}

impl KeyMaterial {
    fn key_type(&self) -> KeyType {
        match self {
            Self::Ed25519(_) => KeyType::Ed25519,
            Self::Bls12381G2(_) => KeyType::Bls12381G2,
        }
    }

    fn public_key(&self) -> PublicKey {
        match self {
            Self::Ed25519(kp) => PublicKey::new(KeyType::Ed25519, kp.public_key().as_bytes().to_vec()),
            Self::Bls12381G2(kp) => {
                PublicKey::new(KeyType::Bls12381G2, kp.public_key().as_bytes().to_vec())
            }
        }
    }
}

/// An opaque reference to a signing key held by a [`KeyManager`].
#[derive(Clone)]
pub struct KeyHandle {
    kid: String,
    pub(crate) material: Arc<KeyMaterial>,
}

impl KeyHandle {
    /// Identifier the key was looked up by.
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Family of the underlying key.
    pub fn key_type(&self) -> KeyType {
        self.material.key_type()
    }

    /// Public half of the underlying key.
    pub fn public_key(&self) -> PublicKey {
        self.material.public_key()
    }
}

impl std::fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHandle")
            .field("kid", &self.kid)
            .field("key_type", &self.key_type())
            .finish()
    }
}

/// Key storage and lookup.
pub trait KeyManager: Send + Sync {
    /// Return a handle for `kid`, or [`CryptoError::KeyNotFound`].
    fn get_handle(&self, kid: &str) -> Result<KeyHandle, CryptoError>;

    /// Create a new key of `key_type` and return its identifier and
    /// raw public key bytes.
    fn create_and_export_public_key(
        &self,
        key_type: KeyType,
    ) -> Result<(String, Vec<u8>), CryptoError>;
}

/// Serializable form of a stored key for file-backed persistence.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredKey {
    /// Key identifier.
    pub kid: String,
    /// Key family.
    pub key_type: KeyType,
    /// base64url secret (Ed25519 seed or BBS+ scalar).
    pub secret: String,
}

impl Drop for StoredKey {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl std::fmt::Debug for StoredKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredKey")
            .field("kid", &self.kid)
            .field("key_type", &self.key_type)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// In-memory key manager.
#[derive(Default)]
pub struct InMemoryKeyManager {
    keys: RwLock<HashMap<String, Arc<KeyMaterial>>>,
}

impl InMemoryKeyManager {
    /// Create an empty key manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an Ed25519 key pair under `kid`, replacing any existing key.
    pub fn insert_ed25519(&self, kid: impl Into<String>, key: Ed25519KeyPair) {
        self.keys
            .write()
            .insert(kid.into(), Arc::new(KeyMaterial::Ed25519(key)));
    }

    /// Insert a BBS+ key pair under `kid`, replacing any existing key.
    pub fn insert_bbs(&self, kid: impl Into<String>, key: BbsKeyPair) {
        self.keys
            .write()
            .insert(kid.into(), Arc::new(KeyMaterial::Bls12381G2(key)));
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    /// Whether the manager holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }

    /// Rebuild a manager from exported records.
    pub fn from_stored(records: &[StoredKey]) -> Result<Self, CryptoError> {
        let manager = Self::new();
        for record in records {
            let secret = Zeroizing::new(
                URL_SAFE_NO_PAD
                    .decode(&record.secret)
                    .map_err(|e| CryptoError::Encoding(format!("key {}: {e}", record.kid)))?,
            );
            match record.key_type {
                KeyType::Ed25519 => {
                    let seed: [u8; 32] = secret.as_slice().try_into().map_err(|_| {
                        CryptoError::InvalidSigningKey(format!(
                            "key {}: Ed25519 seed must be 32 bytes",
                            record.kid
                        ))
                    })?;
                    let seed = Zeroizing::new(seed);
                    manager.insert_ed25519(record.kid.clone(), Ed25519KeyPair::from_seed(&seed));
                }
                KeyType::Bls12381G2 => {
                    manager.insert_bbs(record.kid.clone(), BbsKeyPair::from_secret_bytes(&secret)?);
                }
            }
        }
        Ok(manager)
    }

    /// Export every key for persistence, sorted by identifier.
    pub fn export(&self) -> Vec<StoredKey> {
        let keys = self.keys.read();
        let mut records: Vec<StoredKey> = keys
            .iter()
            .map(|(kid, material)| {
                let secret = match material.as_ref() {
                    KeyMaterial::Ed25519(kp) => URL_SAFE_NO_PAD.encode(kp.seed().as_ref()),
                    KeyMaterial::Bls12381G2(kp) => {
                        URL_SAFE_NO_PAD.encode(kp.secret_bytes().as_slice())
                    }
                };
                StoredKey {
                    kid: kid.clone(),
                    key_type: material.key_type(),
                    secret,
                }
            })
            .collect();
        records.sort_by(|a, b| a.kid.cmp(&b.kid));
        records
    }
}

impl KeyManager for InMemoryKeyManager {
    fn get_handle(&self, kid: &str) -> Result<KeyHandle, CryptoError> {
        let keys = self.keys.read();
        let material = keys
            .get(kid)
            .ok_or_else(|| CryptoError::KeyNotFound(kid.to_string()))?;
        Ok(KeyHandle {
            kid: kid.to_string(),
            material: Arc::clone(material),
        })
    }

    fn create_and_export_public_key(
        &self,
        key_type: KeyType,
    ) -> Result<(String, Vec<u8>), CryptoError> {
        let kid = uuid::Uuid::new_v4().to_string();
        let material = match key_type {
            KeyType::Ed25519 => KeyMaterial::Ed25519(Ed25519KeyPair::generate()),
            KeyType::Bls12381G2 => KeyMaterial::Bls12381G2(BbsKeyPair::generate()?),
        };
        let public = material.public_key().bytes;
        self.keys.write().insert(kid.clone(), Arc::new(material));
        tracing::debug!(kid = %kid, key_type = %key_type, "created key");
        Ok((kid, public))
    }
}

impl std::fmt::Debug for InMemoryKeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKeyManager")
            .field("keys", &self.len())
            .finish()
    }
}
