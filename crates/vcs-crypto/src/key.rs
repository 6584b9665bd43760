//! # Key Types and Public Key Material
//!
//! [`KeyType`] names the two key families the service can create and sign
//! with. [`PublicKey`] is the verifier-side view of a key: raw bytes tagged
//! with their family, decoded from any of the encodings a DID document may
//! use (`publicKeyBase58`, `publicKeyMultibase`, `publicKeyJwk`).

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::bbs::{BbsPublicKey, BBS_PUBLIC_KEY_LENGTH};
use crate::ed25519::Ed25519PublicKey;
use crate::error::CryptoError;

/// Multicodec varint prefix for `ed25519-pub`.
const MULTICODEC_ED25519: [u8; 2] = [0xed, 0x01];

/// Multicodec varint prefix for `bls12_381-g2-pub`.
const MULTICODEC_BLS12381_G2: [u8; 2] = [0xeb, 0x01];

/// Supported key families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// Ed25519 (used by Ed25519Signature2018 and JsonWebSignature2020).
    #[serde(rename = "ED25519")]
    Ed25519,
    /// BLS12-381 G2 (used by BbsBlsSignature2020).
    #[serde(rename = "BLS12381G2")]
    Bls12381G2,
}

impl KeyType {
    /// Wire name of the key type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "ED25519",
            Self::Bls12381G2 => "BLS12381G2",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ED25519" => Ok(Self::Ed25519),
            "BLS12381G2" => Ok(Self::Bls12381G2),
            other => Err(CryptoError::UnsupportedKeyType(other.to_string())),
        }
    }
}

/// Public key bytes tagged with their key family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// Key family.
    pub key_type: KeyType,
    /// Raw key bytes (32 for Ed25519, 96 for BLS12-381 G2).
    pub bytes: Vec<u8>,
}

impl PublicKey {
    /// Tag raw bytes with a key type, inferring nothing.
    pub fn new(key_type: KeyType, bytes: Vec<u8>) -> Self {
        Self { key_type, bytes }
    }

    /// Decode a `publicKeyBase58` value. The family is taken from the
    /// verification method type when given, otherwise from the key length.
    pub fn from_base58(encoded: &str, hint: Option<KeyType>) -> Result<Self, CryptoError> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| CryptoError::Encoding(format!("base58: {e}")))?;
        let key_type = match hint {
            Some(kt) => kt,
            None => infer_from_length(bytes.len())?,
        };
        Ok(Self { key_type, bytes })
    }

    /// Decode a `publicKeyMultibase` value (`z` + base58btc). A multicodec
    /// prefix, if present, decides the key family.
    pub fn from_multibase(encoded: &str, hint: Option<KeyType>) -> Result<Self, CryptoError> {
        let rest = encoded.strip_prefix('z').ok_or_else(|| {
            CryptoError::Encoding("only base58btc ('z') multibase is supported".into())
        })?;
        let bytes = bs58::decode(rest)
            .into_vec()
            .map_err(|e| CryptoError::Encoding(format!("multibase: {e}")))?;

        if bytes.len() == 34 && bytes[..2] == MULTICODEC_ED25519 {
            return Ok(Self::new(KeyType::Ed25519, bytes[2..].to_vec()));
        }
        if bytes.len() == BBS_PUBLIC_KEY_LENGTH + 2 && bytes[..2] == MULTICODEC_BLS12381_G2 {
            return Ok(Self::new(KeyType::Bls12381G2, bytes[2..].to_vec()));
        }
        let key_type = match hint {
            Some(kt) => kt,
            None => infer_from_length(bytes.len())?,
        };
        Ok(Self { key_type, bytes })
    }

    /// Decode a `publicKeyJwk` object.
    pub fn from_jwk(jwk: &serde_json::Value) -> Result<Self, CryptoError> {
        let field = |name: &str| jwk.get(name).and_then(|v| v.as_str());
        let kty = field("kty").unwrap_or_default();
        let crv = field("crv").unwrap_or_default();
        let key_type = match (kty, crv) {
            ("OKP", "Ed25519") => KeyType::Ed25519,
            ("EC", "BLS12381_G2") | ("OKP", "Bls12381G2") => KeyType::Bls12381G2,
            _ => {
                return Err(CryptoError::UnsupportedKeyType(format!(
                    "JWK kty={kty} crv={crv}"
                )))
            }
        };
        let x = field("x")
            .ok_or_else(|| CryptoError::InvalidPublicKey("JWK is missing 'x'".into()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(x)
            .map_err(|e| CryptoError::Encoding(format!("JWK x: {e}")))?;
        Ok(Self { key_type, bytes })
    }

    /// Encode as a JWK object.
    pub fn to_jwk(&self) -> serde_json::Value {
        let (kty, crv) = match self.key_type {
            KeyType::Ed25519 => ("OKP", "Ed25519"),
            KeyType::Bls12381G2 => ("EC", "BLS12381_G2"),
        };
        serde_json::json!({
            "kty": kty,
            "crv": crv,
            "x": URL_SAFE_NO_PAD.encode(&self.bytes),
        })
    }

    /// Encode as `publicKeyBase58`.
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    /// Encode as `publicKeyMultibase` with the multicodec prefix.
    pub fn to_multibase(&self) -> String {
        let prefix = match self.key_type {
            KeyType::Ed25519 => MULTICODEC_ED25519,
            KeyType::Bls12381G2 => MULTICODEC_BLS12381_G2,
        };
        let mut buf = prefix.to_vec();
        buf.extend_from_slice(&self.bytes);
        format!("z{}", bs58::encode(buf).into_string())
    }

    /// View as an Ed25519 key, failing for any other family.
    pub fn to_ed25519(&self) -> Result<Ed25519PublicKey, CryptoError> {
        match self.key_type {
            KeyType::Ed25519 => Ed25519PublicKey::from_slice(&self.bytes),
            other => Err(CryptoError::UnsupportedKeyType(format!(
                "expected ED25519 key, got {other}"
            ))),
        }
    }

    /// View as a BLS12-381 G2 key, failing for any other family.
    pub fn to_bbs(&self) -> Result<BbsPublicKey, CryptoError> {
        match self.key_type {
            KeyType::Bls12381G2 => BbsPublicKey::from_slice(&self.bytes),
            other => Err(CryptoError::UnsupportedKeyType(format!(
                "expected BLS12381G2 key, got {other}"
            ))),
        }
    }
}

fn infer_from_length(len: usize) -> Result<KeyType, CryptoError> {
    match len {
        32 => Ok(KeyType::Ed25519),
        BBS_PUBLIC_KEY_LENGTH => Ok(KeyType::Bls12381G2),
        other => Err(CryptoError::InvalidPublicKey(format!(
            "cannot infer key type from {other}-byte key"
        ))),
    }
}
