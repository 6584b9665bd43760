//! # Cryptographic Error Types
//!
//! Structured errors for key management and signature operations.

use thiserror::Error;

/// Errors from key management and cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature or proof verification failed.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// Signature bytes have the wrong length for the scheme.
    #[error("invalid {scheme} signature length: expected {expected} bytes, got {actual}")]
    InvalidSignatureLength {
        /// Signature scheme name.
        scheme: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// Public key bytes could not be parsed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Private key material could not be parsed or generated.
    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    /// The key manager has no key under this identifier.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The key type is unknown or cannot perform the requested operation.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// Base64 / base58 / JWS decoding error.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// BBS+ signing or proof generation failed.
    #[error("BBS+ error: {0}")]
    Bbs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_length_display() {
        let err = CryptoError::InvalidSignatureLength {
            scheme: "Ed25519",
            expected: 64,
            actual: 32,
        };
        let msg = format!("{err}");
        assert!(msg.contains("Ed25519"));
        assert!(msg.contains("64"));
        assert!(msg.contains("32"));
    }

    #[test]
    fn key_not_found_display() {
        let err = CryptoError::KeyNotFound("key1".to_string());
        assert_eq!(format!("{err}"), "key not found: key1");
    }

    #[test]
    fn all_variants_are_debug() {
        let variants = vec![
            CryptoError::VerificationFailed("a".into()),
            CryptoError::InvalidPublicKey("b".into()),
            CryptoError::InvalidSigningKey("c".into()),
            CryptoError::KeyNotFound("d".into()),
            CryptoError::UnsupportedKeyType("e".into()),
            CryptoError::Encoding("f".into()),
            CryptoError::Bbs("g".into()),
        ];
        for v in variants {
            assert!(!format!("{v:?}").is_empty());
        }
    }
}
