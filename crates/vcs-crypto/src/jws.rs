//! # Detached JWS (RFC 7797)
//!
//! The JSON Web Signature suite carries its signature as a compact JWS
//! with an empty payload segment: `<header>..<signature>`. The header
//! declares `b64: false`, so the signing input is the ASCII header segment,
//! a `.`, and the raw (unencoded) payload bytes.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Protected header of a detached, unencoded-payload JWS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signature algorithm.
    pub alg: String,
    /// Always `false`: the payload is not base64url-encoded.
    pub b64: bool,
    /// Critical header parameters.
    pub crit: Vec<String>,
}

impl JwsHeader {
    /// The `EdDSA` header used by the JSON Web Signature suite.
    pub fn eddsa() -> Self {
        Self {
            alg: "EdDSA".to_string(),
            b64: false,
            crit: vec!["b64".to_string()],
        }
    }

    /// The base64url-encoded header segment.
    pub fn encode(&self) -> Result<String, CryptoError> {
        let json = serde_json::to_vec(self).map_err(|e| CryptoError::Encoding(e.to_string()))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

/// Build the bytes that are actually signed for a detached JWS.
pub fn signing_input(header_segment: &str, payload: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(header_segment.len() + 1 + payload.len());
    input.extend_from_slice(header_segment.as_bytes());
    input.push(b'.');
    input.extend_from_slice(payload);
    input
}

/// Assemble the compact detached form `<header>..<signature>`.
pub fn encode_detached(header_segment: &str, signature: &[u8]) -> String {
    format!("{header_segment}..{}", URL_SAFE_NO_PAD.encode(signature))
}

/// A parsed detached JWS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedJws {
    /// The header segment exactly as it appeared (needed for the signing input).
    pub header_segment: String,
    /// Decoded protected header.
    pub header: JwsHeader,
    /// Raw signature bytes.
    pub signature: Vec<u8>,
}

impl DetachedJws {
    /// Parse `<header>..<signature>`. A non-empty payload segment is rejected.
    pub fn parse(jws: &str) -> Result<Self, CryptoError> {
        let parts: Vec<&str> = jws.split('.').collect();
        if parts.len() != 3 {
            return Err(CryptoError::Encoding(format!(
                "JWS must have 3 segments, got {}",
                parts.len()
            )));
        }
        if !parts[1].is_empty() {
            return Err(CryptoError::Encoding(
                "JWS payload segment must be empty for a detached signature".into(),
            ));
        }
        let header_json = URL_SAFE_NO_PAD
            .decode(parts[0])
            .map_err(|e| CryptoError::Encoding(format!("JWS header: {e}")))?;
        let header: JwsHeader = serde_json::from_slice(&header_json)
            .map_err(|e| CryptoError::Encoding(format!("JWS header: {e}")))?;
        if header.b64 {
            return Err(CryptoError::Encoding(
                "JWS header must declare b64=false".into(),
            ));
        }
        let signature = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|e| CryptoError::Encoding(format!("JWS signature: {e}")))?;
        Ok(Self {
            header_segment: parts[0].to_string(),
            header,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eddsa_header_shape() {
        let header = JwsHeader::eddsa();
        let json = serde_json::to_value(&header).expect("serialize");
        assert_eq!(json["alg"], "EdDSA");
        assert_eq!(json["b64"], false);
        assert_eq!(json["crit"][0], "b64");
    }

    #[test]
    fn encode_then_parse() {
        let segment = JwsHeader::eddsa().encode().expect("encode");
        let jws = encode_detached(&segment, &[1, 2, 3]);
        assert!(jws.contains(".."));
        let parsed = DetachedJws::parse(&jws).expect("parse");
        assert_eq!(parsed.header, JwsHeader::eddsa());
        assert_eq!(parsed.signature, vec![1, 2, 3]);
        assert_eq!(parsed.header_segment, segment);
    }

    #[test]
    fn signing_input_joins_with_dot() {
        assert_eq!(signing_input("abc", b"xyz"), b"abc.xyz".to_vec());
    }

    #[test]
    fn attached_payload_rejected() {
        let segment = JwsHeader::eddsa().encode().expect("encode");
        let jws = format!("{segment}.cGF5bG9hZA.AAAA");
        assert!(DetachedJws::parse(&jws).is_err());
    }

    #[test]
    fn wrong_segment_count_rejected() {
        assert!(DetachedJws::parse("a.b").is_err());
        assert!(DetachedJws::parse("a..b.c").is_err());
    }

    #[test]
    fn garbage_header_rejected() {
        assert!(DetachedJws::parse("!!!..AAAA").is_err());
    }
}
