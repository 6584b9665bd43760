//! # Canonical Serialization (JCS)
//!
//! [`CanonicalBytes`] is the only construction path for JSON bytes that are
//! signed or digested. The inner `Vec<u8>` is private, so a caller cannot hand
//! raw `serde_json::to_vec()` output to a signer by accident.
//!
//! ## Rules
//!
//! 1. Object keys are sorted lexicographically (by UTF-16 code unit order,
//!    which coincides with byte order for the ASCII keys used in proofs).
//! 2. Compact separators, no insignificant whitespace.
//! 3. Numbers are emitted the way `serde_json` prints them; integral floats
//!    such as `1.0` are emitted as integers, matching RFC 8785.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Canonicalize an already-built JSON value.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        let normalized = normalize(value)?;
        let mut out = Vec::new();
        write_canonical(&normalized, &mut out)?;
        Ok(Self(out))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// View the canonical form as UTF-8 text.
    ///
    /// JCS output is always valid UTF-8 because it is built from `serde_json`
    /// string serialization.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn normalize(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Number(n) => {
            if n.is_f64() {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if !f.is_finite() {
                    return Err(CanonicalizationError::NonFiniteNumber);
                }
                if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                    return Ok(Value::from(f as i64));
                }
            }
            Ok(Value::Number(n))
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k, normalize(v)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(arr) => Ok(Value::Array(
            arr.into_iter().map(normalize).collect::<Result<_, _>>()?,
        )),
        other => Ok(other),
    }
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, key)?;
                out.push(b':');
                if let Some(v) = map.get(key) {
                    write_canonical(v, out)?;
                }
            }
            out.push(b'}');
        }
        Value::Array(arr) => {
            out.push(b'[');
            for (i, v) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(v, out)?;
            }
            out.push(b']');
        }
        scalar => serde_json::to_writer(&mut *out, scalar)?,
    }
    Ok(())
}
