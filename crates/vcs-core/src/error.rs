//! # Error Types
//!
//! Validation and canonicalization errors shared by every crate in the
//! workspace. Built with `thiserror`; no `Box<dyn Error>`.

use thiserror::Error;

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// NaN and infinities have no JSON representation.
    #[error("non-finite numbers cannot be canonicalized")]
    NonFiniteNumber,

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for identifier newtypes and timestamps.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// DID does not conform to W3C DID syntax (did:method:identifier).
    #[error("invalid DID format: \"{0}\" (expected did:<method>:<identifier>)")]
    InvalidDid(String),

    /// DID URL has an empty or malformed fragment.
    #[error("invalid DID URL: \"{0}\"")]
    InvalidDidUrl(String),

    /// Timestamp string is not valid RFC 3339.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_did_display() {
        let err = ValidationError::InvalidDid("bad:did".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("bad:did"));
        assert!(msg.contains("did:<method>:<identifier>"));
    }

    #[test]
    fn invalid_timestamp_display() {
        let err = ValidationError::InvalidTimestamp {
            value: "yesterday".to_string(),
            reason: "not RFC 3339".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("yesterday"));
        assert!(msg.contains("not RFC 3339"));
    }

    #[test]
    fn non_finite_display() {
        let msg = format!("{}", CanonicalizationError::NonFiniteNumber);
        assert!(msg.contains("non-finite"));
    }
}
