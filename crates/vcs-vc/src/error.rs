//! # Engine Error Types
//!
//! Every failure of an engine operation is one of the kinds below. None are
//! retried; collaborator failures are wrapped with the step that produced
//! them.

use thiserror::Error;
use vcs_crypto::CryptoError;

/// How a transport layer should classify an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed or unacceptable input from the caller.
    Caller,
    /// A collaborator (DID resolution, key store, crypto backend) failed.
    Dependency,
    /// A proof or frame did not check out.
    Verification,
}

/// Errors from proof orchestration.
#[derive(Error, Debug)]
pub enum VcError {
    /// Malformed input document, options, or context.
    #[error("parse error: {0}")]
    Parse(String),

    /// The DID could not be resolved.
    #[error("failed to resolve DID document of {did}: {reason}")]
    DidResolutionFailed {
        /// The DID (or DID URL) being resolved.
        did: String,
        /// Resolver-reported cause.
        reason: String,
    },

    /// The requested relationship has no corresponding proof purpose.
    #[error("unsupported proof purpose {0}, only authentication or assertionMethod are supported")]
    UnsupportedProofPurpose(String),

    /// An explicit verification method is not listed under the purpose's relationship.
    #[error("unable to find matching '{purpose}' key IDs for verification method {verification_method}")]
    VerificationMethodMismatch {
        /// Proof purpose being resolved.
        purpose: String,
        /// The caller-supplied verification method.
        verification_method: String,
    },

    /// No usable key in the DID document.
    #[error("public key not found: {0}")]
    PublicKeyNotFound(String),

    /// Signature type outside the supported set, or an unsupported combination.
    #[error("signature type unsupported: {0}")]
    UnsupportedSignatureType(String),

    /// The document's proof cannot be used for selective disclosure.
    #[error("unsupported derivation: {0}")]
    UnsupportedDerivation(String),

    /// The key manager does not know the key identifier.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A proof failed to parse or verify.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// The disclosure frame is malformed or selects unsigned content.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// A key-store or crypto backend failure.
    #[error("{step}: {source}")]
    Signing {
        /// Engine step that invoked the collaborator.
        step: &'static str,
        /// Underlying failure.
        #[source]
        source: CryptoError,
    },
}

impl VcError {
    /// Classify this error for status mapping.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Parse(_)
            | Self::UnsupportedProofPurpose(_)
            | Self::VerificationMethodMismatch { .. }
            | Self::PublicKeyNotFound(_)
            | Self::UnsupportedSignatureType(_)
            | Self::UnsupportedDerivation(_)
            | Self::KeyNotFound(_) => ErrorClass::Caller,
            Self::DidResolutionFailed { .. } | Self::Signing { .. } => ErrorClass::Dependency,
            Self::InvalidProof(_) | Self::InvalidFrame(_) => ErrorClass::Verification,
        }
    }

    pub(crate) fn signing(step: &'static str) -> impl FnOnce(CryptoError) -> Self {
        move |source| Self::Signing { step, source }
    }
}

impl From<vcs_core::ValidationError> for VcError {
    fn from(err: vcs_core::ValidationError) -> Self {
        Self::Parse(err.to_string())
    }
}
