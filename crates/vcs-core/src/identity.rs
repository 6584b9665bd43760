//! # Identity Newtypes
//!
//! [`Did`] is a validated W3C Decentralized Identifier (`did:method:id`).
//! [`DidUrl`] is a DID plus an optional fragment, which is how verification
//! methods are referenced (`did:example:123#key1`).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// URI scheme prefix shared by every DID and DID URL.
pub const DID_SCHEME_PREFIX: &str = "did:";

/// Returns `true` if the string is a fully-qualified DID or DID URL.
///
/// This is a prefix check only; it is the test used to decide whether a bare
/// verification-method id must be qualified with the document subject.
pub fn is_did(value: &str) -> bool {
    value.starts_with(DID_SCHEME_PREFIX)
}

/// A W3C Decentralized Identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Create a DID from a string, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDid`] if the string does not
    /// match the `did:method:identifier` format.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        let rest = s
            .strip_prefix(DID_SCHEME_PREFIX)
            .ok_or_else(|| ValidationError::InvalidDid(s.to_string()))?;

        let (method, identifier) = rest
            .split_once(':')
            .ok_or_else(|| ValidationError::InvalidDid(s.to_string()))?;

        if method.is_empty()
            || !method
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidDid(s.to_string()));
        }

        if identifier.is_empty() || identifier.contains(&['#', '?', '/'][..]) {
            return Err(ValidationError::InvalidDid(s.to_string()));
        }

        Ok(())
    }

    /// Access the DID string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the DID method (the part between the first and second colons).
    pub fn method(&self) -> &str {
        self.0[DID_SCHEME_PREFIX.len()..]
            .split_once(':')
            .map(|(m, _)| m)
            .unwrap_or_default()
    }

    /// Return the method-specific identifier (everything after `did:method:`).
    pub fn method_specific_id(&self) -> &str {
        self.0[DID_SCHEME_PREFIX.len()..]
            .split_once(':')
            .map(|(_, id)| id)
            .unwrap_or_default()
    }
}

impl TryFrom<String> for Did {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A DID URL: a DID, optionally followed by a path/query and a fragment.
///
/// Only the DID and fragment parts are kept; path and query components are
/// not used for verification-method references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DidUrl {
    did: Did,
    fragment: Option<String>,
}

impl DidUrl {
    /// Parse a DID URL such as `did:example:123#key1`.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let (base, fragment) = match value.split_once('#') {
            Some((base, frag)) => {
                if frag.is_empty() || frag.contains('#') {
                    return Err(ValidationError::InvalidDidUrl(value.to_string()));
                }
                (base, Some(frag.to_string()))
            }
            None => (value, None),
        };
        let base = base
            .split_once(&['?', '/'][..])
            .map(|(b, _)| b)
            .unwrap_or(base);
        Ok(Self {
            did: Did::new(base)?,
            fragment,
        })
    }

    /// The DID this URL dereferences against.
    pub fn did(&self) -> &Did {
        &self.did
    }

    /// The fragment, without the leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

impl std::fmt::Display for DidUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.fragment {
            Some(frag) => write!(f, "{}#{}", self.did, frag),
            None => write!(f, "{}", self.did),
        }
    }
}
