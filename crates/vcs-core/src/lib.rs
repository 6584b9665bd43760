#![deny(missing_docs)]

//! # vcs-core: Foundational Types for the Credential Service
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies, only `serde`, `serde_json`, `thiserror` and `chrono`.
//!
//! ## Design Principles
//!
//! 1. **[`CanonicalBytes`] is the sole path to signed JSON.** Anything that is
//!    hashed or signed as JSON (proof headers, literal values) goes through
//!    `CanonicalBytes::new()`, which produces JCS output: sorted keys and
//!    compact separators.
//!
//! 2. **Newtypes for identifiers.** A [`Did`] is validated at construction;
//!    a [`DidUrl`] splits a DID from its fragment so that key references can
//!    never be confused with subject identifiers.
//!
//! 3. **UTC only.** [`Timestamp`] serializes with a `Z` suffix at second
//!    precision, which is what proof `created` values carry.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{is_did, Did, DidUrl, DID_SCHEME_PREFIX};
pub use temporal::Timestamp;
