//! # vcs-crypto: Key Management and Cryptographic Operations
//!
//! The proof engine never touches private key material. It asks a
//! [`KeyManager`] for an opaque [`KeyHandle`] and hands that handle to a
//! [`Crypto`] implementation together with the bytes (or message lines) to
//! sign. This crate provides both capabilities plus the primitives behind
//! them:
//!
//! - **Ed25519** single-message signatures (`ed25519-dalek`).
//! - **BBS+ over BLS12-381** multi-message signatures and
//!   selective-disclosure proofs of knowledge (`zkryptium`).
//! - **Detached JWS** (`b64: false`) encoding helpers for the JSON Web
//!   Signature suite.
//! - **Public key material** parsing shared by verification paths.
//!
//! [`InMemoryKeyManager`] and [`LocalCrypto`] are the in-process
//! implementations; deployments swap in their own key-store backed manager.

pub mod bbs;
pub mod crypto;
pub mod ed25519;
pub mod error;
pub mod jws;
pub mod key;
pub mod key_manager;

pub use bbs::{BbsKeyPair, BbsProof, BbsPublicKey, BbsSignature};
pub use crypto::{Crypto, LocalCrypto};
pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
pub use key::{KeyType, PublicKey};
pub use key_manager::{InMemoryKeyManager, KeyHandle, KeyManager, StoredKey};
