//! # vcs-vc: Proof Orchestration and Selective Disclosure
//!
//! Issues, proves, verifies and derives W3C verifiable credentials and
//! presentations with linked-data proofs:
//!
//! - **Method resolution** (`method.rs`): which DID key signs for which
//!   proof purpose, including the default-key fallback.
//! - **Suites** (`suite.rs`): `Ed25519Signature2018`,
//!   `JsonWebSignature2020` and `BbsBlsSignature2020`, each carrying its
//!   signing mode.
//! - **Attach / verify / derive** (`attach.rs`, `verify.rs`, `derive.rs`):
//!   proof creation, proof checking, and BBS+ selective disclosure.
//! - **Canonicalization** (`canonize.rs`, `context.rs`, `loader.rs`): the
//!   statement form that proofs sign (URDNA2015 labels via `rdf-canon`),
//!   with the BBS+ vocabulary served locally.
//! - **Engine** (`engine.rs`): the operations exposed to a transport layer.
//!
//! ## Crate Policy
//!
//! - DID resolution, key management and crypto are injected capabilities
//!   (`DidResolver`, `KeyManager`, `Crypto`); in-memory versions exist for
//!   tests and local use.
//! - Private key material never enters this crate; signing goes through
//!   opaque key handles.
//! - No operation retries. Collaborator failures surface as [`VcError`]
//!   with the step that produced them.

#![deny(missing_docs)]

pub mod attach;
pub mod canonize;
pub mod context;
pub mod credential;
pub mod derive;
pub mod did;
pub mod engine;
pub mod error;
pub mod frame;
pub mod loader;
pub mod method;
pub mod models;
pub mod proof;
pub mod signer;
pub mod suite;
pub mod verify;

pub use canonize::{Canonicalizer, Dataset, StatementCanonicalizer};
pub use credential::{Credential, Presentation};
pub use did::{DidDocument, DidResolver, InMemoryDidRegistry, ResolutionError, VerificationRelationship};
pub use engine::Engine;
pub use error::{ErrorClass, VcError};
pub use frame::{Frame, FrameInput};
pub use loader::{CachingDocumentLoader, DocumentLoader};
pub use models::{
    CreateKeySetRequest, DeriveCredentialRequest, DeriveOptions, IssueCredentialRequest, KeySet,
    ProvePresentationRequest, VerifyCredentialRequest, VerifyPresentationRequest,
};
pub use proof::{Proof, ProofOptions, ProofPurpose, ProofType, SignatureRepresentation};
pub use suite::{SignatureSuite, SigningMode};
pub use verify::{DidKeyFetcher, PublicKeyFetcher};
