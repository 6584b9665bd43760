//! # vcs-cli: Local Harness for the Proof Engine
//!
//! Provides the `vcs` command-line interface over a file-backed DID
//! registry and key store.
//!
//! ## Subcommands
//!
//! - `vcs issue <request.json>`: sign a credential as its issuer.
//! - `vcs verify-credential <request.json>`: check every proof.
//! - `vcs derive <request.json>`: selective disclosure from a BBS+ credential.
//! - `vcs prove <request.json>`: sign a presentation as its holder.
//! - `vcs verify-presentation <request.json>`
//! - `vcs create-key-set --key-type ED25519`
//! - `vcs register-did <did-document.json>`

pub mod commands;
pub mod config;
pub mod store;
