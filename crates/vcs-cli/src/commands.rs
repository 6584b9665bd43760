//! # Subcommands
//!
//! Every document command reads a request file in the service payload
//! shape (`{"credential": ..., "options": ...}` and so on) and writes the
//! resulting document as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use vcs_crypto::{InMemoryKeyManager, LocalCrypto};
use vcs_vc::{
    CreateKeySetRequest, DeriveCredentialRequest, Engine, ErrorClass, IssueCredentialRequest,
    ProofOptions, ProvePresentationRequest, VcError, VerifyCredentialRequest,
    VerifyPresentationRequest,
};

use crate::config::CliConfig;
use crate::store::{load_keys, save_keys, FileDidRegistry};

/// Document operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Issue a credential from an `IssueCredentialRequest` file.
    Issue(RequestArgs),
    /// Verify a credential from a `VerifyCredentialRequest` file.
    VerifyCredential(RequestArgs),
    /// Derive a selectively disclosed credential from a `DeriveCredentialRequest` file.
    Derive(RequestArgs),
    /// Prove a presentation from a `ProvePresentationRequest` file.
    Prove(RequestArgs),
    /// Verify a presentation from a `VerifyPresentationRequest` file.
    VerifyPresentation(RequestArgs),
    /// Create a key in the key store.
    CreateKeySet(CreateKeySetArgs),
    /// Add a DID document to the registry directory.
    RegisterDid(RegisterDidArgs),
}

/// A request file and an optional output path.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Request JSON file.
    pub request: PathBuf,

    /// Write the result here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Arguments for `create-key-set`.
#[derive(Args, Debug)]
pub struct CreateKeySetArgs {
    /// `ED25519` or `BLS12381G2`.
    #[arg(long)]
    pub key_type: String,
}

/// Arguments for `register-did`.
#[derive(Args, Debug)]
pub struct RegisterDidArgs {
    /// DID document JSON file.
    pub document: PathBuf,
}

/// Engine plus the key store backing it, so new keys can be persisted.
pub struct Session {
    /// The engine.
    pub engine: Engine,
    /// Key store shared with the engine.
    pub keys: Arc<InMemoryKeyManager>,
    /// Configuration in effect.
    pub config: CliConfig,
}

impl Session {
    /// Open the stores named by `config`.
    pub fn open(config: CliConfig) -> Result<Self> {
        let keys = Arc::new(load_keys(&config.key_store)?);
        let registry = Arc::new(FileDidRegistry::new(&config.did_dir));
        let engine = Engine::new(registry, keys.clone(), Arc::new(LocalCrypto))
            .context("failed to initialize engine")?;
        Ok(Self {
            engine,
            keys,
            config,
        })
    }

    fn options(&self, options: Option<ProofOptions>) -> ProofOptions {
        let mut options = options.unwrap_or_default();
        if options.signature_type.is_empty() {
            options.signature_type = self.config.default_signature_type.clone();
        }
        options
    }
}

/// Run `command`, returning the process exit code.
pub fn run(command: &Command, session: &Session) -> Result<u8> {
    match command {
        Command::Issue(args) => {
            let req: IssueCredentialRequest = read_request(&args.request)?;
            let vc = session
                .engine
                .issue_credential(&req.credential, &session.options(req.options))
                .context("issue credential")?;
            write_output(&vc, args.output.as_deref())?;
            Ok(0)
        }
        Command::VerifyCredential(args) => {
            let req: VerifyCredentialRequest = read_request(&args.request)?;
            report_verification(session.engine.verify_credential(&req.verifiable_credential), args)
        }
        Command::Derive(args) => {
            let req: DeriveCredentialRequest = read_request(&args.request)?;
            let vc = session
                .engine
                .derive_credential(&req.verifiable_credential, req.frame, req.options.as_ref())
                .context("derive credential")?;
            write_output(&vc, args.output.as_deref())?;
            Ok(0)
        }
        Command::Prove(args) => {
            let req: ProvePresentationRequest = read_request(&args.request)?;
            let vp = session
                .engine
                .prove_presentation(&req.presentation, &session.options(req.options))
                .context("prove presentation")?;
            write_output(&vp, args.output.as_deref())?;
            Ok(0)
        }
        Command::VerifyPresentation(args) => {
            let req: VerifyPresentationRequest = read_request(&args.request)?;
            report_verification(
                session.engine.verify_presentation(&req.verifiable_presentation),
                args,
            )
        }
        Command::CreateKeySet(args) => {
            let req = CreateKeySetRequest {
                key_type: args.key_type.clone(),
            };
            let key_set = session
                .engine
                .create_key_set(&req.key_type)
                .context("create key set")?;
            save_keys(&session.keys, &session.config.key_store)?;
            write_output(&serde_json::to_value(&key_set)?, None)?;
            Ok(0)
        }
        Command::RegisterDid(args) => {
            let document: Value = read_request(&args.document)?;
            let path = FileDidRegistry::new(&session.config.did_dir).register(document)?;
            tracing::info!(path = %path.display(), "DID document registered");
            Ok(0)
        }
    }
}

/// A failed check is reported, not raised: exit code 1 with the reason.
fn report_verification(result: Result<(), VcError>, args: &RequestArgs) -> Result<u8> {
    match result {
        Ok(()) => {
            write_output(&json!({"verified": true}), args.output.as_deref())?;
            Ok(0)
        }
        Err(e) if e.class() == ErrorClass::Verification => {
            write_output(
                &json!({"verified": false, "error": e.to_string()}),
                args.output.as_deref(),
            )?;
            Ok(1)
        }
        Err(e) => Err(e).context("verification could not run"),
    }
}

fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_output(value: &Value, output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, text + "\n")
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcs_crypto::{KeyManager, KeyType};

    struct Workspace {
        dir: tempfile::TempDir,
        session: Session,
    }

    fn workspace() -> Workspace {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            did_dir: dir.path().join("dids"),
            key_store: dir.path().join("keys.json"),
            ..CliConfig::default()
        };
        let session = Session::open(config).unwrap();
        Workspace { dir, session }
    }

    fn write(ws: &Workspace, name: &str, value: &Value) -> PathBuf {
        let path = ws.dir.path().join(name);
        std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    fn register_issuer(ws: &Workspace) {
        let key_set = ws.session.engine.create_key_set("ED25519").unwrap();
        save_keys(&ws.session.keys, &ws.session.config.key_store).unwrap();
        let pk = ws.session.keys.get_handle(&key_set.key_id).unwrap().public_key();
        assert_eq!(pk.key_type, KeyType::Ed25519);
        let doc = json!({
            "id": "did:example:issuer",
            "verificationMethod": [{
                "id": format!("#{}", key_set.key_id),
                "type": "Ed25519VerificationKey2018",
                "controller": "did:example:issuer",
                "publicKeyBase58": pk.to_base58()
            }],
            "assertionMethod": [format!("#{}", key_set.key_id)]
        });
        let path = write(ws, "did.json", &doc);
        run(&Command::RegisterDid(RegisterDidArgs { document: path }), &ws.session).unwrap();
    }

    #[test]
    fn issue_and_verify_through_request_files() {
        let ws = workspace();
        register_issuer(&ws);
        let request = write(
            &ws,
            "issue.json",
            &json!({
                "credential": {
                    "@context": ["https://www.w3.org/2018/credentials/v1"],
                    "type": ["VerifiableCredential"],
                    "issuer": "did:example:issuer",
                    "issuanceDate": "2021-01-01T00:00:00Z",
                    "credentialSubject": {"id": "did:example:holder"}
                }
            }),
        );
        let signed_path = ws.dir.path().join("signed.json");
        let code = run(
            &Command::Issue(RequestArgs {
                request,
                output: Some(signed_path.clone()),
            }),
            &ws.session,
        )
        .unwrap();
        assert_eq!(code, 0);
        let signed = read(&signed_path);
        assert_eq!(signed["proof"]["type"], "Ed25519Signature2018");

        let verify = write(&ws, "verify.json", &json!({"verifiableCredential": signed}));
        let result_path = ws.dir.path().join("result.json");
        let args = RequestArgs {
            request: verify,
            output: Some(result_path.clone()),
        };
        assert_eq!(run(&Command::VerifyCredential(args), &ws.session).unwrap(), 0);
        assert_eq!(read(&result_path)["verified"], true);

        let mut tampered = signed.clone();
        tampered["issuanceDate"] = json!("2022-01-01T00:00:00Z");
        let verify = write(&ws, "verify2.json", &json!({"verifiableCredential": tampered}));
        let args = RequestArgs {
            request: verify,
            output: Some(result_path.clone()),
        };
        assert_eq!(run(&Command::VerifyCredential(args), &ws.session).unwrap(), 1);
        assert_eq!(read(&result_path)["verified"], false);
    }

    #[test]
    fn created_keys_are_persisted() {
        let ws = workspace();
        run(
            &Command::CreateKeySet(CreateKeySetArgs {
                key_type: "BLS12381G2".into(),
            }),
            &ws.session,
        )
        .unwrap();
        assert_eq!(load_keys(&ws.session.config.key_store).unwrap().len(), 1);
    }

    #[test]
    fn unknown_key_type_is_an_error() {
        let ws = workspace();
        let err = run(
            &Command::CreateKeySet(CreateKeySetArgs {
                key_type: "P-256".into(),
            }),
            &ws.session,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("invalid key type"));
    }

    #[test]
    fn default_signature_type_fills_options() {
        let ws = workspace();
        assert_eq!(ws.session.options(None).signature_type, "Ed25519Signature2018");
        let explicit = ProofOptions {
            signature_type: "BbsBlsSignature2020".into(),
            ..ProofOptions::default()
        };
        assert_eq!(
            ws.session.options(Some(explicit)).signature_type,
            "BbsBlsSignature2020"
        );
    }
}
