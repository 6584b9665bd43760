//! # Credential and Presentation Documents
//!
//! Documents stay JSON-LD values. These wrappers only check the envelope
//! the engine relies on: an object with `@context`, the right `type`, and
//! an issuer (credentials) or optional holder (presentations).

use serde_json::Value;

use crate::error::VcError;

/// Base type every credential carries.
pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";
/// Base type every presentation carries.
pub const VERIFIABLE_PRESENTATION_TYPE: &str = "VerifiablePresentation";

/// A verifiable credential document.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential(Value);

/// A verifiable presentation document.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation(Value);

fn check_envelope(value: &Value, required_type: &str) -> Result<(), VcError> {
    let obj = value
        .as_object()
        .ok_or_else(|| VcError::Parse("document must be a JSON object".into()))?;
    if !obj.contains_key("@context") {
        return Err(VcError::Parse("document has no @context".into()));
    }
    let has_type = match obj.get("type") {
        Some(Value::String(t)) => t == required_type,
        Some(Value::Array(items)) => items.iter().any(|t| t.as_str() == Some(required_type)),
        _ => false,
    };
    if !has_type {
        return Err(VcError::Parse(format!("document type must include {required_type}")));
    }
    Ok(())
}

impl Credential {
    /// Validate the credential envelope.
    pub fn parse(value: Value) -> Result<Self, VcError> {
        check_envelope(&value, VERIFIABLE_CREDENTIAL_TYPE)?;
        let credential = Self(value);
        credential.issuer()?;
        if credential.0.get("credentialSubject").is_none() {
            return Err(VcError::Parse("credential has no credentialSubject".into()));
        }
        Ok(credential)
    }

    /// Issuer id: `issuer` as a string or `issuer.id`.
    pub fn issuer(&self) -> Result<&str, VcError> {
        match self.0.get("issuer") {
            Some(Value::String(id)) => Ok(id),
            Some(Value::Object(obj)) => obj
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| VcError::Parse("issuer object has no id".into())),
            _ => Err(VcError::Parse("credential has no issuer".into())),
        }
    }

    /// The underlying document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap the document.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl Presentation {
    /// Validate the presentation envelope.
    pub fn parse(value: Value) -> Result<Self, VcError> {
        check_envelope(&value, VERIFIABLE_PRESENTATION_TYPE)?;
        Ok(Self(value))
    }

    /// Holder DID, if present.
    pub fn holder(&self) -> Option<&str> {
        self.0.get("holder").and_then(Value::as_str)
    }

    /// The underlying document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap the document.
    pub fn into_value(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential() -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "issuer": "did:example:issuer",
            "issuanceDate": "2021-01-01T00:00:00Z",
            "credentialSubject": {"id": "did:example:holder"}
        })
    }

    #[test]
    fn parses_string_issuer() {
        let vc = Credential::parse(credential()).unwrap();
        assert_eq!(vc.issuer().unwrap(), "did:example:issuer");
    }

    #[test]
    fn parses_object_issuer() {
        let mut doc = credential();
        doc["issuer"] = json!({"id": "did:example:obj", "name": "Uni"});
        assert_eq!(Credential::parse(doc).unwrap().issuer().unwrap(), "did:example:obj");
    }

    #[test]
    fn rejects_missing_pieces() {
        for key in ["@context", "issuer", "credentialSubject"] {
            let mut doc = credential();
            doc.as_object_mut().unwrap().remove(key);
            assert!(matches!(Credential::parse(doc), Err(VcError::Parse(_))), "{key}");
        }
        let mut doc = credential();
        doc["type"] = json!(["SomethingElse"]);
        assert!(Credential::parse(doc).is_err());
        assert!(Credential::parse(json!("text")).is_err());
    }

    #[test]
    fn presentation_holder_is_optional() {
        let vp = Presentation::parse(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": "VerifiablePresentation"
        }))
        .unwrap();
        assert!(vp.holder().is_none());
    }
}
