//! # Disclosure Frames
//!
//! A frame names the properties of a credential that stay visible in a
//! derived credential. A frame key keeps the matching property; an object
//! value with property selectors recurses, anything else keeps the whole
//! value. `@context`, `id` and `type` survive on every kept node, and the root always
//! keeps its envelope (`issuer`, `issuanceDate`, `proof`).
//! Frame-level `@context`, `type` and `@`-keywords select nothing. Arrays of
//! objects are framed element by element.

use serde_json::{Map, Value};

use crate::error::VcError;

const ALWAYS_KEPT: &[&str] = &["@context", "id", "type", "@id", "@type"];
const ROOT_KEPT: &[&str] = &["issuer", "issuanceDate", "proof"];

/// Raw frame input in any of the accepted forms.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameInput {
    /// JSON bytes.
    Bytes(Vec<u8>),
    /// JSON text.
    Text(String),
    /// An already-parsed value.
    Value(Value),
}

impl From<Value> for FrameInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Value(other),
        }
    }
}

impl From<&str> for FrameInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for FrameInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A normalized disclosure frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame(Map<String, Value>);

impl Frame {
    /// Normalize any input form to a frame object.
    pub fn from_input(input: impl Into<FrameInput>) -> Result<Self, VcError> {
        let value = match input.into() {
            FrameInput::Bytes(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| VcError::InvalidFrame(format!("malformed frame: {e}")))?,
            FrameInput::Text(text) => serde_json::from_str(&text)
                .map_err(|e| VcError::InvalidFrame(format!("malformed frame: {e}")))?,
            FrameInput::Value(value) => value,
        };
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(VcError::InvalidFrame(format!(
                "frame must be a JSON object, got {}",
                kind(&other)
            ))),
        }
    }

    /// The frame as a JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Reduce `document` to the framed properties.
    pub fn apply(&self, document: &Value) -> Result<Value, VcError> {
        let root = document
            .as_object()
            .ok_or_else(|| VcError::Parse("document must be a JSON object".into()))?;
        Ok(Value::Object(frame_node(root, &self.0, true)))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn is_selector(key: &str) -> bool {
    !key.starts_with('@') && key != "type"
}

fn has_selectors(frame: &Map<String, Value>) -> bool {
    frame.keys().any(|k| is_selector(k))
}

fn frame_node(node: &Map<String, Value>, frame: &Map<String, Value>, is_root: bool) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in node {
        let mandatory =
            ALWAYS_KEPT.contains(&key.as_str()) || (is_root && ROOT_KEPT.contains(&key.as_str()));
        if mandatory {
            out.insert(key.clone(), value.clone());
            continue;
        }
        if !is_selector(key) {
            continue;
        }
        let Some(selector) = frame.get(key) else {
            continue;
        };
        out.insert(key.clone(), frame_value(value, selector));
    }
    out
}

fn frame_value(value: &Value, selector: &Value) -> Value {
    let sub_frame = match selector {
        Value::Object(map) if has_selectors(map) => map,
        _ => return value.clone(),
    };
    match value {
        Value::Object(node) => Value::Object(frame_node(node, sub_frame, false)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(node) => Value::Object(frame_node(node, sub_frame, false)),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential() -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "id": "urn:uuid:1",
            "type": ["VerifiableCredential"],
            "issuer": "did:example:issuer",
            "issuanceDate": "2021-01-01T00:00:00Z",
            "expirationDate": "2031-01-01T00:00:00Z",
            "credentialSubject": {
                "id": "did:example:holder",
                "type": "Person",
                "name": "Alice",
                "birthDate": "1990-01-01",
                "degree": {"type": "BachelorDegree", "name": "BSc", "gpa": 4}
            },
            "proof": {"type": "BbsBlsSignature2020"}
        })
    }

    #[test]
    fn keeps_framed_and_mandatory_properties() {
        let frame = Frame::from_input(json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": ["VerifiableCredential"],
            "credentialSubject": {"@explicit": true, "name": {}}
        }))
        .unwrap();
        let out = frame.apply(&credential()).unwrap();
        let subject = &out["credentialSubject"];
        assert_eq!(subject["name"], "Alice");
        assert_eq!(subject["id"], "did:example:holder");
        assert_eq!(subject["type"], "Person");
        assert!(subject.get("birthDate").is_none());
        assert!(subject.get("degree").is_none());
        assert!(out.get("expirationDate").is_none());
        for key in ["@context", "id", "type", "issuer", "issuanceDate", "proof"] {
            assert!(out.get(key).is_some(), "{key}");
        }
    }

    #[test]
    fn empty_object_keeps_subtree() {
        let frame = Frame::from_input(json!({"credentialSubject": {"degree": {}}})).unwrap();
        let out = frame.apply(&credential()).unwrap();
        assert_eq!(out["credentialSubject"]["degree"]["gpa"], 4);
    }

    #[test]
    fn nested_selection() {
        let frame =
            Frame::from_input(json!({"credentialSubject": {"degree": {"name": {}}}})).unwrap();
        let out = frame.apply(&credential()).unwrap();
        let degree = &out["credentialSubject"]["degree"];
        assert_eq!(degree["name"], "BSc");
        assert_eq!(degree["type"], "BachelorDegree");
        assert!(degree.get("gpa").is_none());
    }

    #[test]
    fn arrays_are_framed_element_wise() {
        let doc = json!({
            "@context": [],
            "evidence": [{"id": "e1", "secret": 1, "kind": "a"}, {"id": "e2", "secret": 2, "kind": "b"}]
        });
        let frame = Frame::from_input(json!({"evidence": {"kind": {}}})).unwrap();
        let out = frame.apply(&doc).unwrap();
        assert_eq!(out["evidence"], json!([{"id": "e1", "kind": "a"}, {"id": "e2", "kind": "b"}]));
    }

    #[test]
    fn absent_keys_are_ignored() {
        let frame = Frame::from_input(json!({"credentialSubject": {"nickname": {}}})).unwrap();
        let out = frame.apply(&credential()).unwrap();
        assert!(out["credentialSubject"].get("nickname").is_none());
    }

    #[test]
    fn input_forms_normalize_identically() {
        let text = r#"{"credentialSubject": {"name": {}}}"#;
        let a = Frame::from_input(text).unwrap();
        let b = Frame::from_input(text.as_bytes().to_vec()).unwrap();
        let c = Frame::from_input(json!({"credentialSubject": {"name": {}}})).unwrap();
        let d = Frame::from_input(Value::String(text.to_string())).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c, d);
    }

    #[test]
    fn malformed_frames_rejected() {
        for bad in [
            FrameInput::Text("{not json".into()),
            FrameInput::Bytes(vec![0xff, 0xfe]),
            FrameInput::Value(json!([1, 2])),
            FrameInput::Value(json!(null)),
            FrameInput::Text("42".into()),
        ] {
            assert!(matches!(Frame::from_input(bad), Err(VcError::InvalidFrame(_))));
        }
    }
}
