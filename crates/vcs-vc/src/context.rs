//! # JSON-LD Active Context
//!
//! Just enough context processing to map compact JSON keys and values to
//! IRIs: remote and inline contexts, `@vocab`, compact IRIs, keyword
//! aliases (`id`, `type`), `@type` coercion and scoped contexts. `@protected`
//! and container semantics are not enforced.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::VcError;
use crate::loader::DocumentLoader;

const MAX_CONTEXT_DEPTH: usize = 16;

/// A resolved term.
#[derive(Debug, Clone, PartialEq)]
pub struct TermDefinition {
    /// Expanded IRI or the keyword the term aliases.
    pub iri: String,
    /// `@id`, `@vocab`, `@json`, or an expanded datatype IRI.
    pub type_mapping: Option<String>,
    /// Context applied to values of this property or nodes of this type.
    pub scoped_context: Option<Value>,
}

/// Term definitions in effect for a node.
#[derive(Debug, Clone, Default)]
pub struct ActiveContext {
    terms: HashMap<String, TermDefinition>,
    vocab: Option<String>,
}

impl ActiveContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a local `@context` value on top of this context.
    pub fn process(&self, local: &Value, loader: &dyn DocumentLoader) -> Result<Self, VcError> {
        self.process_at_depth(local, loader, 0)
    }

    fn process_at_depth(
        &self,
        local: &Value,
        loader: &dyn DocumentLoader,
        depth: usize,
    ) -> Result<Self, VcError> {
        if depth > MAX_CONTEXT_DEPTH {
            return Err(VcError::Parse("@context nesting too deep".into()));
        }
        let mut result = self.clone();
        let items: Vec<&Value> = match local {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for item in items {
            match item {
                Value::Null => result = Self::new(),
                Value::String(url) => {
                    let doc = loader.load(url)?;
                    let inner = doc.get("@context").ok_or_else(|| {
                        VcError::Parse(format!("context document {url} has no @context"))
                    })?;
                    result = result.process_at_depth(inner, loader, depth + 1)?;
                }
                Value::Object(map) => result.apply_definitions(map)?,
                other => {
                    return Err(VcError::Parse(format!("invalid @context entry: {other}")))
                }
            }
        }
        Ok(result)
    }

    fn apply_definitions(&mut self, local: &Map<String, Value>) -> Result<(), VcError> {
        match local.get("@vocab") {
            Some(Value::String(vocab)) => {
                self.vocab = Some(self.expand_iri(vocab, true).unwrap_or_else(|| vocab.clone()));
            }
            Some(Value::Null) => self.vocab = None,
            Some(other) => return Err(VcError::Parse(format!("invalid @vocab: {other}"))),
            None => {}
        }
        let mut defined = HashMap::new();
        for term in local.keys().filter(|k| !k.starts_with('@')) {
            self.create_term(local, term, &mut defined)?;
        }
        Ok(())
    }

    fn create_term(
        &mut self,
        local: &Map<String, Value>,
        term: &str,
        defined: &mut HashMap<String, bool>,
    ) -> Result<(), VcError> {
        match defined.get(term) {
            Some(true) => return Ok(()),
            Some(false) => {
                return Err(VcError::Parse(format!("cyclic definition of term '{term}'")))
            }
            None => {}
        }
        defined.insert(term.to_string(), false);

        let definition = match local.get(term) {
            None | Some(Value::Null) => {
                self.terms.remove(term);
                defined.insert(term.to_string(), true);
                return Ok(());
            }
            Some(Value::String(iri)) => TermDefinition {
                iri: self.expand_definition_iri(local, iri, defined)?,
                type_mapping: None,
                scoped_context: None,
            },
            Some(Value::Object(def)) => {
                let iri = match def.get("@id") {
                    Some(Value::String(id)) => self.expand_definition_iri(local, id, defined)?,
                    None => self.expand_definition_iri(local, term, defined)?,
                    Some(other) => {
                        return Err(VcError::Parse(format!(
                            "invalid @id for term '{term}': {other}"
                        )))
                    }
                };
                let type_mapping = match def.get("@type") {
                    None => None,
                    Some(Value::String(t)) if matches!(t.as_str(), "@id" | "@vocab" | "@json") => {
                        Some(t.clone())
                    }
                    Some(Value::String(t)) => Some(self.expand_definition_iri(local, t, defined)?),
                    Some(other) => {
                        return Err(VcError::Parse(format!(
                            "invalid @type for term '{term}': {other}"
                        )))
                    }
                };
                TermDefinition {
                    iri,
                    type_mapping,
                    scoped_context: def.get("@context").cloned(),
                }
            }
            Some(other) => {
                return Err(VcError::Parse(format!(
                    "invalid definition for term '{term}': {other}"
                )))
            }
        };
        self.terms.insert(term.to_string(), definition);
        defined.insert(term.to_string(), true);
        Ok(())
    }

    /// Expand an IRI inside a context definition, defining any prefix or
    /// term it depends on from the same local context first.
    fn expand_definition_iri(
        &mut self,
        local: &Map<String, Value>,
        value: &str,
        defined: &mut HashMap<String, bool>,
    ) -> Result<String, VcError> {
        if value.starts_with('@') {
            return Ok(value.to_string());
        }
        let dependency = match value.split_once(':') {
            Some((prefix, suffix)) if prefix != "_" && !suffix.starts_with("//") => Some(prefix),
            Some(_) => None,
            None => Some(value),
        };
        if let Some(dep) = dependency {
            if local.contains_key(dep) && defined.get(dep) != Some(&false) {
                self.create_term(local, dep, defined)?;
            }
        }
        self.expand_iri(value, true)
            .ok_or_else(|| VcError::Parse(format!("cannot expand IRI '{value}'")))
    }

    /// Look up a term definition.
    pub fn term(&self, name: &str) -> Option<&TermDefinition> {
        self.terms.get(name)
    }

    /// Expand a term, compact IRI or absolute IRI. With `vocab`, bare terms
    /// and `@vocab`-relative names are expanded; without it, only compact
    /// and absolute IRIs are.
    pub fn expand_iri(&self, value: &str, vocab: bool) -> Option<String> {
        if value.starts_with('@') {
            return Some(value.to_string());
        }
        if vocab {
            if let Some(def) = self.terms.get(value) {
                return Some(def.iri.clone());
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return Some(value.to_string());
            }
            if let Some(def) = self.terms.get(prefix) {
                return Some(format!("{}{}", def.iri, suffix));
            }
            return Some(value.to_string());
        }
        if vocab {
            return self.vocab.as_ref().map(|v| format!("{v}{value}"));
        }
        None
    }
}
