//! # Statement Canonicalization
//!
//! Linked-data proofs sign a canonical statement form of the document
//! rather than its JSON text. A [`Canonicalizer`] turns a JSON-LD document
//! into a [`Dataset`]: the sorted, duplicate-free N-Quads lines of its RDF
//! graph.
//!
//! [`StatementCanonicalizer`] converts JSON-LD to RDF with the context
//! rules of [`crate::context`], then labels blank nodes with the RDF
//! Dataset Canonicalization algorithm (URDNA2015, RDFC-1.0) from the
//! `rdf-canon` crate. The JSON-LD to RDF step covers the subset of JSON-LD
//! that credentials and presentations use: no `@graph`, `@list`,
//! `@reverse`, `@nest` or `@included`, and no `@container` semantics.
//! Documents relying on those features may canonicalize differently from
//! a full JSON-LD processor; plug one in through [`Canonicalizer`] where
//! that matters.
//!
//! Selective disclosure needs the statements of a framed document to be a
//! subset of the original's, but framing changes the graph and with it the
//! canonical blank-node labels. [`Canonicalizer::skolemize`] pins every
//! blank node of the original to an `urn:bnid:` IRI carrying its canonical
//! label, and [`Dataset::deskolemize`] turns those IRIs back into labels.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::{Map, Value};

use vcs_core::CanonicalBytes;

use crate::context::ActiveContext;
use crate::error::VcError;
use crate::loader::{DocumentLoader, SECURITY_V2_URL};

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const RDF_JSON: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON";
const SEC_PROOF: &str = "https://w3id.org/security#proof";
const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Prefix of the IRIs that stand in for canonical blank-node labels.
pub const SKOLEM_PREFIX: &str = "urn:bnid:";

/// A canonical, ordered set of statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    statements: Vec<String>,
}

impl Dataset {
    /// Sort and deduplicate `statements`.
    pub fn from_statements(mut statements: Vec<String>) -> Self {
        statements.sort();
        statements.dedup();
        Self { statements }
    }

    /// Statements in canonical order.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether there are no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Position of `statement` in canonical order.
    pub fn position(&self, statement: &str) -> Option<usize> {
        self.statements
            .binary_search_by(|s| s.as_str().cmp(statement))
            .ok()
    }

    /// Replace `<urn:bnid:_:label>` subjects and objects with the blank
    /// node `_:label` they stand for.
    pub fn deskolemize(&self) -> Self {
        Self::from_statements(self.statements.iter().map(|s| deskolemize_statement(s)).collect())
    }

    /// N-Quads text: one statement per line, newline terminated.
    pub fn to_nquads(&self) -> String {
        let mut out = String::new();
        for statement in &self.statements {
            out.push_str(statement);
            out.push('\n');
        }
        out
    }
}

fn deskolemize_statement(statement: &str) -> String {
    let Some((subject, rest)) = statement.split_once(' ') else {
        return statement.to_string();
    };
    let Some((predicate, object)) = rest.split_once(' ') else {
        return statement.to_string();
    };
    let object = match skolem_label(object) {
        Some((label, tail)) => Cow::Owned(format!("{label}{tail}")),
        None => Cow::Borrowed(object),
    };
    let subject = skolem_label(subject).map_or(subject, |(label, _)| label);
    format!("{subject} {predicate} {object}")
}

/// Split `<urn:bnid:_:LABEL>TAIL` into `_:LABEL` and `TAIL`.
fn skolem_label(term: &str) -> Option<(&str, &str)> {
    let inner = term.strip_prefix('<')?.strip_prefix(SKOLEM_PREFIX)?;
    let end = inner.find('>')?;
    inner[..end]
        .starts_with("_:")
        .then(|| (&inner[..end], &inner[end + 1..]))
}

/// Converts JSON-LD documents to canonical statements.
pub trait Canonicalizer: Send + Sync {
    /// Canonicalize `document`. A top-level `proof` is not part of the
    /// signed content and is skipped.
    fn canonicalize(
        &self,
        document: &Value,
        loader: &dyn DocumentLoader,
    ) -> Result<Dataset, VcError>;

    /// Copy of `document` where every blank node gets the id
    /// `urn:bnid:_:<label>`, `<label>` being its label in
    /// [`Canonicalizer::canonicalize`] of the same document.
    fn skolemize(&self, document: &Value, loader: &dyn DocumentLoader) -> Result<Value, VcError>;
}

/// JSON-LD to RDF over [`ActiveContext`], with URDNA2015 blank-node labels.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatementCanonicalizer;

impl StatementCanonicalizer {
    fn to_rdf(document: &Value, loader: &dyn DocumentLoader) -> Result<Graph, VcError> {
        let root = document
            .as_object()
            .ok_or_else(|| VcError::Parse("document must be a JSON object".into()))?;
        let mut walker = Walker {
            loader,
            graph: Graph::default(),
        };
        walker.node(root, &ActiveContext::new(), "", true)?;
        Ok(walker.graph)
    }
}

impl Canonicalizer for StatementCanonicalizer {
    fn canonicalize(
        &self,
        document: &Value,
        loader: &dyn DocumentLoader,
    ) -> Result<Dataset, VcError> {
        let graph = Self::to_rdf(document, loader)?;
        let labels = graph.canonical_labels()?;
        Ok(Dataset::from_statements(
            graph.statements.iter().map(|s| s.render(&labels)).collect(),
        ))
    }

    fn skolemize(&self, document: &Value, loader: &dyn DocumentLoader) -> Result<Value, VcError> {
        let graph = Self::to_rdf(document, loader)?;
        let labels = graph.canonical_labels()?;
        let mut skolemized = document.clone();
        for site in &graph.blank_nodes {
            let Some(label) = labels.get(&site.label) else {
                continue;
            };
            if let Some(Value::Object(node)) = skolemized.pointer_mut(&site.pointer) {
                node.insert(
                    site.id_key.clone(),
                    Value::String(format!("{SKOLEM_PREFIX}_:{label}")),
                );
            }
        }
        Ok(skolemized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Iri(String),
    Blank(String),
}

impl Node {
    /// Generated labels are `b<n>`; labels written in the document get an
    /// `e` prefix so the two never collide.
    fn from_iri(iri: String) -> Self {
        match iri.strip_prefix("_:") {
            Some(label) => Self::Blank(format!("e{label}")),
            None => Self::Iri(iri),
        }
    }

    fn render(&self, labels: &HashMap<String, String>) -> String {
        match self {
            Self::Iri(iri) => format!("<{iri}>"),
            Self::Blank(label) => {
                format!("_:{}", labels.get(label).map_or(label.as_str(), String::as_str))
            }
        }
    }

    fn to_subject(&self) -> oxrdf::Subject {
        match self {
            Self::Iri(iri) => oxrdf::NamedNode::new_unchecked(iri.clone()).into(),
            Self::Blank(label) => oxrdf::BlankNode::new_unchecked(label.clone()).into(),
        }
    }

    fn to_term(&self) -> oxrdf::Term {
        match self {
            Self::Iri(iri) => oxrdf::NamedNode::new_unchecked(iri.clone()).into(),
            Self::Blank(label) => oxrdf::BlankNode::new_unchecked(label.clone()).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Object {
    Node(Node),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Object {
    fn plain(value: &str) -> Self {
        Self::Literal {
            value: value.to_string(),
            datatype: None,
            language: None,
        }
    }

    fn typed(value: &str, datatype: &str) -> Self {
        Self::Literal {
            value: value.to_string(),
            datatype: (datatype != XSD_STRING).then(|| datatype.to_string()),
            language: None,
        }
    }

    fn render(&self, labels: &HashMap<String, String>) -> String {
        match self {
            Self::Node(node) => node.render(labels),
            Self::Literal {
                value,
                datatype,
                language,
            } => {
                let mut out = format!("\"{}\"", escape(value));
                if let Some(language) = language {
                    out.push('@');
                    out.push_str(language);
                } else if let Some(datatype) = datatype {
                    out.push_str("^^<");
                    out.push_str(datatype);
                    out.push('>');
                }
                out
            }
        }
    }

    fn to_term(&self) -> oxrdf::Term {
        match self {
            Self::Node(node) => node.to_term(),
            Self::Literal {
                value,
                language: Some(language),
                ..
            } => oxrdf::Literal::new_language_tagged_literal_unchecked(
                value.clone(),
                language.clone(),
            )
            .into(),
            Self::Literal {
                value,
                datatype: Some(datatype),
                ..
            } => oxrdf::Literal::new_typed_literal(
                value.clone(),
                oxrdf::NamedNode::new_unchecked(datatype.clone()),
            )
            .into(),
            Self::Literal { value, .. } => oxrdf::Literal::new_simple_literal(value.clone()).into(),
        }
    }
}

#[derive(Debug, Clone)]
struct Statement {
    subject: Node,
    predicate: String,
    object: Object,
}

impl Statement {
    fn render(&self, labels: &HashMap<String, String>) -> String {
        format!(
            "{} <{}> {} .",
            self.subject.render(labels),
            self.predicate,
            self.object.render(labels)
        )
    }

    fn has_blank_node(&self) -> bool {
        matches!(self.subject, Node::Blank(_))
            || matches!(self.object, Object::Node(Node::Blank(_)))
    }

    fn to_quad(&self) -> oxrdf::Quad {
        oxrdf::Quad::new(
            self.subject.to_subject(),
            oxrdf::NamedNode::new_unchecked(self.predicate.clone()),
            self.object.to_term(),
            oxrdf::GraphName::DefaultGraph,
        )
    }
}

/// A node object of the JSON document that became a blank node.
#[derive(Debug, Clone)]
struct BlankNodeSite {
    label: String,
    /// JSON pointer to the node object.
    pointer: String,
    /// Key that sets the node's `@id`.
    id_key: String,
}

#[derive(Debug, Default)]
struct Graph {
    statements: Vec<Statement>,
    blank_nodes: Vec<BlankNodeSite>,
}

impl Graph {
    /// Canonical label of each blank node, keyed by its local label.
    fn canonical_labels(&self) -> Result<HashMap<String, String>, VcError> {
        if !self.statements.iter().any(Statement::has_blank_node) {
            return Ok(HashMap::new());
        }
        let quads: Vec<oxrdf::Quad> = self.statements.iter().map(Statement::to_quad).collect();
        let mut dataset = oxrdf::Dataset::new();
        for quad in &quads {
            dataset.insert(quad);
        }
        let issued = rdf_canon::issue(&dataset)
            .map_err(|e| VcError::Parse(format!("RDF canonicalization failed: {e:?}")))?;
        Ok(issued
            .into_iter()
            .map(|(local, canonical)| (bare_label(local), bare_label(canonical)))
            .collect())
    }
}

fn bare_label(label: String) -> String {
    match label.strip_prefix("_:") {
        Some(bare) => bare.to_string(),
        None => label,
    }
}

struct Walker<'a> {
    loader: &'a dyn DocumentLoader,
    graph: Graph,
}

impl Walker<'_> {
    fn node(
        &mut self,
        node: &Map<String, Value>,
        parent: &ActiveContext,
        pointer: &str,
        is_root: bool,
    ) -> Result<Node, VcError> {
        let mut ctx = match node.get("@context") {
            Some(local) => parent.process(local, self.loader)?,
            None => parent.clone(),
        };

        let mut types: Vec<&str> = Vec::new();
        let mut subject = None;
        let mut id_key = None;
        for (key, value) in node {
            match ctx.expand_iri(key, true).as_deref() {
                Some("@type") => types.extend(string_values(value)),
                Some("@id") => {
                    let id = value.as_str().ok_or_else(|| {
                        VcError::Parse(format!("'{key}' must be a string at {}", location(pointer)))
                    })?;
                    let iri = ctx.expand_iri(id, false).unwrap_or_else(|| id.to_string());
                    subject = Some(Node::from_iri(iri));
                    id_key = Some(key.as_str());
                }
                _ => {}
            }
        }

        // Type-scoped contexts, applied in lexical order of the type terms.
        types.sort_unstable();
        let type_ctx = ctx.clone();
        for ty in &types {
            if let Some(scoped) = type_ctx.term(ty).and_then(|d| d.scoped_context.as_ref()) {
                ctx = ctx.process(scoped, self.loader)?;
            }
        }

        let subject = match subject {
            Some(Node::Iri(iri)) => Node::Iri(iri),
            written => {
                let label = match written {
                    Some(Node::Blank(label)) => label,
                    _ => format!("b{}", self.graph.blank_nodes.len()),
                };
                let id_key = match id_key {
                    Some(key) => key.to_string(),
                    None if ctx.expand_iri("id", true).as_deref() == Some("@id") => "id".into(),
                    None => "@id".into(),
                };
                self.graph.blank_nodes.push(BlankNodeSite {
                    label: label.clone(),
                    pointer: pointer.to_string(),
                    id_key,
                });
                Node::Blank(label)
            }
        };
        for ty in &types {
            let iri = ctx.expand_iri(ty, true).ok_or_else(|| {
                VcError::Parse(format!("undefined type '{ty}' at {}", location(pointer)))
            })?;
            self.emit(&subject, RDF_TYPE, Object::Node(Node::from_iri(iri)));
        }

        for (key, value) in node {
            if key == "@context" || (is_root && key == "proof") {
                continue;
            }
            let predicate = ctx.expand_iri(key, true).ok_or_else(|| {
                VcError::Parse(format!("undefined term '{key}' at {}", location(pointer)))
            })?;
            if predicate.starts_with('@') {
                continue;
            }
            let definition = ctx.term(key);
            let mut value_ctx = match definition.and_then(|d| d.scoped_context.as_ref()) {
                Some(scoped) => Cow::Owned(ctx.process(scoped, self.loader)?),
                None => Cow::Borrowed(&ctx),
            };
            if predicate == SEC_PROOF {
                // Embedded proofs resolve their terms against the security vocabulary.
                let with_security =
                    value_ctx.process(&Value::String(SECURITY_V2_URL.into()), self.loader)?;
                value_ctx = Cow::Owned(with_security);
            }
            let type_mapping = definition.and_then(|d| d.type_mapping.clone());
            self.value(
                &subject,
                &predicate,
                value,
                type_mapping.as_deref(),
                &value_ctx,
                &child_pointer(pointer, key),
            )?;
        }
        Ok(subject)
    }

    fn value(
        &mut self,
        subject: &Node,
        predicate: &str,
        value: &Value,
        type_mapping: Option<&str>,
        ctx: &ActiveContext,
        pointer: &str,
    ) -> Result<(), VcError> {
        if type_mapping == Some("@json") {
            let literal = CanonicalBytes::new(value).map_err(|e| {
                VcError::Parse(format!("@json literal at {}: {e}", location(pointer)))
            })?;
            self.emit(subject, predicate, Object::typed(literal.as_str(), RDF_JSON));
            return Ok(());
        }
        let object = match value {
            Value::Null => return Ok(()),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_pointer = format!("{pointer}/{i}");
                    self.value(subject, predicate, item, type_mapping, ctx, &item_pointer)?;
                }
                return Ok(());
            }
            Value::Object(map) => match map.get("@value") {
                Some(inner) => value_object_literal(inner, map, ctx)?,
                None => Object::Node(self.node(map, ctx, pointer, false)?),
            },
            Value::String(s) => match type_mapping {
                Some("@id") => Object::Node(Node::from_iri(
                    ctx.expand_iri(s, false).unwrap_or_else(|| s.clone()),
                )),
                Some("@vocab") => Object::Node(Node::from_iri(
                    ctx.expand_iri(s, true).unwrap_or_else(|| s.clone()),
                )),
                Some(datatype) if !datatype.starts_with('@') => Object::typed(s, datatype),
                _ => Object::plain(s),
            },
            Value::Bool(b) => Object::typed(&b.to_string(), XSD_BOOLEAN),
            Value::Number(n) => number_literal(n),
        };
        self.emit(subject, predicate, object);
        Ok(())
    }

    fn emit(&mut self, subject: &Node, predicate: &str, object: Object) {
        self.graph.statements.push(Statement {
            subject: subject.clone(),
            predicate: predicate.to_string(),
            object,
        });
    }
}

fn child_pointer(pointer: &str, key: &str) -> String {
    format!("{pointer}/{}", key.replace('~', "~0").replace('/', "~1"))
}

fn location(pointer: &str) -> &str {
    if pointer.is_empty() {
        "/"
    } else {
        pointer
    }
}

fn string_values(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Canonical N-Quads string escaping.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c <= '\u{1f}' || c == '\u{7f}' => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            other => out.push(other),
        }
    }
    out
}

fn number_literal(n: &serde_json::Number) -> Object {
    if n.is_i64() || n.is_u64() {
        Object::typed(&n.to_string(), XSD_INTEGER)
    } else {
        let f = n.as_f64().unwrap_or_default();
        Object::typed(&format!("{f:E}"), XSD_DOUBLE)
    }
}

fn value_object_literal(
    inner: &Value,
    map: &Map<String, Value>,
    ctx: &ActiveContext,
) -> Result<Object, VcError> {
    let text = match inner {
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => inner.to_string(),
        other => return Err(VcError::Parse(format!("invalid @value: {other}"))),
    };
    if let Some(Value::String(datatype)) = map.get("@type") {
        let iri = ctx.expand_iri(datatype, true).unwrap_or_else(|| datatype.clone());
        return Ok(Object::typed(&text, &iri));
    }
    if let Some(Value::String(language)) = map.get("@language") {
        return Ok(Object::Literal {
            value: text,
            datatype: None,
            language: Some(language.to_lowercase()),
        });
    }
    Ok(Object::plain(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{bbs_document_loader, CachingDocumentLoader};
    use serde_json::json;

    fn loader() -> CachingDocumentLoader {
        bbs_document_loader(None).unwrap()
    }

    fn credential() -> Value {
        json!({
            "@context": [
                "https://www.w3.org/2018/credentials/v1",
                "https://www.w3.org/2018/credentials/examples/v1"
            ],
            "type": ["VerifiableCredential", "UniversityDegreeCredential"],
            "issuer": "did:example:issuer",
            "issuanceDate": "2021-01-01T00:00:00Z",
            "credentialSubject": {
                "id": "did:example:holder",
                "name": "Alice",
                "birthDate": "1990-01-01T00:00:00Z",
                "degree": {"type": "BachelorDegree", "college": "MIT"}
            }
        })
    }

    fn canonicalize(doc: &Value) -> Dataset {
        StatementCanonicalizer.canonicalize(doc, &loader()).unwrap()
    }

    fn find<'a>(ds: &'a Dataset, suffix: &str) -> &'a str {
        ds.statements()
            .iter()
            .find(|s| s.ends_with(suffix))
            .unwrap_or_else(|| panic!("no statement ending with {suffix}"))
    }

    #[test]
    fn statements_are_sorted_and_unique() {
        let ds = canonicalize(&credential());
        let mut sorted = ds.statements().to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, ds.statements());
        assert!(!ds.is_empty());
    }

    #[test]
    fn expected_statements_present() {
        let ds = canonicalize(&credential());
        assert!(ds.statements().contains(
            &"<did:example:holder> <http://schema.org/name> \"Alice\"^^<http://www.w3.org/1999/02/22-rdf-syntax-ns#HTML> ."
                .to_string()
        ));
        let issuer = find(&ds, "<https://www.w3.org/2018/credentials#issuer> <did:example:issuer> .");
        assert!(issuer.starts_with("_:c14n"));
        let degree = find(
            &ds,
            "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <https://example.org/examples#BachelorDegree> .",
        );
        assert!(degree.starts_with("_:c14n"));
        assert!(ds.to_nquads().ends_with(" .\n"));
    }

    #[test]
    fn key_order_does_not_matter() {
        let a = json!({"@context": {"@vocab": "https://v/"}, "x": 1, "y": "two"});
        let b = json!({"y": "two", "x": 1, "@context": {"@vocab": "https://v/"}});
        assert_eq!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn blank_node_order_does_not_matter() {
        let a = json!({
            "@context": {"@vocab": "https://v/"},
            "items": [{"n": 1, "tag": "a"}, {"n": 2, "tag": "b"}]
        });
        let b = json!({
            "@context": {"@vocab": "https://v/"},
            "items": [{"tag": "b", "n": 2}, {"tag": "a", "n": 1}]
        });
        assert_eq!(canonicalize(&a), canonicalize(&b));
    }

    #[test]
    fn blank_nodes_get_canonical_labels() {
        let ds = canonicalize(&json!({
            "@context": {"@vocab": "https://v/"},
            "child": {"name": "x"}
        }));
        assert_eq!(ds.len(), 2);
        let child = find(&ds, "<https://v/name> \"x\" .");
        let label = child.split(' ').next().unwrap();
        assert!(label == "_:c14n0" || label == "_:c14n1", "{label}");
        find(&ds, &format!("<https://v/child> {label} ."));
    }

    #[test]
    fn top_level_proof_is_excluded() {
        let mut doc = credential();
        let before = canonicalize(&doc);
        doc["proof"] = json!({"type": "Ed25519Signature2018", "proofValue": "abc"});
        assert_eq!(before, canonicalize(&doc));
    }

    #[test]
    fn undefined_term_is_parse_error() {
        let doc = json!({"@context": {"a": "https://a/"}, "b": 1});
        let err = StatementCanonicalizer.canonicalize(&doc, &loader()).unwrap_err();
        assert!(matches!(err, VcError::Parse(ref m) if m.contains("'b'")));
    }

    #[test]
    fn skolemize_names_only_blank_nodes() {
        let skolemized = StatementCanonicalizer
            .skolemize(&credential(), &loader())
            .unwrap();
        let root_id = skolemized["id"].as_str().unwrap();
        let degree_id = skolemized["credentialSubject"]["degree"]["id"].as_str().unwrap();
        assert!(root_id.starts_with("urn:bnid:_:c14n"));
        assert!(degree_id.starts_with("urn:bnid:_:c14n"));
        assert_ne!(root_id, degree_id);
        assert_eq!(skolemized["credentialSubject"]["id"], "did:example:holder");
    }

    #[test]
    fn skolemized_document_deskolemizes_to_the_original() {
        let l = loader();
        let skolemized = StatementCanonicalizer.skolemize(&credential(), &l).unwrap();
        let ds = StatementCanonicalizer.canonicalize(&skolemized, &l).unwrap();
        assert!(ds.statements().iter().all(|s| !s.starts_with("_:")));
        assert_eq!(ds.deskolemize(), canonicalize(&credential()));
    }

    #[test]
    fn reduced_skolemized_document_yields_a_subset() {
        let l = loader();
        let full = canonicalize(&credential());
        let mut reduced = StatementCanonicalizer.skolemize(&credential(), &l).unwrap();
        let subject = reduced["credentialSubject"].as_object_mut().unwrap();
        subject.remove("birthDate");
        subject.remove("degree");
        let subset = StatementCanonicalizer
            .canonicalize(&reduced, &l)
            .unwrap()
            .deskolemize();
        assert_eq!(subset.len() + 4, full.len());
        for s in subset.statements() {
            assert!(full.position(s).is_some(), "missing {s}");
        }
    }

    #[test]
    fn skolem_id_uses_at_id_without_an_alias() {
        let doc = json!({"@context": {"@vocab": "https://v/"}, "child": {"name": "x"}});
        let skolemized = StatementCanonicalizer.skolemize(&doc, &loader()).unwrap();
        assert!(skolemized.get("id").is_none());
        let root = skolemized["@id"].as_str().unwrap();
        let child = skolemized["child"]["@id"].as_str().unwrap();
        assert!(root.starts_with("urn:bnid:_:c14n"));
        assert!(child.starts_with("urn:bnid:_:c14n"));
        assert_ne!(root, child);
    }

    #[test]
    fn written_blank_node_ids_are_relabelled() {
        let a = json!({"@context": {"@vocab": "https://v/"}, "@id": "_:mine", "n": 1});
        let b = json!({"@context": {"@vocab": "https://v/"}, "n": 1});
        assert_eq!(canonicalize(&a), canonicalize(&b));
        let skolemized = StatementCanonicalizer.skolemize(&a, &loader()).unwrap();
        assert_eq!(skolemized["@id"], "urn:bnid:_:c14n0");
    }

    #[test]
    fn deskolemize_rewrites_subject_and_object_only() {
        let ds = Dataset::from_statements(vec![
            "<urn:bnid:_:c14n0> <https://v/child> <urn:bnid:_:c14n1> .".into(),
            "<did:example:1> <https://v/note> \"<urn:bnid:_:c14n0>\" .".into(),
            "<urn:bnid:plain> <https://v/p> \"x\" .".into(),
        ]);
        assert_eq!(
            ds.deskolemize().statements(),
            &[
                "<did:example:1> <https://v/note> \"<urn:bnid:_:c14n0>\" .".to_string(),
                "<urn:bnid:plain> <https://v/p> \"x\" .".to_string(),
                "_:c14n0 <https://v/child> _:c14n1 .".to_string(),
            ]
        );
    }

    #[test]
    fn literals_are_typed_and_escaped() {
        let doc = json!({
            "@context": {"@vocab": "https://v/"},
            "flag": true,
            "count": 3,
            "ratio": 1.5,
            "text": "line\n\"quoted\"\ttab\u{1}"
        });
        let nquads = canonicalize(&doc).to_nquads();
        assert!(nquads.contains("\"true\"^^<http://www.w3.org/2001/XMLSchema#boolean>"));
        assert!(nquads.contains("\"3\"^^<http://www.w3.org/2001/XMLSchema#integer>"));
        assert!(nquads.contains("\"1.5E0\"^^<http://www.w3.org/2001/XMLSchema#double>"));
        assert!(nquads.contains("\"line\\n\\\"quoted\\\"\\ttab\\u0001\""));
    }

    #[test]
    fn xsd_string_datatype_is_implicit() {
        let doc = json!({
            "@context": {"@vocab": "https://v/"},
            "label": {"@value": "x", "@type": "http://www.w3.org/2001/XMLSchema#string"}
        });
        assert!(canonicalize(&doc).to_nquads().contains("<https://v/label> \"x\" ."));
    }

    #[test]
    fn json_literals_are_jcs() {
        let doc = json!({
            "@context": {"@vocab": "https://v/", "meta": {"@id": "https://v/meta", "@type": "@json"}},
            "meta": {"b": [1, 2], "a": "x"}
        });
        let nquads = canonicalize(&doc).to_nquads();
        assert!(nquads.contains(
            r#""{\"a\":\"x\",\"b\":[1,2]}"^^<http://www.w3.org/1999/02/22-rdf-syntax-ns#JSON>"#
        ));
    }

    #[test]
    fn value_objects_with_language() {
        let doc = json!({
            "@context": {"@vocab": "https://v/"},
            "title": {"@value": "Hallo", "@language": "DE"}
        });
        assert!(canonicalize(&doc).to_nquads().contains("\"Hallo\"@de"));
    }

    #[test]
    fn embedded_proofs_use_security_terms() {
        let doc = json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "type": "VerifiablePresentation",
            "holder": "did:example:holder",
            "verifiableCredential": [{
                "@context": ["https://www.w3.org/2018/credentials/v1"],
                "type": "VerifiableCredential",
                "issuer": "did:example:issuer",
                "proof": {
                    "type": "JsonWebSignature2020",
                    "created": "2021-01-01T00:00:00Z",
                    "jws": "abc..def"
                }
            }]
        });
        assert!(canonicalize(&doc)
            .to_nquads()
            .contains("<https://w3id.org/security#jws> \"abc..def\""));
    }

    #[test]
    fn non_object_document_rejected() {
        assert!(StatementCanonicalizer
            .canonicalize(&json!([1, 2]), &loader())
            .is_err());
    }
}
