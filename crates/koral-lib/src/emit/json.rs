use koral_core::{
    Boundary, Distance, Doc, Filter, Group, Node, Operation, Reference, Relation, Span, Term,
    TermGroup, Token, ValueType, Wrap,
};
use serde_json::{Map, Value, json};

use crate::diagnostics::{Diagnostics, Severity};

use super::ApiVersion;

/// Renders graphs in the shape of one API version.
#[derive(Debug, Clone, Copy)]
pub struct Emitter {
    version: ApiVersion,
}

impl Emitter {
    pub fn new(version: ApiVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    fn ty(&self, name: &str) -> Value {
        Value::String(format!("{}:{name}", self.version.prefix()))
    }

    /// The complete request object.
    ///
    /// `query` is rendered as `null` when absent; the filter key is left out.
    pub fn request(
        &self,
        query: Option<&Node>,
        filter: Option<&Filter>,
        diagnostics: &Diagnostics,
    ) -> Value {
        let mut out = Map::new();
        out.insert("@context".into(), json!(self.version.context()));
        for (key, severity) in [("errors", Severity::Error), ("warnings", Severity::Warning)] {
            let entries = diagnostics.unique(severity);
            if !entries.is_empty() {
                let list = entries
                    .into_iter()
                    .map(|(code, message)| json!([code, message]))
                    .collect();
                out.insert(key.into(), Value::Array(list));
            }
        }
        out.insert("query".into(), query.map_or(Value::Null, |q| self.node(q)));
        if let Some(filter) = filter {
            out.insert(self.version.filter_key().into(), self.filter(filter));
        }
        Value::Object(out)
    }

    pub fn node(&self, node: &Node) -> Value {
        match node {
            Node::Token(token) => self.token(token),
            Node::Span(span) => self.span(span),
            Node::Group(group) => self.group(group),
            Node::Reference(reference) => self.reference(reference),
            Node::Term(term) => self.term(term),
            Node::TermGroup(group) => self.term_group(group),
        }
    }

    fn nodes(&self, nodes: &[Node]) -> Value {
        Value::Array(nodes.iter().map(|n| self.node(n)).collect())
    }

    fn token(&self, token: &Token) -> Value {
        let mut out = Map::new();
        out.insert("@type".into(), self.ty("token"));
        if let Some(wrap) = &token.wrap {
            out.insert("wrap".into(), self.wrap(wrap));
        }
        Value::Object(out)
    }

    fn span(&self, span: &Span) -> Value {
        let mut out = Map::new();
        out.insert("@type".into(), self.ty("span"));
        if let Some(wrap) = &span.wrap {
            out.insert("wrap".into(), self.wrap(wrap));
        }
        if let Some(attr) = &span.attr {
            out.insert("attr".into(), self.wrap(attr));
        }
        Value::Object(out)
    }

    pub fn wrap(&self, wrap: &Wrap) -> Value {
        match wrap {
            Wrap::Term(term) => self.term(term),
            Wrap::Group(group) => self.term_group(group),
        }
    }

    fn term_group(&self, group: &TermGroup) -> Value {
        json!({
            "@type": self.ty("termGroup"),
            "relation": format!("relation:{}", group.op.as_str()),
            "operands": group.operands.iter().map(|w| self.wrap(w)).collect::<Vec<_>>(),
        })
    }

    pub fn term(&self, term: &Term) -> Value {
        let mut out = Map::new();
        out.insert("@type".into(), self.ty("term"));
        if let Some(foundry) = &term.foundry {
            out.insert("foundry".into(), json!(foundry));
        }
        if let Some(layer) = &term.layer {
            out.insert("layer".into(), json!(layer));
        }
        if term.has_key() {
            out.insert("key".into(), json!(term.key));
            if let Some(value) = &term.value {
                out.insert("value".into(), json!(value));
            }
            if term.value_type != ValueType::String {
                out.insert("type".into(), type_name(term.value_type));
            }
            out.insert(
                "match".into(),
                json!(format!("match:{}", term.match_op.as_str())),
            );
        }
        let mut flags = Vec::new();
        if term.flags.case_insensitive {
            flags.push(json!("flags:caseInsensitive"));
        }
        if term.flags.diacritics_insensitive {
            flags.push(json!("flags:diacriticsInsensitive"));
        }
        if !flags.is_empty() {
            out.insert("flags".into(), Value::Array(flags));
        }
        Value::Object(out)
    }

    fn group(&self, group: &Group) -> Value {
        let mut out = Map::new();
        out.insert("@type".into(), self.ty("group"));
        out.insert(
            "operation".into(),
            json!(format!("operation:{}", group.operation.name())),
        );
        match &group.operation {
            Operation::Sequence {
                distances,
                in_order,
            } => {
                if !distances.is_empty() {
                    let list = distances.iter().map(|d| self.distance(d)).collect();
                    out.insert("distances".into(), Value::Array(list));
                }
                if !distances.is_empty() || !in_order {
                    out.insert("inOrder".into(), json!(in_order));
                }
            }
            Operation::Disjunction => {}
            Operation::Relation(relation) => {
                out.insert("relation".into(), self.relation(relation));
            }
            Operation::Position { frames, exclude } => {
                let list = frames
                    .iter()
                    .map(|f| json!(format!("frames:{}", f.as_str())))
                    .collect();
                out.insert("frames".into(), Value::Array(list));
                if *exclude {
                    out.insert("exclude".into(), json!(true));
                }
            }
            Operation::Class(n) => {
                out.insert(self.version.class_key().into(), json!(n));
            }
            Operation::Repetition(boundary) => {
                out.insert("boundary".into(), self.boundary(*boundary));
            }
        }
        out.insert("operands".into(), self.nodes(&group.operands));
        Value::Object(out)
    }

    fn relation(&self, relation: &Relation) -> Value {
        let mut out = Map::new();
        out.insert("@type".into(), self.ty("relation"));
        if let Some(term) = &relation.wrap {
            out.insert("wrap".into(), self.term(term));
        }
        if let Some(boundary) = relation.boundary {
            out.insert("boundary".into(), self.boundary(boundary));
        }
        Value::Object(out)
    }

    fn reference(&self, reference: &Reference) -> Value {
        let mut out = Map::new();
        out.insert("@type".into(), self.ty("reference"));
        out.insert(
            "operation".into(),
            json!(format!("operation:{}", reference.operation.as_str())),
        );
        if !reference.class_refs.is_empty() {
            out.insert("classRef".into(), json!(reference.class_refs));
        }
        if let Some(op) = reference.class_ref_op {
            out.insert(
                "classRefOp".into(),
                json!(format!("classRefOp:{}", op.as_str())),
            );
        }
        if let Some(span_ref) = reference.span_ref {
            let value = match span_ref.length {
                Some(length) => json!([span_ref.start, length]),
                None => json!([span_ref.start]),
            };
            out.insert("spanRef".into(), value);
        }
        if !reference.operands.is_empty() {
            out.insert("operands".into(), self.nodes(&reference.operands));
        }
        Value::Object(out)
    }

    pub fn boundary(&self, boundary: Boundary) -> Value {
        let mut out = Map::new();
        out.insert("@type".into(), self.ty("boundary"));
        out.insert("min".into(), json!(boundary.min()));
        if let Some(max) = boundary.max() {
            out.insert("max".into(), json!(max));
        }
        Value::Object(out)
    }

    /// Word distances are native; other measures live in the COSMAS II
    /// namespace in both versions.
    pub fn distance(&self, distance: &Distance) -> Value {
        let ty = if distance.is_word_distance() {
            self.ty("distance")
        } else {
            json!("cosmas:distance")
        };
        let mut out = Map::new();
        out.insert("@type".into(), ty);
        out.insert("key".into(), json!(distance.key));
        out.insert("boundary".into(), self.boundary(distance.boundary));
        if distance.exclude {
            out.insert("exclude".into(), json!(true));
        }
        Value::Object(out)
    }

    pub fn filter(&self, filter: &Filter) -> Value {
        match filter {
            Filter::Doc(doc) => self.doc(doc),
            Filter::Group(group) => json!({
                "@type": self.ty("docGroup"),
                "operation": format!("operation:{}", group.op.as_str()),
                "operands": group.operands.iter().map(|f| self.filter(f)).collect::<Vec<_>>(),
            }),
            Filter::Ref(name) => json!({
                "@type": self.ty("docGroupRef"),
                "ref": name,
            }),
        }
    }

    fn doc(&self, doc: &Doc) -> Value {
        let mut out = Map::new();
        out.insert("@type".into(), self.ty("doc"));
        out.insert("key".into(), json!(doc.key));
        out.insert("value".into(), json!(doc.value));
        if doc.value_type != ValueType::String {
            out.insert("type".into(), type_name(doc.value_type));
        }
        out.insert(
            "match".into(),
            json!(format!("match:{}", doc.match_op.as_str())),
        );
        Value::Object(out)
    }
}

fn type_name(value_type: ValueType) -> Value {
    json!(format!("type:{}", value_type.as_str()))
}
