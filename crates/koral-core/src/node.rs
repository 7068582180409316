//! The canonical query graph.
//!
//! A compile produces one rooted [`Node`] tree for the content query and,
//! optionally, one [`Filter`] tree for the corpus restriction. Both are plain
//! owned values: built once, then only read.

use crate::vocab::{
    BooleanOp, ClassRefOp, Flags, Frame, MatchOperator, RefOperation, ValueType,
};

// ============================================================================
// Terms
// ============================================================================

/// A single annotation predicate: `foundry/layer=key:value`.
///
/// An empty `key` means "no key", as in the layer-only term wrapped by a
/// dominance relation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Term {
    pub foundry: Option<String>,
    pub layer: Option<String>,
    pub key: String,
    pub value: Option<String>,
    pub value_type: ValueType,
    pub match_op: MatchOperator,
    pub flags: Flags,
}

impl Term {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Term constraining only the layer, e.g. `c` for constituency relations.
    pub fn layer_only(layer: impl Into<String>) -> Self {
        Self {
            layer: Some(layer.into()),
            ..Self::default()
        }
    }

    pub fn with_foundry(mut self, foundry: impl Into<String>) -> Self {
        self.foundry = Some(foundry.into());
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_match(mut self, match_op: MatchOperator) -> Self {
        self.match_op = match_op;
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }
}

/// Boolean combination of terms. Always has at least two operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermGroup {
    pub op: BooleanOp,
    pub operands: Vec<Wrap>,
}

/// What a token or span wraps: a single term or a term group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wrap {
    Term(Term),
    Group(TermGroup),
}

impl Wrap {
    /// Combines operands under `op`, collapsing the single-operand case.
    ///
    /// Returns `None` for an empty operand list.
    pub fn combine(op: BooleanOp, mut operands: Vec<Wrap>) -> Option<Wrap> {
        match operands.len() {
            0 => None,
            1 => operands.pop(),
            _ => Some(Wrap::Group(TermGroup { op, operands })),
        }
    }

    /// First term in document order, used to inherit layer and foundry.
    pub fn first_term(&self) -> Option<&Term> {
        match self {
            Wrap::Term(term) => Some(term),
            Wrap::Group(group) => group.operands.iter().find_map(Wrap::first_term),
        }
    }
}

impl From<Term> for Wrap {
    fn from(term: Term) -> Self {
        Wrap::Term(term)
    }
}

// ============================================================================
// Boundaries and distances
// ============================================================================

/// Inclusive range `{min,max}`; `max = None` is unbounded.
///
/// Construction guarantees `max >= min` whenever `max` is finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary {
    min: u32,
    max: Option<u32>,
}

impl Boundary {
    /// Returns `None` when a finite `max` is below `min`.
    pub fn new(min: u32, max: Option<u32>) -> Option<Self> {
        match max {
            Some(max) if max < min => None,
            _ => Some(Self { min, max }),
        }
    }

    pub fn exact(n: u32) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub fn at_least(min: u32) -> Self {
        Self { min, max: None }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Interval sum `[a,b] + [c,d] = [a+c, b+d]`, unbounded if either is.
    pub fn add(self, other: Boundary) -> Boundary {
        Boundary {
            min: self.min.saturating_add(other.min),
            max: match (self.max, other.max) {
                (Some(a), Some(b)) => Some(a.saturating_add(b)),
                _ => None,
            },
        }
    }

    /// Clamps both ends to `limit`. Returns the cropped boundary and whether
    /// anything changed.
    pub fn crop(self, limit: u32) -> (Boundary, bool) {
        let min = self.min.min(limit);
        let max = self.max.map(|max| max.min(limit));
        let cropped = min != self.min || max != self.max;
        (Boundary { min, max }, cropped)
    }
}

/// Distance constraint between the operands of a sequence.
///
/// `key` is the measure: `w` words, `s` sentences, `p` paragraphs,
/// `t` text (COSMAS II `AND`/`NOT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distance {
    pub key: String,
    pub boundary: Boundary,
    pub exclude: bool,
}

impl Distance {
    pub fn new(key: impl Into<String>, boundary: Boundary) -> Self {
        Self {
            key: key.into(),
            boundary,
            exclude: false,
        }
    }

    pub fn excluded(mut self) -> Self {
        self.exclude = true;
        self
    }

    /// Word distances are native; every other measure is dialect-specific.
    pub fn is_word_distance(&self) -> bool {
        self.key == "w"
    }
}

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub wrap: Option<Wrap>,
}

impl Token {
    pub fn new(wrap: impl Into<Wrap>) -> Self {
        Self {
            wrap: Some(wrap.into()),
        }
    }

    /// Wildcard token `[]`.
    pub fn empty() -> Self {
        Self { wrap: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    pub wrap: Option<Wrap>,
    pub attr: Option<Wrap>,
}

impl Span {
    pub fn new(wrap: impl Into<Wrap>) -> Self {
        Self {
            wrap: Some(wrap.into()),
            attr: None,
        }
    }

    /// Span of unknown type, used as the anonymous common parent.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, attr: Wrap) -> Self {
        self.attr = Some(attr);
        self
    }
}

/// Typed edge of a relation group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Relation {
    pub wrap: Option<Term>,
    pub boundary: Option<Boundary>,
}

/// Operation of a group and its operation-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Sequence {
        distances: Vec<Distance>,
        in_order: bool,
    },
    Disjunction,
    Relation(Relation),
    Position {
        frames: Vec<Frame>,
        exclude: bool,
    },
    Class(u32),
    Repetition(Boundary),
}

impl Operation {
    /// Plain concatenation without distance constraints.
    pub fn sequence() -> Self {
        Operation::Sequence {
            distances: Vec::new(),
            in_order: true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Sequence { .. } => "sequence",
            Operation::Disjunction => "disjunction",
            Operation::Relation(_) => "relation",
            Operation::Position { .. } => "position",
            Operation::Class(_) => "class",
            Operation::Repetition(_) => "repetition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub operation: Operation,
    pub operands: Vec<Node>,
}

impl Group {
    pub fn new(operation: Operation, operands: Vec<Node>) -> Self {
        Self {
            operation,
            operands,
        }
    }
}

/// `[start, length]` window into a match; negative start counts from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanRef {
    pub start: i32,
    pub length: Option<u32>,
}

/// Re-surfaces previously tagged subtrees (or a slice of the match).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub operation: RefOperation,
    pub class_refs: Vec<u32>,
    pub class_ref_op: Option<ClassRefOp>,
    pub span_ref: Option<SpanRef>,
    pub operands: Vec<Node>,
}

impl Reference {
    pub fn focus(class: u32, operands: Vec<Node>) -> Self {
        Self {
            operation: RefOperation::Focus,
            class_refs: vec![class],
            class_ref_op: None,
            span_ref: None,
            operands,
        }
    }

    pub fn span(span_ref: SpanRef, operand: Node) -> Self {
        Self {
            operation: RefOperation::Focus,
            class_refs: Vec::new(),
            class_ref_op: None,
            span_ref: Some(span_ref),
            operands: vec![operand],
        }
    }
}

/// Any node of the canonical graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Token(Token),
    Span(Span),
    Group(Group),
    Reference(Reference),
    Term(Term),
    TermGroup(TermGroup),
}

impl Node {
    pub fn group(operation: Operation, operands: Vec<Node>) -> Node {
        Node::Group(Group::new(operation, operands))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Direct child nodes (wraps are not nodes of the graph's skeleton).
    pub fn operands(&self) -> &[Node] {
        match self {
            Node::Group(group) => &group.operands,
            Node::Reference(reference) => &reference.operands,
            _ => &[],
        }
    }

    /// Class numbers introduced anywhere in this subtree, in pre-order.
    pub fn classes(&self) -> Vec<u32> {
        let mut out = Vec::new();
        self.collect_classes(&mut out);
        out
    }

    fn collect_classes(&self, out: &mut Vec<u32>) {
        if let Node::Group(Group {
            operation: Operation::Class(n),
            ..
        }) = self
        {
            out.push(*n);
        }
        for operand in self.operands() {
            operand.collect_classes(out);
        }
    }

    /// Nesting depth; leaves have depth 1.
    pub fn depth(&self) -> usize {
        1 + self.operands().iter().map(Node::depth).max().unwrap_or(0)
    }
}

impl From<Token> for Node {
    fn from(token: Token) -> Self {
        Node::Token(token)
    }
}

impl From<Span> for Node {
    fn from(span: Span) -> Self {
        Node::Span(span)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl From<Reference> for Node {
    fn from(reference: Reference) -> Self {
        Node::Reference(reference)
    }
}

impl From<Wrap> for Node {
    fn from(wrap: Wrap) -> Self {
        match wrap {
            Wrap::Term(term) => Node::Term(term),
            Wrap::Group(group) => Node::TermGroup(group),
        }
    }
}

// ============================================================================
// Corpus filter graph
// ============================================================================

/// Metadata predicate: `key op value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doc {
    pub key: String,
    pub value: String,
    pub value_type: ValueType,
    pub match_op: MatchOperator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocGroup {
    pub op: BooleanOp,
    pub operands: Vec<Filter>,
}

/// Node of the corpus filter graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Doc(Doc),
    Group(DocGroup),
    /// Named, externally stored sub-collection.
    Ref(String),
}
