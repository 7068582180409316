//! Generic labeled parse trees handed over by the dialect parsers.
//!
//! A [`ParseNode`] carries a dialect-specific kind, ordered string attributes,
//! ordered children and the range of the query text it was parsed from. Each
//! dialect declares its kinds with [`node_kinds!`] so that drivers can match
//! exhaustively.
//!
//! Trees can also be read from a textual notation (see [`reader`]):
//!
//! ```text
//! (sequence
//!   (token (term layer=orth key=der))
//!   (token (term layer=p key="/NN.*/")))
//! ```

pub mod lexer;
pub mod reader;

#[cfg(test)]
mod lexer_tests;

use std::fmt;

use indexmap::IndexMap;
use rowan::TextRange;

pub use reader::read;

/// Closed set of node kinds of one dialect.
pub trait NodeKind: Copy + Eq + fmt::Debug + 'static {
    /// Kind for its notation name, `None` if the dialect has no such kind.
    fn from_name(name: &str) -> Option<Self>;

    fn name(&self) -> &'static str;
}

/// Declares a kind enum together with its [`NodeKind`] name table.
#[macro_export]
macro_rules! node_kinds {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::tree::NodeKind for $name {
            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode<K> {
    kind: K,
    attrs: IndexMap<String, String>,
    children: Vec<ParseNode<K>>,
    range: TextRange,
}

impl<K: NodeKind> ParseNode<K> {
    pub fn new(kind: K, range: TextRange) -> Self {
        Self {
            kind,
            attrs: IndexMap::new(),
            children: Vec::new(),
            range,
        }
    }

    /// Node without a meaningful source range, for trees built in code.
    pub fn detached(kind: K) -> Self {
        Self::new(kind, TextRange::default())
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ParseNode<K>) -> Self {
        self.children.push(child);
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn push_child(&mut self, child: ParseNode<K>) {
        self.children.push(child);
    }

    pub fn set_range(&mut self, range: TextRange) {
        self.range = range;
    }

    pub fn kind(&self) -> K {
        self.kind
    }

    pub fn children(&self) -> &[ParseNode<K>] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&ParseNode<K>> {
        self.children.get(index)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn is(&self, kind: K) -> bool {
        self.kind == kind
    }
}

/// Writes the node back in tree notation, on one line.
impl<K: NodeKind> fmt::Display for ParseNode<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.kind.name())?;
        for (name, value) in &self.attrs {
            write!(f, " {name}=")?;
            write_value(f, value)?;
        }
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let is_regex = value.len() >= 2 && value.starts_with('/') && value.ends_with('/');
    let is_bare = !value.is_empty()
        && !value.starts_with(['/', ';'])
        && !value.contains(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '=' | '"'));
    if is_regex || is_bare {
        return f.write_str(value);
    }
    f.write_str("\"")?;
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}
