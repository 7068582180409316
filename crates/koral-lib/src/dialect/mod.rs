//! Content query drivers, one per dialect.
//!
//! Each driver walks the parse tree of its dialect once, with one exhaustive
//! match over the dialect's node kinds, and builds the canonical graph with
//! the builders of [`crate::compile`].

pub mod annis;
pub mod cosmas;
pub mod cqp;
pub mod poliqarp;

#[cfg(test)]
mod annis_tests;
#[cfg(test)]
mod poliqarp_tests;

use std::fmt;
use std::str::FromStr;

use rowan::TextRange;

use crate::compile::Context;
use crate::diagnostics::DiagnosticKind;
use crate::tree::{NodeKind, ParseNode};

pub use annis::AnnisKind;
pub use cosmas::CosmasKind;
pub use cqp::CqpKind;
pub use poliqarp::PoliqarpKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Poliqarp,
    Annis,
    Cosmas,
    Cqp,
}

impl Dialect {
    /// Accepted names, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "poliqarp" | "poliqarpplus" => Some(Self::Poliqarp),
            "annis" | "aql" => Some(Self::Annis),
            "cosmas2" | "cosmas" => Some(Self::Cosmas),
            "cqp" => Some(Self::Cqp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poliqarp => "poliqarpplus",
            Self::Annis => "annis",
            Self::Cosmas => "cosmas2",
            Self::Cqp => "cqp",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name that matches no supported dialect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a supported query language")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownDialect(s.to_string()))
    }
}

/// Required attribute, `MalformedQuery` when missing.
pub(crate) fn required_attr<'a, K: NodeKind>(
    ctx: &mut Context,
    node: &'a ParseNode<K>,
    name: &str,
) -> Option<&'a str> {
    let value = node.attr(name);
    if value.is_none() {
        ctx.report(DiagnosticKind::MalformedQuery, node.range())
            .message(format!("`{}` needs the attribute `{name}`", node.kind().name()))
            .emit();
    }
    value
}

/// Child at `index`, `MalformedQuery` when missing.
pub(crate) fn required_child<'a, K: NodeKind>(
    ctx: &mut Context,
    node: &'a ParseNode<K>,
    index: usize,
) -> Option<&'a ParseNode<K>> {
    let child = node.child(index);
    if child.is_none() {
        ctx.report(DiagnosticKind::MalformedQuery, node.range())
            .message(format!(
                "`{}` needs at least {} operand{}",
                node.kind().name(),
                index + 1,
                if index == 0 { "" } else { "s" }
            ))
            .emit();
    }
    child
}

/// Attribute parsed as a number, `MalformedQuery` when it is not one.
pub(crate) fn number_attr<K: NodeKind, T: FromStr>(
    ctx: &mut Context,
    node: &ParseNode<K>,
    name: &str,
) -> Option<Option<T>> {
    let Some(text) = node.attr(name) else {
        return Some(None);
    };
    match text.trim().parse() {
        Ok(value) => Some(Some(value)),
        Err(_) => {
            report_malformed(
                ctx,
                node.range(),
                format!("`{name}={text}` is not a number"),
            );
            None
        }
    }
}

pub(crate) fn report_malformed(ctx: &mut Context, range: TextRange, message: String) {
    ctx.report(DiagnosticKind::MalformedQuery, range)
        .message(message)
        .emit();
}

/// Claims the numbers of all user classes up front so that automatic
/// numbers never collide with a class written later in the query.
pub(crate) fn reserve_user_classes<K: NodeKind>(
    ctx: &mut Context,
    root: &ParseNode<K>,
    class: K,
    default: u32,
) {
    let mut stack = vec![root];
    while let Some(pn) = stack.pop() {
        if pn.is(class) {
            let id = match pn.attr("id") {
                Some(id) => id.trim().parse().ok(),
                None => Some(default),
            };
            if let Some(id) = id {
                ctx.classes().reserve(id);
            }
        }
        stack.extend(pn.children());
    }
}
