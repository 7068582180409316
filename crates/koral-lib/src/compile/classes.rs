//! Class numbers and the references that re-surface classed subtrees.

use std::collections::BTreeSet;

use koral_core::{ClassRefOp, Node, Operation, RefOperation, Reference};
use rowan::TextRange;

use crate::diagnostics::DiagnosticKind;

use super::Context;

/// Hands out class numbers for one compile.
///
/// Automatic numbers are the smallest ones not yet taken, so the first request
/// gets 0 unless a user class already claimed it.
#[derive(Debug, Clone, Default)]
pub struct ClassAllocator {
    used: BTreeSet<u32>,
}

impl ClassAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u32 {
        let mut n = 0;
        while self.used.contains(&n) {
            n += 1;
        }
        self.used.insert(n);
        n
    }

    /// Claims a user-supplied number. Returns false if it was already taken.
    pub fn reserve(&mut self, n: u32) -> bool {
        self.used.insert(n)
    }

    pub fn is_used(&self, n: u32) -> bool {
        self.used.contains(&n)
    }
}

pub fn wrap_class(class: u32, node: Node) -> Node {
    Node::group(Operation::Class(class), vec![node])
}

/// Allocates a fresh class and wraps `node` in it.
pub fn wrap_fresh(ctx: &mut Context, node: Node) -> (u32, Node) {
    let class = ctx.classes().allocate();
    (class, wrap_class(class, node))
}

/// Builds a focus or split over `operand`.
///
/// An empty `classes` list selects the first class found in the operand.
/// Every referenced class must occur in the operand; otherwise
/// `InvalidClassReference` is reported and `None` returned.
pub fn reference(
    ctx: &mut Context,
    operation: RefOperation,
    classes: Vec<u32>,
    intersect: bool,
    operand: Node,
    range: TextRange,
) -> Option<Node> {
    let defined = operand.classes();
    let classes = if classes.is_empty() {
        match defined.first() {
            Some(first) => vec![*first],
            None => {
                ctx.report(DiagnosticKind::InvalidClassReference, range)
                    .hint("wrap part of the operand in a class")
                    .emit();
                return None;
            }
        }
    } else {
        classes
    };

    if let Some(missing) = classes.iter().find(|n| !defined.contains(n)) {
        ctx.report(DiagnosticKind::InvalidClassReference, range)
            .message(missing.to_string())
            .emit();
        return None;
    }

    let class_ref_op = (intersect && classes.len() > 1).then_some(ClassRefOp::Intersection);
    Some(Node::Reference(Reference {
        operation,
        class_refs: classes,
        class_ref_op,
        span_ref: None,
        operands: vec![operand],
    }))
}

/// Reference to a class of an enclosing match, without an operand.
pub fn bare_reference(class: u32) -> Node {
    Node::Reference(Reference::focus(class, Vec::new()))
}
