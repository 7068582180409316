//! Folding relation chains over numbered operands.
//!
//! A statement declares operands and binary predicates over them by mention
//! index. Canonical groups are binary, so the predicates are folded into one
//! tree. Operands mentioned by more than one predicate are classed when first
//! consumed; later predicates reach them again through a focus on that class.
//!
//! ```text
//! #1 > #2 > #3   =>   relation
//!                       focus 0
//!                         relation
//!                           #1
//!                           class 0
//!                             #2
//!                       #3
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use koral_core::{Node, Reference};
use rowan::TextRange;
use tracing::trace;

use crate::Result;
use crate::diagnostics::DiagnosticKind;

use super::Context;
use super::classes::{bare_reference, wrap_fresh};

/// Binary predicate between two mentions (1-based).
#[derive(Debug, Clone)]
pub struct Predicate<Op> {
    pub left: usize,
    pub right: usize,
    pub op: Op,
    pub range: TextRange,
}

/// Fold state: the tree built so far and which mentions it contains.
#[derive(Debug, Default)]
pub struct Accumulator {
    current: Option<Node>,
    consumed: HashSet<usize>,
    classes: HashMap<usize, u32>,
}

impl Accumulator {
    pub fn current(&self) -> Option<&Node> {
        self.current.as_ref()
    }

    pub fn is_consumed(&self, mention: usize) -> bool {
        self.consumed.contains(&mention)
    }

    pub fn class_of(&self, mention: usize) -> Option<u32> {
        self.classes.get(&mention).copied()
    }
}

/// Folds `predicates` over `operands` (keyed by mention index).
///
/// `combine` builds the operator-specific node for one predicate from its
/// already prepared left and right operands. It returns `Ok(None)` when it
/// reported a problem and the statement cannot be built.
pub fn fold_chain<Op, F>(
    ctx: &mut Context,
    mut operands: IndexMap<usize, Node>,
    predicates: Vec<Predicate<Op>>,
    range: TextRange,
    mut combine: F,
) -> Result<Option<Node>>
where
    F: FnMut(&mut Context, &Op, Node, Node) -> Result<Option<Node>>,
{
    if predicates.is_empty() {
        if operands.len() == 1 {
            return Ok(operands.pop().map(|(_, node)| node));
        }
        if !operands.is_empty() {
            ctx.report(DiagnosticKind::UnboundRelation, range)
                .message("operands must be connected by a relation")
                .emit();
        }
        return Ok(None);
    }

    let mut mentions: HashMap<usize, usize> = HashMap::new();
    for predicate in &predicates {
        for mention in [predicate.left, predicate.right] {
            if !operands.contains_key(&mention) {
                ctx.report(DiagnosticKind::MalformedQuery, predicate.range)
                    .message(format!("operand #{mention} is not declared"))
                    .emit();
                return Ok(None);
            }
            *mentions.entry(mention).or_default() += 1;
        }
    }
    let declared: Vec<usize> = operands.keys().copied().collect();

    let mut acc = Accumulator::default();
    let mut queue: VecDeque<Predicate<Op>> = predicates.into();
    let mut stalled = 0;

    while let Some(predicate) = queue.pop_front() {
        let (left, right) = (predicate.left, predicate.right);
        let operands_for_step = match acc.current.take() {
            None => {
                let l = take_operand(ctx, &mut operands, &mentions, &mut acc, left);
                let r = take_operand(ctx, &mut operands, &mentions, &mut acc, right);
                l.zip(r)
            }
            Some(current) => match (acc.is_consumed(left), acc.is_consumed(right)) {
                (false, false) => {
                    acc.current = Some(current);
                    stalled += 1;
                    if stalled > queue.len() {
                        ctx.report(DiagnosticKind::UnboundRelation, predicate.range)
                            .message(format!(
                                "relation between #{left} and #{right} is not connected to the rest of the query"
                            ))
                            .emit();
                        return Ok(None);
                    }
                    trace!(left, right, "predicate requeued");
                    queue.push_back(predicate);
                    continue;
                }
                (true, false) => {
                    let focus = focus_on(&acc, left, current);
                    let r = take_operand(ctx, &mut operands, &mentions, &mut acc, right);
                    focus.zip(r)
                }
                (false, true) => {
                    let focus = focus_on(&acc, right, current);
                    let l = take_operand(ctx, &mut operands, &mentions, &mut acc, left);
                    l.zip(focus)
                }
                (true, true) => {
                    let focus = focus_on(&acc, left, current);
                    let bare = acc.class_of(right).map(bare_reference);
                    focus.zip(bare)
                }
            },
        };
        stalled = 0;

        let Some((l, r)) = operands_for_step else {
            ctx.report(DiagnosticKind::UnboundRelation, predicate.range)
                .message(format!("operand of #{left} and #{right} cannot be bound twice"))
                .emit();
            return Ok(None);
        };
        trace!(left, right, "fold step");
        let Some(node) = combine(ctx, &predicate.op, l, r)? else {
            return Ok(None);
        };
        acc.consumed.insert(left);
        acc.consumed.insert(right);
        acc.current = Some(node);
    }

    if let Some(unbound) = declared.iter().find(|m| !acc.is_consumed(**m)) {
        ctx.report(DiagnosticKind::UnboundRelation, range)
            .message(format!("operand #{unbound} is not bound by any relation"))
            .emit();
        return Ok(None);
    }
    Ok(acc.current)
}

/// Moves a declared operand into the fold, classing it if it is mentioned
/// again later.
fn take_operand(
    ctx: &mut Context,
    operands: &mut IndexMap<usize, Node>,
    mentions: &HashMap<usize, usize>,
    acc: &mut Accumulator,
    mention: usize,
) -> Option<Node> {
    let node = operands.shift_remove(&mention)?;
    if mentions.get(&mention).copied().unwrap_or(0) < 2 {
        return Some(node);
    }
    let (class, node) = wrap_fresh(ctx, node);
    trace!(mention, class, "operand classed");
    acc.classes.insert(mention, class);
    Some(node)
}

fn focus_on(acc: &Accumulator, mention: usize, current: Node) -> Option<Node> {
    let class = acc.class_of(mention)?;
    Some(Node::Reference(Reference::focus(class, vec![current])))
}
