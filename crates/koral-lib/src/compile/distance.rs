//! Gaps between sequence operands as distance constraints.
//!
//! A run of empty-token slots between two operands becomes one word
//! distance `1 + Σ slot`, where an unquantified slot is `{1,1}`. Slots at
//! the edges of a sequence have no neighbour to measure from and stay
//! (repeated) empty tokens.

use koral_core::{Boundary, Distance, MAXIMUM_DISTANCE, Node, Operation, Token};
use rowan::TextRange;

use crate::diagnostics::DiagnosticKind;

use super::Context;
use super::repetition::repeat;

/// One element of a sequence before folding.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceItem {
    Operand(Node),
    /// Empty-token slot with its quantifier range.
    Gap(Boundary),
}

/// Distance spanned by a run of slots.
pub fn gap_distance(slots: &[Boundary]) -> Boundary {
    slots
        .iter()
        .fold(Boundary::exact(1), |acc, slot| acc.add(*slot))
}

/// Clamps a boundary to [`MAXIMUM_DISTANCE`], warning when it had to.
pub fn crop(ctx: &mut Context, boundary: Boundary, range: TextRange) -> Boundary {
    let (cropped, changed) = boundary.crop(MAXIMUM_DISTANCE);
    if changed {
        ctx.report(DiagnosticKind::DistanceCropped, range)
            .message(boundary.to_string())
            .emit();
    }
    cropped
}

pub fn word_distance(ctx: &mut Context, boundary: Boundary, range: TextRange) -> Distance {
    Distance::new("w", crop(ctx, boundary, range))
}

/// Sequence of `operands` under the given distances.
///
/// Without distances this is plain concatenation.
pub fn sequence(distances: Vec<Distance>, in_order: bool, operands: Vec<Node>) -> Node {
    Node::group(
        Operation::Sequence {
            distances,
            in_order,
        },
        operands,
    )
}

fn plain(mut run: Vec<Node>) -> Option<Node> {
    match run.len() {
        0 => None,
        1 => run.pop(),
        _ => Some(sequence(Vec::new(), true, run)),
    }
}

fn empty_run(slots: &[Boundary]) -> Node {
    let total = slots
        .iter()
        .fold(Boundary::exact(0), |acc, slot| acc.add(*slot));
    repeat(total, Token::empty().into())
}

/// Folds sequence items into nested sequence groups.
///
/// Operands separated by nothing concatenate. A gap between two operands
/// closes the run so far into the left operand of a distance sequence:
/// `A B [] C` is `sequence w{2,2} [sequence [A, B], C]`.
pub fn fold_sequence(ctx: &mut Context, items: Vec<SequenceItem>, range: TextRange) -> Option<Node> {
    if !items
        .iter()
        .any(|item| matches!(item, SequenceItem::Operand(_)))
    {
        let slots: Vec<Boundary> = items
            .iter()
            .filter_map(|item| match item {
                SequenceItem::Gap(slot) => Some(*slot),
                SequenceItem::Operand(_) => None,
            })
            .collect();
        return (!slots.is_empty()).then(|| empty_run(&slots));
    }

    let mut run: Vec<Node> = Vec::new();
    let mut pending: Vec<Boundary> = Vec::new();
    for item in items {
        match item {
            SequenceItem::Gap(slot) => pending.push(slot),
            SequenceItem::Operand(node) => {
                if pending.is_empty() {
                    run.push(node);
                } else if run.is_empty() {
                    run.push(empty_run(&pending));
                    run.push(node);
                } else {
                    let distance = word_distance(ctx, gap_distance(&pending), range);
                    let left = plain(std::mem::take(&mut run))?;
                    run.push(sequence(vec![distance], true, vec![left, node]));
                }
                pending.clear();
            }
        }
    }
    if !pending.is_empty() {
        run.push(empty_run(&pending));
    }
    plain(run)
}

/// ANNIS precedence range `.n,m`, `.n`, `.*`.
///
/// Returns `None` for plain adjacency (no range given). A zero distance is
/// `MalformedQuery`.
pub fn annis_distance(
    ctx: &mut Context,
    min: Option<u32>,
    max: Option<u32>,
    star: bool,
    range: TextRange,
) -> Option<Option<Distance>> {
    if star {
        return Some(Some(Distance::new("w", Boundary::at_least(1))));
    }
    let Some(min) = min else {
        return Some(None);
    };
    let max = max.unwrap_or(min);
    if max == 0 {
        ctx.report(DiagnosticKind::MalformedQuery, range)
            .message("Distance may not be 0")
            .emit();
        return None;
    }
    let Some(boundary) = Boundary::new(min, Some(max)) else {
        ctx.report(DiagnosticKind::MalformedQuery, range)
            .message(format!("distance maximum {max} is below minimum {min}"))
            .emit();
        return None;
    };
    Some(Some(word_distance(ctx, boundary, range)))
}
