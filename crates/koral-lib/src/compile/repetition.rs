//! Quantifiers to repetition groups.

use koral_core::{Boundary, Node, Operation};
use rowan::TextRange;

use crate::diagnostics::DiagnosticKind;

use super::Context;

/// Quantifier syntax: `?`, `*`, `+`, `{n}`, `{n,m}`, `{,m}`, `{n,}`.
///
/// Returns the raw `(min, max)` pair; `None` when the text is not a
/// quantifier at all. A pair with `max < min` is returned as written.
pub fn parse_quantifier(text: &str) -> Option<(u32, Option<u32>)> {
    match text.trim() {
        "?" => return Some((0, Some(1))),
        "*" => return Some((0, None)),
        "+" => return Some((1, None)),
        _ => {}
    }
    let inner = text.trim().strip_prefix('{')?.strip_suffix('}')?;
    let number = |s: &str| s.trim().parse::<u32>().ok();
    match inner.split_once(',') {
        None => {
            let n = number(inner)?;
            Some((n, Some(n)))
        }
        Some((min, max)) => {
            let min = if min.trim().is_empty() { 0 } else { number(min)? };
            let max = if max.trim().is_empty() {
                None
            } else {
                Some(number(max)?)
            };
            if max.is_none() && inner.trim() == "," {
                return None;
            }
            Some((min, max))
        }
    }
}

/// Parses and checks a quantifier, reporting `MalformedQuery` on failure.
pub fn quantifier_boundary(ctx: &mut Context, text: &str, range: TextRange) -> Option<Boundary> {
    let Some((min, max)) = parse_quantifier(text) else {
        ctx.report(DiagnosticKind::MalformedQuery, range)
            .message(format!("`{text}` is not a valid quantifier"))
            .emit();
        return None;
    };
    let boundary = Boundary::new(min, max);
    if boundary.is_none() {
        ctx.report(DiagnosticKind::MalformedQuery, range)
            .message(format!("maximum is below minimum in `{text}`"))
            .emit();
    }
    boundary
}

/// Wraps `node` in a repetition; `{1,1}` leaves it untouched.
pub fn repeat(boundary: Boundary, node: Node) -> Node {
    if boundary == Boundary::exact(1) {
        return node;
    }
    Node::group(Operation::Repetition(boundary), vec![node])
}

pub fn quantify(ctx: &mut Context, text: &str, node: Node, range: TextRange) -> Option<Node> {
    let boundary = quantifier_boundary(ctx, text, range)?;
    Some(repeat(boundary, node))
}
