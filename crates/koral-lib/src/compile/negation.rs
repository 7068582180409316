//! Negation pushed down to the leaves.
//!
//! A negated group becomes its De Morgan dual over negated operands, a
//! negated leaf gets the inverse match operator. Both steps are their own
//! inverse, so two negations meeting anywhere in a tree cancel.

use koral_core::{DocGroup, Filter, Term, TermGroup, Wrap};
use rowan::TextRange;

use crate::diagnostics::DiagnosticKind;

use super::Context;

pub fn negate_term(term: Term) -> Term {
    let match_op = term.match_op.inverse();
    term.with_match(match_op)
}

pub fn negate_wrap(wrap: Wrap) -> Wrap {
    match wrap {
        Wrap::Term(term) => Wrap::Term(negate_term(term)),
        Wrap::Group(group) => Wrap::Group(TermGroup {
            op: group.op.dual(),
            operands: group.operands.into_iter().map(negate_wrap).collect(),
        }),
    }
}

/// Negates a filter. Named sub-collections cannot be negated.
pub fn negate_filter(ctx: &mut Context, filter: Filter, range: TextRange) -> Option<Filter> {
    match filter {
        Filter::Doc(mut doc) => {
            doc.match_op = doc.match_op.inverse();
            Some(Filter::Doc(doc))
        }
        Filter::Group(group) => {
            let mut operands = Vec::with_capacity(group.operands.len());
            for operand in group.operands {
                operands.push(negate_filter(ctx, operand, range)?);
            }
            Some(Filter::Group(DocGroup {
                op: group.op.dual(),
                operands,
            }))
        }
        Filter::Ref(name) => {
            ctx.report(DiagnosticKind::MalformedQuery, range)
                .message(format!("the collection reference `{name}` cannot be negated"))
                .emit();
            None
        }
    }
}
