//! Corpus filter driver.
//!
//! Builds the metadata restriction of a request: boolean groups over
//! `key op value` predicates and references to stored sub-collections.
//!
//! ```text
//! pubDate since 2014 & author=Goethe | referTo frag-1
//!
//! (or
//!   (and
//!     (doc key=pubDate op=since value=2014)
//!     (doc key=author op="=" value=Goethe))
//!   (ref name=frag-1))
//! ```

#[cfg(test)]
mod mod_tests;

use koral_core::{BooleanOp, Doc, DocGroup, Filter, MatchOperator, ValueType};

use crate::Result;
use crate::compile::Context;
use crate::compile::negation::negate_filter;
use crate::compile::term::{LiteralShape, literal_shape, type_literal};
use crate::diagnostics::DiagnosticKind;
use crate::dialect::{report_malformed, required_attr, required_child};
use crate::node_kinds;
use crate::tree::ParseNode;

node_kinds! {
    pub enum FilterKind {
        And => "and",
        Or => "or",
        Not => "not",
        Doc => "doc",
        Ref => "ref",
    }
}

pub type FilterNode = ParseNode<FilterKind>;

pub fn compile(ctx: &mut Context, root: &FilterNode) -> Result<Option<Filter>> {
    filter(ctx, root)
}

fn filter(ctx: &mut Context, pn: &FilterNode) -> Result<Option<Filter>> {
    ctx.guarded(|ctx| match pn.kind() {
        FilterKind::And => group(ctx, pn, BooleanOp::And),
        FilterKind::Or => group(ctx, pn, BooleanOp::Or),
        FilterKind::Not => {
            let Some(child) = required_child(ctx, pn, 0) else {
                return Ok(None);
            };
            let Some(operand) = filter(ctx, child)? else {
                return Ok(None);
            };
            Ok(negate_filter(ctx, operand, pn.range()))
        }
        FilterKind::Doc => Ok(doc(ctx, pn).map(Filter::Doc)),
        FilterKind::Ref => Ok(required_attr(ctx, pn, "name").map(|name| Filter::Ref(name.into()))),
    })
}

/// Operands of an n-ary group nest to the right: `a & b & c` is
/// `and[a, and[b, c]]`.
fn group(ctx: &mut Context, pn: &FilterNode, op: BooleanOp) -> Result<Option<Filter>> {
    let mut operands = Vec::with_capacity(pn.children().len());
    for child in pn.children() {
        let Some(operand) = filter(ctx, child)? else {
            return Ok(None);
        };
        operands.push(operand);
    }
    let Some(mut acc) = operands.pop() else {
        report_malformed(ctx, pn.range(), format!("empty `{}` group", op.as_str()));
        return Ok(None);
    };
    while let Some(left) = operands.pop() {
        acc = Filter::Group(DocGroup {
            op,
            operands: vec![left, acc],
        });
    }
    Ok(Some(acc))
}

fn doc(ctx: &mut Context, pn: &FilterNode) -> Option<Doc> {
    let key = required_attr(ctx, pn, "key")?;
    let op = required_attr(ctx, pn, "op")?;
    let value = required_attr(ctx, pn, "value")?;

    let (match_op, date_only) = match op {
        "=" => (MatchOperator::Eq, false),
        "!=" => (MatchOperator::Ne, false),
        "~" => (MatchOperator::Contains, false),
        "!~" => (MatchOperator::NotContains, false),
        "<" => (MatchOperator::Lt, false),
        ">" => (MatchOperator::Gt, false),
        "<=" => (MatchOperator::Leq, false),
        ">=" => (MatchOperator::Geq, false),
        "in" | "on" => (MatchOperator::Eq, true),
        "since" => (MatchOperator::Geq, true),
        "until" => (MatchOperator::Leq, true),
        other => {
            ctx.report(DiagnosticKind::UnknownQueryElement, pn.range())
                .message(other)
                .emit();
            return None;
        }
    };

    let (value, value_type) = if date_only {
        if !matches!(literal_shape(value), LiteralShape::Date | LiteralShape::Year) {
            report_malformed(
                ctx,
                pn.range(),
                format!("`{op}` needs a date, found `{value}`"),
            );
            return None;
        }
        (value.to_string(), ValueType::Date)
    } else {
        type_literal(ctx, match_op, value, pn.range())?
    };

    Some(Doc {
        key: key.to_string(),
        value,
        value_type,
        match_op,
    })
}
