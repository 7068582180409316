//! Poliqarp+ driver.
//!
//! ```text
//! [base=Mann][]?{1:[p=VVFIN]}   =>   (sequence
//!                                      (token (term layer=base key=Mann))
//!                                      (repetition q=? (token))
//!                                      (class id=1 (token (term layer=p key=VVFIN))))
//! ```

use koral_core::frames::POLIQARP_FRAMES;
use koral_core::layers::POLIQARP_LAYERS;
use koral_core::{
    BooleanOp, Boundary, Frame, Node, Operation, RefOperation, Reference, Relation, Span, SpanRef,
    Term, Token, Wrap,
};

use crate::Result;
use crate::compile::Context;
use crate::compile::classes::{reference, wrap_class};
use crate::compile::distance::{SequenceItem, fold_sequence};
use crate::compile::frames::{map_frames, position};
use crate::compile::negation::negate_wrap;
use crate::compile::repetition::{quantifier_boundary, quantify};
use crate::compile::term::{TermSpec, resolve_foundry, resolve_layer, span_term, token_term};
use crate::diagnostics::DiagnosticKind;
use crate::node_kinds;
use crate::tree::{NodeKind, ParseNode};

use super::{number_attr, report_malformed, required_attr, required_child, reserve_user_classes};

node_kinds! {
    pub enum PoliqarpKind {
        Token => "token",
        Term => "term",
        TermGroup => "termGroup",
        Not => "not",
        Span => "span",
        Sequence => "sequence",
        Repetition => "repetition",
        Disjunction => "disjunction",
        Position => "position",
        Class => "class",
        Focus => "focus",
        Split => "split",
        Submatch => "submatch",
        Within => "within",
        Relation => "relation",
        Meta => "meta",
    }
}

pub type PoliqarpNode = ParseNode<PoliqarpKind>;

/// Class number of `{...}` without an explicit number.
const DEFAULT_CLASS: u32 = 1;

pub fn compile(ctx: &mut Context, root: &PoliqarpNode) -> Result<Option<Node>> {
    reserve_user_classes(ctx, root, PoliqarpKind::Class, DEFAULT_CLASS);
    node(ctx, root)
}

fn node(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    ctx.guarded(|ctx| match pn.kind() {
        PoliqarpKind::Token => token(ctx, pn),
        PoliqarpKind::Term | PoliqarpKind::TermGroup => {
            Ok(wrap(ctx, pn, Role::Token)?.map(|w| Token::new(w).into()))
        }
        PoliqarpKind::Not => not(ctx, pn),
        PoliqarpKind::Span => span(ctx, pn),
        PoliqarpKind::Sequence => sequence(ctx, pn),
        PoliqarpKind::Repetition => repetition(ctx, pn),
        PoliqarpKind::Disjunction => disjunction(ctx, pn),
        PoliqarpKind::Position => position_group(ctx, pn),
        PoliqarpKind::Class => class(ctx, pn),
        PoliqarpKind::Focus => focus(ctx, pn, RefOperation::Focus),
        PoliqarpKind::Split => focus(ctx, pn, RefOperation::Split),
        PoliqarpKind::Submatch => submatch(ctx, pn),
        PoliqarpKind::Within => within(ctx, pn),
        PoliqarpKind::Relation => relation(ctx, pn),
        PoliqarpKind::Meta => {
            ctx.report(DiagnosticKind::DeprecatedQueryElement, pn.range())
                .message("meta")
                .hint("restrict the corpus with a collection filter")
                .emit();
            Ok(None)
        }
    })
}

/// Whether a term is built for a token or as a span attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Token,
    Attribute,
}

fn token(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    match pn.child(0) {
        None => Ok(Some(Token::empty().into())),
        Some(child) => Ok(wrap(ctx, child, Role::Token)?.map(|w| Token::new(w).into())),
    }
}

fn not(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let Some(child) = required_child(ctx, pn, 0) else {
        return Ok(None);
    };
    if child.is(PoliqarpKind::Token) && child.children().is_empty() {
        report_malformed(ctx, pn.range(), "an empty token cannot be negated".into());
        return Ok(None);
    }
    Ok(wrap(ctx, pn, Role::Token)?.map(|w| Token::new(w).into()))
}

fn wrap(ctx: &mut Context, pn: &PoliqarpNode, role: Role) -> Result<Option<Wrap>> {
    ctx.guarded(|ctx| match pn.kind() {
        PoliqarpKind::Term => Ok(term(ctx, pn, role).map(Wrap::from)),
        PoliqarpKind::TermGroup => {
            let op = match pn.attr("op") {
                Some("and" | "&") => BooleanOp::And,
                Some("or" | "|") => BooleanOp::Or,
                other => {
                    report_malformed(
                        ctx,
                        pn.range(),
                        format!("unknown term group operator `{}`", other.unwrap_or("")),
                    );
                    return Ok(None);
                }
            };
            let mut operands = Vec::with_capacity(pn.children().len());
            for child in pn.children() {
                let Some(operand) = wrap(ctx, child, role)? else {
                    return Ok(None);
                };
                operands.push(operand);
            }
            if operands.len() < 2 {
                report_malformed(ctx, pn.range(), "a term group needs two operands".into());
                return Ok(None);
            }
            Ok(Wrap::combine(op, operands))
        }
        PoliqarpKind::Not => {
            let Some(child) = required_child(ctx, pn, 0) else {
                return Ok(None);
            };
            Ok(wrap(ctx, child, role)?.map(negate_wrap))
        }
        PoliqarpKind::Token if !pn.children().is_empty() => wrap(ctx, &pn.children()[0], role),
        _ => {
            report_malformed(
                ctx,
                pn.range(),
                format!("`{}` cannot be used as a term", pn.kind().name()),
            );
            Ok(None)
        }
    })
}

fn term(ctx: &mut Context, pn: &PoliqarpNode, role: Role) -> Option<Term> {
    let key = required_attr(ctx, pn, "key")?;
    let negated = match pn.attr("op") {
        None | Some("=") => false,
        Some("!=") => true,
        Some(other) => {
            ctx.report(DiagnosticKind::UnknownQueryElement, pn.range())
                .message(other)
                .emit();
            return None;
        }
    };
    let spec = TermSpec {
        foundry: pn.attr("foundry"),
        layer: pn.attr("layer"),
        key,
        value: pn.attr("value"),
        negated,
        flags: pn.attr("flags"),
    };
    match role {
        Role::Token => token_term(ctx, &POLIQARP_LAYERS, &spec, pn.range()),
        Role::Attribute => span_term(ctx, &POLIQARP_LAYERS, &spec, pn.range()),
    }
}

fn span(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let Some(element) = term(ctx, pn, Role::Attribute) else {
        return Ok(None);
    };
    let mut span = Span::new(element);
    if let Some(child) = pn.child(0) {
        let Some(attr) = wrap(ctx, child, Role::Attribute)? else {
            return Ok(None);
        };
        span = span.with_attr(attr);
    }
    Ok(Some(span.into()))
}

/// An empty token, possibly quantified, stands for a gap.
fn gap(ctx: &mut Context, pn: &PoliqarpNode) -> Option<Option<Boundary>> {
    let is_empty_token = |n: &PoliqarpNode| n.is(PoliqarpKind::Token) && n.children().is_empty();
    if is_empty_token(pn) {
        return Some(Some(Boundary::exact(1)));
    }
    if pn.is(PoliqarpKind::Repetition)
        && pn.children().len() == 1
        && is_empty_token(&pn.children()[0])
    {
        let q = required_attr(ctx, pn, "q")?;
        return Some(Some(quantifier_boundary(ctx, q, pn.range())?));
    }
    Some(None)
}

fn sequence(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let mut items = Vec::with_capacity(pn.children().len());
    for child in pn.children() {
        match gap(ctx, child) {
            Some(Some(slot)) => items.push(SequenceItem::Gap(slot)),
            Some(None) => {
                if let Some(operand) = node(ctx, child)? {
                    items.push(SequenceItem::Operand(operand));
                }
            }
            None => {}
        }
    }
    Ok(fold_sequence(ctx, items, pn.range()))
}

fn repetition(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let (Some(q), Some(child)) = (required_attr(ctx, pn, "q"), required_child(ctx, pn, 0)) else {
        return Ok(None);
    };
    let Some(operand) = node(ctx, child)? else {
        return Ok(None);
    };
    Ok(quantify(ctx, q, operand, pn.range()))
}

fn disjunction(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let mut operands = Vec::with_capacity(pn.children().len());
    for child in pn.children() {
        if let Some(operand) = node(ctx, child)? {
            operands.push(operand);
        }
    }
    Ok(match operands.len() {
        0 => None,
        1 => operands.pop(),
        _ => Some(Node::group(Operation::Disjunction, operands)),
    })
}

/// Compiles the first two children. `None` if either is missing or failed.
fn two_operands(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<(Node, Node)>> {
    let (Some(left), Some(right)) = (required_child(ctx, pn, 0), required_child(ctx, pn, 1))
    else {
        return Ok(None);
    };
    let left = node(ctx, left)?;
    let right = node(ctx, right)?;
    Ok(left.zip(right))
}

fn position_group(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let Some(frame) = required_attr(ctx, pn, "frame") else {
        return Ok(None);
    };
    let Some(frames) = map_frames(ctx, &POLIQARP_FRAMES, frame, pn.range()) else {
        return Ok(None);
    };
    let Some((left, right)) = two_operands(ctx, pn)? else {
        return Ok(None);
    };
    Ok(Some(position(frames, false, vec![left, right])))
}

fn class(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let Some(id) = number_attr::<_, u32>(ctx, pn, "id") else {
        return Ok(None);
    };
    let Some(child) = required_child(ctx, pn, 0) else {
        return Ok(None);
    };
    let operand = node(ctx, child)?;
    Ok(operand.map(|operand| wrap_class(id.unwrap_or(DEFAULT_CLASS), operand)))
}

/// `1|2` intersects, `1,2` lists.
fn class_list(ctx: &mut Context, pn: &PoliqarpNode) -> Option<(Vec<u32>, bool)> {
    let Some(text) = pn.attr("classes") else {
        return Some((Vec::new(), false));
    };
    let intersect = text.contains('|');
    let mut classes = Vec::new();
    for part in text.split(['|', ',']) {
        match part.trim().parse() {
            Ok(n) => classes.push(n),
            Err(_) => {
                report_malformed(ctx, pn.range(), format!("`{text}` is not a class list"));
                return None;
            }
        }
    }
    Some((classes, intersect))
}

fn focus(ctx: &mut Context, pn: &PoliqarpNode, operation: RefOperation) -> Result<Option<Node>> {
    let Some((classes, intersect)) = class_list(ctx, pn) else {
        return Ok(None);
    };
    let Some(child) = required_child(ctx, pn, 0) else {
        return Ok(None);
    };
    let Some(operand) = node(ctx, child)? else {
        return Ok(None);
    };
    Ok(reference(ctx, operation, classes, intersect, operand, pn.range()))
}

fn submatch(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let Some(start) = number_attr::<_, i32>(ctx, pn, "start") else {
        return Ok(None);
    };
    let Some(length) = number_attr::<_, u32>(ctx, pn, "length") else {
        return Ok(None);
    };
    let Some(start) = start else {
        report_malformed(ctx, pn.range(), "`submatch` needs the attribute `start`".into());
        return Ok(None);
    };
    let Some(child) = required_child(ctx, pn, 0) else {
        return Ok(None);
    };
    let operand = node(ctx, child)?;
    Ok(operand.map(|operand| Reference::span(SpanRef { start, length }, operand).into()))
}

fn within(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let (Some(name), Some(child)) = (required_attr(ctx, pn, "span"), required_child(ctx, pn, 0))
    else {
        return Ok(None);
    };
    let Some(element) = span_term(ctx, &POLIQARP_LAYERS, &TermSpec::new(name), pn.range()) else {
        return Ok(None);
    };
    let Some(operand) = node(ctx, child)? else {
        return Ok(None);
    };
    Ok(Some(position(
        vec![Frame::IsAround],
        false,
        vec![Span::new(element).into(), operand],
    )))
}

fn relation(ctx: &mut Context, pn: &PoliqarpNode) -> Result<Option<Node>> {
    let Some(kind) = required_attr(ctx, pn, "type") else {
        return Ok(None);
    };
    let layer = match kind {
        "dominates" => "c",
        "relatesTo" => "d",
        other => {
            ctx.report(DiagnosticKind::UnknownQueryElement, pn.range())
                .message(other)
                .emit();
            return Ok(None);
        }
    };

    let mut term = Term::layer_only(layer);
    if let Some(name) = pn.attr("layer") {
        let Some(resolved) = resolve_layer(ctx, &POLIQARP_LAYERS, name, pn.range()) else {
            return Ok(None);
        };
        term.layer = Some(resolved.code.to_string());
    }
    if let Some(name) = pn.attr("foundry") {
        let Some(foundry) = resolve_foundry(ctx, name, pn.range()) else {
            return Ok(None);
        };
        term.foundry = Some(foundry);
    }
    if let Some(key) = pn.attr("key") {
        term.key = key.to_string();
    }

    let (Some(min), Some(max)) = (
        number_attr::<_, u32>(ctx, pn, "min"),
        number_attr::<_, u32>(ctx, pn, "max"),
    ) else {
        return Ok(None);
    };
    let boundary = match (min, max) {
        (None, None) => None,
        (min, max) => match Boundary::new(min.unwrap_or(0), max) {
            Some(boundary) => Some(boundary),
            None => {
                report_malformed(ctx, pn.range(), "relation maximum is below its minimum".into());
                return Ok(None);
            }
        },
    };

    let Some((left, right)) = two_operands(ctx, pn)? else {
        return Ok(None);
    };
    Ok(Some(Node::group(
        Operation::Relation(Relation {
            wrap: Some(term),
            boundary,
        }),
        vec![left, right],
    )))
}
