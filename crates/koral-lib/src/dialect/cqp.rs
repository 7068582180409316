//! CQP driver.
//!
//! ```text
//! <s> "copil" []{,5} "cuminte"   =>   (sequence
//!                                        (open key=s)
//!                                        (token (term key=copil))
//!                                        (repetition q={,5} (token))
//!                                        (token (term key=cuminte)))
//! ```
//!
//! Token values are regular expressions unless the `l` flag asks for a
//! literal. Structure tags inside a sequence delimit regions: a matching pair
//! encloses its operands, an unpaired start tag anchors the next operand and
//! an unpaired end tag the previous one.

use koral_core::frames::POLIQARP_FRAMES;
use koral_core::layers::CQP_LAYERS;
use koral_core::{
    BooleanOp, Boundary, Distance, Frame, Node, Operation, RefOperation, Span, Term, Token, Wrap,
};
use rowan::TextRange;

use crate::Result;
use crate::compile::Context;
use crate::compile::classes::{reference, wrap_class};
use crate::compile::distance::{sequence, word_distance};
use crate::compile::frames::{map_frames, position};
use crate::compile::negation::negate_wrap;
use crate::compile::repetition::quantify;
use crate::compile::term::{TermSpec, regex_body, span_term, token_term};
use crate::diagnostics::DiagnosticKind;
use crate::node_kinds;
use crate::tree::{NodeKind, ParseNode};

use super::{number_attr, report_malformed, required_attr, required_child, reserve_user_classes};

node_kinds! {
    pub enum CqpKind {
        Token => "token",
        Term => "term",
        TermGroup => "termGroup",
        Not => "not",
        Region => "region",
        Open => "open",
        Close => "close",
        Sequence => "sequence",
        Repetition => "repetition",
        Disjunction => "disjunction",
        Position => "position",
        Class => "class",
        Within => "within",
        Meet => "meet",
    }
}

pub type CqpNode = ParseNode<CqpKind>;

const DEFAULT_CLASS: u32 = 1;

pub fn compile(ctx: &mut Context, root: &CqpNode) -> Result<Option<Node>> {
    reserve_user_classes(ctx, root, CqpKind::Class, DEFAULT_CLASS);
    node(ctx, root)
}

fn node(ctx: &mut Context, pn: &CqpNode) -> Result<Option<Node>> {
    ctx.guarded(|ctx| match pn.kind() {
        CqpKind::Token => match pn.child(0) {
            None => Ok(Some(Token::empty().into())),
            Some(child) => Ok(wrap(ctx, child, Role::Token)?.map(|w| Token::new(w).into())),
        },
        CqpKind::Term | CqpKind::TermGroup | CqpKind::Not => {
            Ok(wrap(ctx, pn, Role::Token)?.map(|w| Token::new(w).into()))
        }
        CqpKind::Region => Ok(tag(ctx, pn)?.map(Node::from)),
        CqpKind::Open | CqpKind::Close => regions(ctx, std::slice::from_ref(pn)),
        CqpKind::Sequence => regions(ctx, pn.children()),
        CqpKind::Repetition => {
            let (Some(q), Some(child)) = (required_attr(ctx, pn, "q"), required_child(ctx, pn, 0))
            else {
                return Ok(None);
            };
            let Some(operand) = node(ctx, child)? else {
                return Ok(None);
            };
            Ok(quantify(ctx, q, operand, pn.range()))
        }
        CqpKind::Disjunction => {
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
        CqpKind::Position => position_group(ctx, pn),
        CqpKind::Class => {
            let Some(id) = number_attr::<_, u32>(ctx, pn, "id") else {
                return Ok(None);
            };
            let Some(child) = required_child(ctx, pn, 0) else {
                return Ok(None);
            };
            let operand = node(ctx, child)?;
            Ok(operand.map(|operand| wrap_class(id.unwrap_or(DEFAULT_CLASS), operand)))
        }
        CqpKind::Within => within(ctx, pn),
        CqpKind::Meet => {
            let class = ctx.classes().allocate();
            let Some(body) = meet(ctx, pn, Some(class), false)? else {
                return Ok(None);
            };
            Ok(reference(
                ctx,
                RefOperation::Focus,
                vec![class],
                false,
                body,
                pn.range(),
            ))
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Token,
    Attribute,
}

fn wrap(ctx: &mut Context, pn: &CqpNode, role: Role) -> Result<Option<Wrap>> {
    ctx.guarded(|ctx| match pn.kind() {
        CqpKind::Term => Ok(term(ctx, pn, role).map(Wrap::from)),
        CqpKind::TermGroup => {
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
        CqpKind::Not => {
            let Some(child) = required_child(ctx, pn, 0) else {
                return Ok(None);
            };
            Ok(wrap(ctx, child, role)?.map(negate_wrap))
        }
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

/// CQP flag letters: `c` ignores case, `d` diacritics, `l` reads the value
/// literally. Returns the remaining letters in term flag syntax.
fn flag_letters(flags: &str) -> (String, bool) {
    let literal = flags.contains('l');
    let letters = flags
        .chars()
        .filter(|c| *c != 'l')
        .map(|c| if c == 'c' { 'i' } else { c })
        .collect();
    (letters, literal)
}

fn as_regex(text: &str) -> String {
    if text.is_empty() || regex_body(text).is_some() {
        return text.to_string();
    }
    format!("/{text}/")
}

fn term(ctx: &mut Context, pn: &CqpNode, role: Role) -> Option<Term> {
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
    let (letters, literal) = flag_letters(pn.attr("flags").unwrap_or(""));
    let regex = role == Role::Token && !literal;
    let (key, value) = if regex {
        (as_regex(key), pn.attr("value").map(as_regex))
    } else {
        (key.to_string(), pn.attr("value").map(String::from))
    };

    let spec = TermSpec {
        foundry: pn.attr("foundry"),
        layer: pn.attr("layer"),
        key: &key,
        value: value.as_deref(),
        negated,
        flags: Some(&letters),
    };
    match role {
        Role::Token => token_term(ctx, &CQP_LAYERS, &spec, pn.range()),
        Role::Attribute => span_term(ctx, &CQP_LAYERS, &spec, pn.range()),
    }
}

/// Structure element of a region, start tag or end tag.
fn tag(ctx: &mut Context, pn: &CqpNode) -> Result<Option<Span>> {
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
    Ok(Some(span))
}

fn plain_sequence(mut operands: Vec<Node>) -> Option<Node> {
    match operands.len() {
        0 => None,
        1 => operands.pop(),
        _ => Some(sequence(Vec::new(), true, operands)),
    }
}

fn anchored(frame: Frame, span: Span, operand: Node) -> Node {
    position(vec![frame, Frame::Matches], false, vec![span.into(), operand])
}

/// `[]+`
fn is_open_gap(node: &Node) -> bool {
    node.as_group().is_some_and(|group| {
        group.operation == Operation::Repetition(Boundary::at_least(1))
            && matches!(group.operands.as_slice(), [Node::Token(Token { wrap: None })])
    })
}

/// A region matches its element exactly, unless `[]+` pads both ends: then
/// the element merely contains the rest.
fn region(span: Span, mut enclosed: Vec<Node>) -> Option<Node> {
    let padded = enclosed.len() > 2
        && enclosed.first().is_some_and(is_open_gap)
        && enclosed.last().is_some_and(is_open_gap);
    let frames = if padded {
        enclosed.pop();
        enclosed.remove(0);
        vec![Frame::IsAround]
    } else {
        vec![Frame::Matches]
    };
    let inner = plain_sequence(enclosed)?;
    Some(position(frames, false, vec![span.into(), inner]))
}

/// Sequence operands with their structure tags resolved.
fn regions(ctx: &mut Context, children: &[CqpNode]) -> Result<Option<Node>> {
    let mut operands: Vec<Node> = Vec::with_capacity(children.len());
    // Start tags still waiting for their end tag, with the index of the
    // first operand they enclose.
    let mut open: Vec<(usize, Span, TextRange)> = Vec::new();

    for child in children {
        match child.kind() {
            CqpKind::Open => {
                if let Some(span) = tag(ctx, child)? {
                    open.push((operands.len(), span, child.range()));
                }
            }
            CqpKind::Close => {
                let Some(close) = tag(ctx, child)? else {
                    continue;
                };
                let Some((start, span, range)) = open.pop() else {
                    let node = match operands.pop() {
                        Some(previous) => anchored(Frame::EndsWith, close, previous),
                        None => close.into(),
                    };
                    operands.push(node);
                    continue;
                };
                if span.wrap != close.wrap {
                    report_malformed(
                        ctx,
                        range.cover(child.range()),
                        "unmatched structure tags".into(),
                    );
                    return Ok(None);
                }
                let enclosed = operands.split_off(start);
                let Some(node) = region(span, enclosed) else {
                    report_malformed(ctx, range.cover(child.range()), "empty region".into());
                    return Ok(None);
                };
                operands.push(node);
            }
            _ => {
                if let Some(operand) = node(ctx, child)? {
                    operands.push(operand);
                }
            }
        }
    }

    // Innermost first, so that `<s><np> x` nests the np anchor inside s.
    while let Some((start, span, _)) = open.pop() {
        if start < operands.len() {
            let next = operands.remove(start);
            operands.insert(start, anchored(Frame::StartsWith, span, next));
        } else {
            operands.push(span.into());
        }
    }
    Ok(plain_sequence(operands))
}

fn position_group(ctx: &mut Context, pn: &CqpNode) -> Result<Option<Node>> {
    let Some(frame) = required_attr(ctx, pn, "frame") else {
        return Ok(None);
    };
    let Some(frames) = map_frames(ctx, &POLIQARP_FRAMES, frame, pn.range()) else {
        return Ok(None);
    };
    let (Some(left), Some(right)) = (required_child(ctx, pn, 0), required_child(ctx, pn, 1))
    else {
        return Ok(None);
    };
    let left = node(ctx, left)?;
    let right = node(ctx, right)?;
    Ok(left
        .zip(right)
        .map(|(left, right)| position(frames, false, vec![left, right])))
}

fn element(ctx: &mut Context, pn: &CqpNode, name: &str) -> Option<Node> {
    span_term(ctx, &CQP_LAYERS, &TermSpec::new(name), pn.range()).map(|t| Span::new(t).into())
}

fn within(ctx: &mut Context, pn: &CqpNode) -> Result<Option<Node>> {
    let (Some(name), Some(child)) = (required_attr(ctx, pn, "span"), required_child(ctx, pn, 0))
    else {
        return Ok(None);
    };
    let Some(element) = element(ctx, pn, name) else {
        return Ok(None);
    };
    let Some(operand) = node(ctx, child)? else {
        return Ok(None);
    };
    Ok(Some(position(vec![Frame::IsAround], false, vec![element, operand])))
}

/// One side of a meet. The keyword class marks the first segment of the
/// outermost meet, passed down through nested meets.
fn segment(ctx: &mut Context, pn: &CqpNode, keyword: Option<u32>) -> Result<Option<Node>> {
    if pn.is(CqpKind::Meet) {
        return ctx.guarded(|ctx| meet(ctx, pn, keyword, true));
    }
    let operand = node(ctx, pn)?;
    Ok(match keyword {
        Some(class) => operand.map(|operand| wrap_class(class, operand)),
        None => operand,
    })
}

/// `MU(meet A B lo hi)` and `MU(meet A B s)`.
///
/// Offsets count tokens from the first segment to the second; negative
/// offsets put the second segment first. A span meet only asks for both
/// segments inside the same element, in any order.
fn meet(
    ctx: &mut Context,
    pn: &CqpNode,
    keyword: Option<u32>,
    nested: bool,
) -> Result<Option<Node>> {
    let (Some(first), Some(second)) = (required_child(ctx, pn, 0), required_child(ctx, pn, 1))
    else {
        return Ok(None);
    };

    if let Some(name) = pn.attr("span") {
        let element = element(ctx, pn, name);
        let first = segment(ctx, first, keyword)?;
        let second = segment(ctx, second, None)?;
        let (Some(element), Some(first), Some(second)) = (element, first, second) else {
            return Ok(None);
        };
        let anywhere = Distance::new("w", Boundary::at_least(0));
        let both = sequence(vec![anywhere], false, vec![first, second]);
        return Ok(Some(position(
            vec![Frame::IsAround],
            false,
            vec![element, both],
        )));
    }

    let (Some(lo), Some(hi)) = (
        number_attr::<_, i32>(ctx, pn, "lo"),
        number_attr::<_, i32>(ctx, pn, "hi"),
    ) else {
        return Ok(None);
    };
    let (Some(lo), Some(hi)) = (lo, hi) else {
        report_malformed(ctx, pn.range(), "`meet` needs offsets or a span".into());
        return Ok(None);
    };
    if lo == 0 || hi == 0 {
        report_malformed(ctx, pn.range(), "meet offsets cannot be 0".into());
        return Ok(None);
    }
    if lo > hi {
        report_malformed(
            ctx,
            pn.range(),
            format!("left meet offset {lo} is bigger than the right one {hi}"),
        );
        return Ok(None);
    }
    if nested && lo != hi {
        report_malformed(ctx, pn.range(), "a nested meet needs equal offsets".into());
    }

    let first = segment(ctx, first, keyword)?;
    let second = segment(ctx, second, None)?;
    let (Some(first), Some(second)) = (first, second) else {
        return Ok(None);
    };
    let range = pn.range();
    let node = if lo > 0 {
        ordered(ctx, first, second, lo.unsigned_abs() - 1, hi.unsigned_abs() - 1, range)
    } else if hi < 0 {
        ordered(ctx, second, first, hi.unsigned_abs() - 1, lo.unsigned_abs() - 1, range)
    } else {
        let forward = ordered(ctx, first.clone(), second.clone(), 0, hi.unsigned_abs() - 1, range);
        let backward = ordered(ctx, second, first, 0, lo.unsigned_abs() - 1, range);
        Node::group(Operation::Disjunction, vec![forward, backward])
    };
    Ok(Some(node))
}

/// `left` then `right` with `min..=max` tokens between them.
fn ordered(
    ctx: &mut Context,
    left: Node,
    right: Node,
    min: u32,
    max: u32,
    range: TextRange,
) -> Node {
    let distances = match Boundary::new(min, Some(max)) {
        Some(boundary) if max > 0 => vec![word_distance(ctx, boundary, range)],
        _ => Vec::new(),
    };
    sequence(distances, true, vec![left, right])
}
