//! COSMAS II driver.
//!
//! ```text
//! Mann /+w2 Frau #IN(L) <s>   =>   (in pos=L
//!                                     (prox
//!                                       (dist dir=+ max=2 meas=w)
//!                                       (wf value=Mann)
//!                                       (wf value=Frau))
//!                                     (elem name=s))
//! ```

use koral_core::frames::{COSMAS_IN_FRAMES, COSMAS_OV_FRAMES, FrameTable, is_identity_position};
use koral_core::layers::COSMAS_LAYERS;
use koral_core::{
    BooleanOp, Boundary, Distance, Flags, MatchOperator, Node, Operation, Reference, Span,
    SpanRef, Term, Token, ValueType, Wrap,
};
use rowan::TextRange;

use crate::Result;
use crate::compile::Context;
use crate::compile::classes::wrap_fresh;
use crate::compile::distance::{crop, sequence};
use crate::compile::frames::{map_frames, position};
use crate::compile::term::{TermSpec, resolve_foundry, resolve_layer, token_term};
use crate::diagnostics::DiagnosticKind;
use crate::node_kinds;
use crate::tree::{NodeKind, ParseNode};

use super::{report_malformed, required_attr, required_child};

node_kinds! {
    pub enum CosmasKind {
        Sequence => "sequence",
        Wf => "wf",
        Lem => "lem",
        Morph => "morph",
        Elem => "elem",
        Attr => "attr",
        And => "and",
        Not => "not",
        Or => "or",
        Prox => "prox",
        Dist => "dist",
        In => "in",
        Ov => "ov",
        Beg => "beg",
        End => "end",
        All => "all",
        Nhit => "nhit",
        Bed => "bed",
    }
}

pub type CosmasNode = ParseNode<CosmasKind>;

const WILDCARDS: &[char] = &['*', '?', '+'];

pub fn compile(ctx: &mut Context, root: &CosmasNode) -> Result<Option<Node>> {
    node(ctx, root)
}

fn node(ctx: &mut Context, pn: &CosmasNode) -> Result<Option<Node>> {
    ctx.guarded(|ctx| match pn.kind() {
        CosmasKind::Sequence => {
            let Some(operands) = operands(ctx, pn)? else {
                return Ok(None);
            };
            Ok(match operands.len() {
                0 => None,
                1 => operands.into_iter().next(),
                _ => Some(sequence(Vec::new(), true, operands)),
            })
        }
        CosmasKind::Wf => Ok(word_form(ctx, pn)),
        CosmasKind::Lem => Ok(lemma(ctx, pn)),
        CosmasKind::Morph => Ok(morph(ctx, pn)),
        CosmasKind::Elem => Ok(element(ctx, pn)),
        CosmasKind::And => text_distance(ctx, pn, false),
        CosmasKind::Not => text_distance(ctx, pn, true),
        CosmasKind::Or => {
            let Some(operands) = operands(ctx, pn)? else {
                return Ok(None);
            };
            if operands.len() < 2 {
                report_malformed(ctx, pn.range(), "`or` needs at least 2 operands".into());
                return Ok(None);
            }
            Ok(Some(Node::group(Operation::Disjunction, operands)))
        }
        CosmasKind::Prox => proximity(ctx, pn),
        CosmasKind::In => inclusion(ctx, pn, &COSMAS_IN_FRAMES),
        CosmasKind::Ov => inclusion(ctx, pn, &COSMAS_OV_FRAMES),
        CosmasKind::Beg => edge(ctx, pn, 0),
        CosmasKind::End => edge(ctx, pn, -1),
        CosmasKind::All | CosmasKind::Nhit | CosmasKind::Bed => {
            ctx.report(DiagnosticKind::QueryTooComplex, pn.range())
                .message(format!("#{}", pn.kind().name().to_ascii_uppercase()))
                .emit();
            Ok(None)
        }
        CosmasKind::Attr | CosmasKind::Dist => {
            report_malformed(
                ctx,
                pn.range(),
                format!("`{}` is not an operand", pn.kind().name()),
            );
            Ok(None)
        }
    })
}

/// Compiles all operand children. `None` if any of them failed.
fn operands(ctx: &mut Context, pn: &CosmasNode) -> Result<Option<Vec<Node>>> {
    let mut out = Vec::with_capacity(pn.children().len());
    let mut complete = true;
    for child in pn.children() {
        if child.is(CosmasKind::Dist) {
            continue;
        }
        match node(ctx, child)? {
            Some(operand) => out.push(operand),
            None => complete = false,
        }
    }
    Ok(complete.then_some(out))
}

fn two_operands(ctx: &mut Context, pn: &CosmasNode) -> Result<Option<(Node, Node)>> {
    let Some(mut operands) = operands(ctx, pn)? else {
        return Ok(None);
    };
    if operands.len() != 2 {
        report_malformed(
            ctx,
            pn.range(),
            format!("`{}` needs exactly 2 operands", pn.kind().name()),
        );
        return Ok(None);
    }
    let right = operands.pop();
    let left = operands.pop();
    Ok(left.zip(right))
}

/// `$` asks for case-insensitive matching; `*`, `?` and `+` are wildcards.
fn surface<'a>(
    ctx: &mut Context,
    value: &'a str,
    range: TextRange,
) -> Option<(&'a str, Flags, ValueType)> {
    let (key, flags) = match value.strip_prefix('$') {
        Some(rest) => (
            rest,
            Flags {
                case_insensitive: true,
                ..Flags::NONE
            },
        ),
        None => (value, Flags::NONE),
    };
    if key.is_empty() {
        report_malformed(ctx, range, format!("`{value}` is not a word"));
        return None;
    }
    let value_type = if key.contains(WILDCARDS) {
        ValueType::Wildcard
    } else {
        ValueType::String
    };
    Some((key, flags, value_type))
}

fn word_form(ctx: &mut Context, pn: &CosmasNode) -> Option<Node> {
    let value = required_attr(ctx, pn, "value")?;
    let (key, flags, value_type) = surface(ctx, value, pn.range())?;
    let term = Term::new(key)
        .with_layer("orth")
        .with_type(value_type)
        .with_flags(flags);
    Some(Token::new(term).into())
}

fn lemma(ctx: &mut Context, pn: &CosmasNode) -> Option<Node> {
    let value = required_attr(ctx, pn, "value")?;
    let (key, flags, value_type) = surface(ctx, value, pn.range())?;
    if value_type == ValueType::Wildcard {
        ctx.report(DiagnosticKind::LemmaWildcards, pn.range())
            .message(value)
            .emit();
        return None;
    }
    let term = Term::new(key).with_layer("l").with_flags(flags);
    Some(Token::new(term).into())
}

/// `#MORPH(tt/p=NN & m=gender:fem)`: one term per `&`-separated item, all
/// on the same token.
fn morph(ctx: &mut Context, pn: &CosmasNode) -> Option<Node> {
    let value = required_attr(ctx, pn, "value")?;
    let mut terms = Vec::new();
    for item in value.split('&').map(str::trim) {
        if item.is_empty() {
            report_malformed(ctx, pn.range(), format!("empty item in `{value}`"));
            return None;
        }
        terms.push(Wrap::from(morph_item(ctx, item, pn.range())?));
    }
    let wrap = Wrap::combine(BooleanOp::And, terms)?;
    Some(Token::new(wrap).into())
}

/// `[foundry/][layer(=|!=)]key[:value]`. Without a layer the key is a part
/// of speech; a quoted key or value is a regular expression.
fn morph_item(ctx: &mut Context, item: &str, range: TextRange) -> Option<Term> {
    let (foundry, rest) = match item.split_once('/') {
        Some((foundry, rest)) if !foundry.contains('=') => (Some(foundry), rest),
        _ => (None, item),
    };
    let (layer, negated, rest) = if let Some((layer, rest)) = rest.split_once("!=") {
        (layer, true, rest)
    } else if let Some((layer, rest)) = rest.split_once('=') {
        (layer, false, rest)
    } else {
        ("p", false, rest)
    };
    let (key, value) = match rest.split_once(':') {
        Some((key, value)) => (key, Some(value)),
        None => (rest, None),
    };
    if key.is_empty() || layer.is_empty() {
        ctx.report(DiagnosticKind::IncompatibleOperatorAndOperand, range)
            .message(format!("`{item}` is not a morphological term"))
            .emit();
        return None;
    }

    let key = quoted_as_regex(key);
    let value = value.map(quoted_as_regex);
    let spec = TermSpec {
        foundry,
        layer: Some(layer),
        key: &key,
        value: value.as_deref(),
        negated,
        flags: None,
    };
    token_term(ctx, &COSMAS_LAYERS, &spec, range)
}

fn quoted_as_regex(text: &str) -> String {
    match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(body) => format!("/{body}/"),
        None => text.to_string(),
    }
}

/// `#ELEM(s)` or `#ELEM(W ANA != 'N V')`.
fn element(ctx: &mut Context, pn: &CosmasNode) -> Option<Node> {
    let name = pn.attr("name");
    let attrs: Vec<&CosmasNode> = pn
        .children()
        .iter()
        .filter(|c| c.is(CosmasKind::Attr))
        .collect();
    if name.is_none() && attrs.is_empty() {
        report_malformed(ctx, pn.range(), "empty `#ELEM` operator".into());
        return None;
    }

    let mut span = match name {
        Some(name) => Span::new(Term::new(name.to_lowercase())),
        None => Span::anonymous(),
    };
    let single = attrs.len() == 1;
    let mut operands = Vec::new();
    for attr in attrs {
        let terms = attribute(ctx, attr)?;
        if single {
            operands.extend(terms);
        } else {
            operands.extend(Wrap::combine(BooleanOp::And, terms));
        }
    }
    if let Some(attr) = Wrap::combine(BooleanOp::And, operands) {
        span = span.with_attr(attr);
    }
    Some(span.into())
}

/// One attribute condition; several whitespace-separated values all apply.
fn attribute(ctx: &mut Context, pn: &CosmasNode) -> Option<Vec<Wrap>> {
    let name = required_attr(ctx, pn, "layer")?;
    let values = required_attr(ctx, pn, "values")?;
    let match_op = match pn.attr("op") {
        None | Some("=") => MatchOperator::Eq,
        Some("!=") => MatchOperator::Ne,
        Some(other) => {
            ctx.report(DiagnosticKind::UnknownQueryElement, pn.range())
                .message(other)
                .emit();
            return None;
        }
    };
    let (foundry, layer) = match name.split_once('/') {
        Some((foundry, layer)) => (Some(resolve_foundry(ctx, foundry, pn.range())?), layer),
        None => (None, name),
    };
    let layer = resolve_layer(ctx, &COSMAS_LAYERS, layer, pn.range())?;

    let terms: Vec<Wrap> = values
        .split_whitespace()
        .map(|value| {
            let mut term = Term::new(value).with_layer(layer.code).with_match(match_op);
            term.foundry = foundry.clone();
            Wrap::from(term)
        })
        .collect();
    if terms.is_empty() {
        report_malformed(ctx, pn.range(), format!("`{name}` has no values"));
        return None;
    }
    Some(terms)
}

/// `A #AND B` and `A #NOT B`: both in (or only the first in) the same text.
fn text_distance(ctx: &mut Context, pn: &CosmasNode, exclude: bool) -> Result<Option<Node>> {
    let Some((left, right)) = two_operands(ctx, pn)? else {
        return Ok(None);
    };
    let mut distance = Distance::new("t", Boundary::exact(0));
    if exclude {
        distance = distance.excluded();
    }
    Ok(Some(sequence(vec![distance], false, vec![left, right])))
}

fn is_set(pn: &CosmasNode, name: &str) -> bool {
    pn.attr(name).is_some_and(|v| v != "false")
}

/// `A /+w2:4,s0 B`.
fn proximity(ctx: &mut Context, pn: &CosmasNode) -> Result<Option<Node>> {
    let exclude = is_set(pn, "excl");
    let dists: Vec<&CosmasNode> = pn
        .children()
        .iter()
        .filter(|c| c.is(CosmasKind::Dist))
        .collect();
    if dists.is_empty() {
        ctx.report(DiagnosticKind::ProxMissingMeasure, pn.range())
            .emit();
        return Ok(None);
    }

    let mut distances = Vec::with_capacity(dists.len());
    for dist in &dists {
        let Some(mut distance) = proximity_distance(ctx, dist) else {
            return Ok(None);
        };
        if exclude {
            distance = distance.excluded();
        }
        distances.push(distance);
    }

    let (in_order, swapped) = match dists[0].attr("dir") {
        Some("+") => (true, false),
        Some("-") => (true, true),
        _ => (false, false),
    };
    let Some((left, right)) = two_operands(ctx, pn)? else {
        return Ok(None);
    };
    let operands = if swapped {
        vec![right, left]
    } else {
        vec![left, right]
    };
    Ok(Some(sequence(distances, in_order, operands)))
}

fn proximity_distance(ctx: &mut Context, pn: &CosmasNode) -> Option<Distance> {
    let Some(meas) = pn.attr("meas") else {
        ctx.report(DiagnosticKind::ProxMissingMeasure, pn.range())
            .emit();
        return None;
    };
    if !matches!(meas, "w" | "s" | "p" | "t") {
        ctx.report(DiagnosticKind::ProxUnknownMeasure, pn.range())
            .message(meas)
            .emit();
        return None;
    }
    let Some(max) = pn.attr("max") else {
        ctx.report(DiagnosticKind::ProxMissingValue, pn.range())
            .message(meas)
            .emit();
        return None;
    };
    let max = proximity_value(ctx, max, pn.range())?;
    let min = match pn.attr("min") {
        Some(min) => proximity_value(ctx, min, pn.range())?,
        None => 0,
    };
    let Some(boundary) = Boundary::new(min, Some(max)) else {
        report_malformed(
            ctx,
            pn.range(),
            format!("distance maximum {max} is below minimum {min}"),
        );
        return None;
    };
    Some(Distance::new(meas, crop(ctx, boundary, pn.range())))
}

fn proximity_value(ctx: &mut Context, text: &str, range: TextRange) -> Option<u32> {
    let parsed = text
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| text.parse().ok())
        .flatten();
    if parsed.is_none() {
        ctx.report(DiagnosticKind::ProxWrongCharacters, range)
            .message(text)
            .emit();
    }
    parsed
}

/// `A #IN(pos) B` and `A #OV(pos) B`.
///
/// Both operands are classed; the container comes first in the position
/// group and the result is focused on `A`.
fn inclusion(ctx: &mut Context, pn: &CosmasNode, table: &FrameTable) -> Result<Option<Node>> {
    let pos = pn.attr("pos").unwrap_or("");
    let Some(frames) = map_frames(ctx, table, pos, pn.range()) else {
        return Ok(None);
    };
    if is_identity_position(pos) {
        ctx.report(DiagnosticKind::IgnoredQueryElement, pn.range())
            .message(format!("identity check {pos}"))
            .emit();
    }
    let Some((searched, container)) = two_operands(ctx, pn)? else {
        return Ok(None);
    };

    let (_, container) = wrap_fresh(ctx, container);
    let (searched_class, searched) = wrap_fresh(ctx, searched);
    let group = position(frames, is_set(pn, "excl"), vec![container, searched]);
    Ok(Some(Reference::focus(searched_class, vec![group]).into()))
}

/// `#BEG(A)` and `#END(A)`: the first or last token of the match.
fn edge(ctx: &mut Context, pn: &CosmasNode, start: i32) -> Result<Option<Node>> {
    let Some(child) = required_child(ctx, pn, 0) else {
        return Ok(None);
    };
    let operand = node(ctx, child)?;
    Ok(operand.map(|operand| {
        Reference::span(
            SpanRef {
                start,
                length: Some(1),
            },
            operand,
        )
        .into()
    }))
}
