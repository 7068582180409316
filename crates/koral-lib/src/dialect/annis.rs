//! ANNIS QL driver.
//!
//! A statement declares operands (`tok`, `anno`) and chains of binary
//! operators over them. Operands are numbered in order of appearance across
//! the whole query; a chain may mention earlier ones with `ref`.
//!
//! ```text
//! cat="NP" & tok & #1 > #2   =>   (statement
//!                                   (anno layer=cat key=NP)
//!                                   (tok)
//!                                   (chain (ref n=1) (operator type=dominance) (ref n=2)))
//! ```

use indexmap::IndexMap;
use koral_core::frames::ANNIS_FRAMES;
use koral_core::layers::{ANNIS_LAYERS, default_foundry, is_token_layer};
use koral_core::{
    Boundary, Distance, Frame, Node, Operation, Reference, Relation, Span, Term, Token, Wrap,
};
use rowan::TextRange;

use crate::Result;
use crate::compile::Context;
use crate::compile::chain::{Predicate, fold_chain};
use crate::compile::classes::wrap_fresh;
use crate::compile::distance::{annis_distance, sequence};
use crate::compile::frames::{map_frames, position};
use crate::compile::term::{TermSpec, resolve_foundry, resolve_layer, span_term, token_term};
use crate::diagnostics::DiagnosticKind;
use crate::node_kinds;
use crate::tree::{NodeKind, ParseNode};

use super::{number_attr, report_malformed, required_attr};

node_kinds! {
    pub enum AnnisKind {
        Alternatives => "alternatives",
        Statement => "statement",
        Tok => "tok",
        Anno => "anno",
        Ref => "ref",
        Chain => "chain",
        Operator => "operator",
    }
}

pub type AnnisNode = ParseNode<AnnisKind>;

pub fn compile(ctx: &mut Context, root: &AnnisNode) -> Result<Option<Node>> {
    let mut numbering = 0;
    match root.kind() {
        AnnisKind::Alternatives => {
            let mut operands = Vec::with_capacity(root.children().len());
            for child in root.children() {
                if let Some(operand) = statement(ctx, child, &mut numbering)? {
                    operands.push(operand);
                }
            }
            Ok(match operands.len() {
                0 => None,
                1 => operands.pop(),
                _ => Some(Node::group(Operation::Disjunction, operands)),
            })
        }
        _ => statement(ctx, root, &mut numbering),
    }
}

/// Operator between two chain operands, parsed before folding.
#[derive(Debug, Clone)]
enum Link {
    Precedence {
        distance: Option<Distance>,
        in_order: bool,
    },
    Relation(Relation),
    Position(Vec<Frame>),
    CommonParent(Option<Boundary>),
}

impl Link {
    fn is_indirect_dominance(&self) -> bool {
        matches!(
            self,
            Link::Relation(Relation { wrap: Some(term), boundary: Some(b) })
                if term.layer.as_deref() == Some("c") && *b != Boundary::exact(1)
        )
    }
}

fn statement(ctx: &mut Context, pn: &AnnisNode, numbering: &mut usize) -> Result<Option<Node>> {
    ctx.guarded(|ctx| {
        let members: &[AnnisNode] = match pn.kind() {
            AnnisKind::Statement => pn.children(),
            AnnisKind::Tok | AnnisKind::Anno | AnnisKind::Chain => std::slice::from_ref(pn),
            _ => {
                report_malformed(
                    ctx,
                    pn.range(),
                    format!("`{}` cannot stand on its own", pn.kind().name()),
                );
                return Ok(None);
            }
        };

        let mut operands = IndexMap::new();
        let mut predicates = Vec::new();
        let mut complete = true;
        for member in members {
            match member.kind() {
                AnnisKind::Tok | AnnisKind::Anno => {
                    *numbering += 1;
                    match operand(ctx, member) {
                        Some(node) => {
                            operands.insert(*numbering, node);
                        }
                        None => complete = false,
                    }
                }
                AnnisKind::Chain => {
                    complete &= chain(ctx, member, numbering, &mut operands, &mut predicates)?;
                }
                _ => {
                    report_malformed(
                        ctx,
                        member.range(),
                        format!("`{}` is not a statement member", member.kind().name()),
                    );
                    complete = false;
                }
            }
        }
        if !complete {
            return Ok(None);
        }

        for predicate in &predicates {
            if predicate.op.is_indirect_dominance() {
                check_indirect(ctx, &operands, predicate);
            }
        }

        fold_chain(ctx, operands, predicates, pn.range(), combine)
    })
}

/// Reads `operand operator operand ...` into predicates over mention indices.
/// Returns `false` when a member could not be built.
fn chain(
    ctx: &mut Context,
    pn: &AnnisNode,
    numbering: &mut usize,
    operands: &mut IndexMap<usize, Node>,
    predicates: &mut Vec<Predicate<Link>>,
) -> Result<bool> {
    let mut complete = true;
    let mut previous: Option<usize> = None;
    let mut pending: Option<(Link, TextRange)> = None;
    let mut expect_operand = true;

    for member in pn.children() {
        if member.is(AnnisKind::Operator) {
            if expect_operand {
                report_malformed(ctx, member.range(), "operator without left operand".into());
                return Ok(false);
            }
            match link(ctx, member) {
                Some(op) => pending = Some((op, member.range())),
                None => complete = false,
            }
            expect_operand = true;
            continue;
        }

        if !expect_operand {
            report_malformed(
                ctx,
                member.range(),
                "operands must be separated by an operator".into(),
            );
            return Ok(false);
        }
        let mention = match member.kind() {
            AnnisKind::Ref => {
                let Some(n) = number_attr::<_, usize>(ctx, member, "n") else {
                    return Ok(false);
                };
                let Some(n) = n else {
                    report_malformed(ctx, member.range(), "`ref` needs the attribute `n`".into());
                    return Ok(false);
                };
                n
            }
            AnnisKind::Tok | AnnisKind::Anno => {
                *numbering += 1;
                match operand(ctx, member) {
                    Some(node) => {
                        operands.insert(*numbering, node);
                    }
                    None => complete = false,
                }
                *numbering
            }
            other => {
                report_malformed(
                    ctx,
                    member.range(),
                    format!("`{}` cannot be a chain operand", other.name()),
                );
                return Ok(false);
            }
        };
        if let (Some(left), Some((op, range))) = (previous, pending.take()) {
            predicates.push(Predicate {
                left,
                right: mention,
                op,
                range,
            });
        }
        previous = Some(mention);
        expect_operand = false;
    }

    if expect_operand && previous.is_some() {
        report_malformed(ctx, pn.range(), "operator without right operand".into());
        return Ok(false);
    }
    Ok(complete)
}

fn operand(ctx: &mut Context, pn: &AnnisNode) -> Option<Node> {
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

    if pn.is(AnnisKind::Tok) {
        let Some(key) = pn.attr("key") else {
            return Some(Token::empty().into());
        };
        let spec = TermSpec {
            key,
            negated,
            flags: pn.attr("flags"),
            ..TermSpec::default()
        };
        return token_term(ctx, &ANNIS_LAYERS, &spec, pn.range()).map(|t| Token::new(t).into());
    }

    let name = required_attr(ctx, pn, "layer")?;
    let layer = resolve_layer(ctx, &ANNIS_LAYERS, name, pn.range())?;
    let on_token = is_token_layer(layer.code);

    let Some(key) = pn.attr("key") else {
        let mut term = Term::layer_only(layer.code);
        term.foundry = match pn.attr("foundry") {
            Some(foundry) => Some(resolve_foundry(ctx, foundry, pn.range())?),
            None => default_foundry(layer.code).map(String::from),
        };
        return Some(leaf(on_token, term));
    };
    let spec = TermSpec {
        foundry: pn.attr("foundry"),
        layer: Some(name),
        key,
        value: pn.attr("value"),
        negated,
        flags: pn.attr("flags"),
    };
    let term = if on_token {
        token_term(ctx, &ANNIS_LAYERS, &spec, pn.range())?
    } else {
        span_term(ctx, &ANNIS_LAYERS, &spec, pn.range())?
    };
    Some(leaf(on_token, term))
}

fn leaf(on_token: bool, term: Term) -> Node {
    if on_token {
        Token::new(term).into()
    } else {
        Span::new(term).into()
    }
}

fn link(ctx: &mut Context, pn: &AnnisNode) -> Option<Link> {
    let kind = required_attr(ctx, pn, "type")?;
    match kind {
        "precedence" | "near" => {
            let min = number_attr::<_, u32>(ctx, pn, "min")?;
            let max = number_attr::<_, u32>(ctx, pn, "max")?;
            let star = pn.attr("star").is_some();
            let distance = annis_distance(ctx, min, max, star, pn.range())?;
            Some(Link::Precedence {
                distance,
                in_order: kind == "precedence",
            })
        }
        "dominance" => {
            let mut term = Term::layer_only("c");
            if let Some(label) = pn.attr("label") {
                term.key = label.to_string();
            }
            if let Some(foundry) = pn.attr("foundry") {
                term.foundry = Some(resolve_foundry(ctx, foundry, pn.range())?);
            }
            Some(Link::Relation(Relation {
                wrap: Some(term),
                boundary: relation_boundary(ctx, pn)?,
            }))
        }
        "pointing" => {
            let mut term = Term::layer_only("d");
            if let Some(rel) = pn.attr("rel") {
                term.key = rel.to_string();
            }
            if let Some(foundry) = pn.attr("foundry") {
                term.foundry = Some(resolve_foundry(ctx, foundry, pn.range())?);
            }
            Some(Link::Relation(Relation {
                wrap: Some(term),
                boundary: relation_boundary(ctx, pn)?,
            }))
        }
        "spanrelation" => {
            let rel = required_attr(ctx, pn, "rel")?;
            map_frames(ctx, &ANNIS_FRAMES, rel, pn.range()).map(Link::Position)
        }
        "identity" => Some(Link::Position(vec![Frame::Matches])),
        "commonparent" => Some(Link::CommonParent(None)),
        "commonancestor" => Some(Link::CommonParent(Some(Boundary::at_least(1)))),
        other => {
            ctx.report(DiagnosticKind::UnknownQueryElement, pn.range())
                .message(other)
                .emit();
            None
        }
    }
}

/// `>*` is `{1,}`, `>n,m` is `{n,m}`, a plain edge has no boundary.
fn relation_boundary(ctx: &mut Context, pn: &AnnisNode) -> Option<Option<Boundary>> {
    if pn.attr("star").is_some() {
        return Some(Some(Boundary::at_least(1)));
    }
    let min = number_attr::<_, u32>(ctx, pn, "min")?;
    let max = number_attr::<_, u32>(ctx, pn, "max")?;
    let Some(min) = min else {
        return Some(None);
    };
    match Boundary::new(min, Some(max.unwrap_or(min))) {
        Some(boundary) => Some(Some(boundary)),
        None => {
            report_malformed(ctx, pn.range(), "relation maximum is below its minimum".into());
            None
        }
    }
}

fn leaf_term(node: &Node) -> Option<&Term> {
    match node {
        Node::Token(token) => token.wrap.as_ref(),
        Node::Span(span) => span.wrap.as_ref(),
        _ => None,
    }
    .and_then(Wrap::first_term)
}

/// Indirect dominance only holds between operands of the same layer and
/// foundry, where both name one.
fn check_indirect(
    ctx: &mut Context,
    operands: &IndexMap<usize, Node>,
    predicate: &Predicate<Link>,
) {
    let (Some(left), Some(right)) = (
        operands.get(&predicate.left).and_then(leaf_term),
        operands.get(&predicate.right).and_then(leaf_term),
    ) else {
        return;
    };
    let differs = |a: &Option<String>, b: &Option<String>| {
        matches!((a, b), (Some(a), Some(b)) if a != b)
    };
    let what = if differs(&left.layer, &right.layer) {
        "layers"
    } else if differs(&left.foundry, &right.foundry) {
        "foundries"
    } else {
        return;
    };
    ctx.report(DiagnosticKind::IncompatibleOperatorAndOperand, predicate.range)
        .message(format!(
            "indirect dominance between operands of different {what} is not possible"
        ))
        .emit();
}

fn combine(ctx: &mut Context, link: &Link, left: Node, right: Node) -> Result<Option<Node>> {
    Ok(Some(match link {
        Link::Precedence { distance, in_order } => {
            sequence(distance.iter().cloned().collect(), *in_order, vec![left, right])
        }
        Link::Relation(relation) => {
            Node::group(Operation::Relation(relation.clone()), vec![left, right])
        }
        Link::Position(frames) => position(frames.clone(), false, vec![left, right]),
        Link::CommonParent(boundary) => {
            let (parent, anchor) = wrap_fresh(ctx, Span::anonymous().into());
            let edge = || {
                Operation::Relation(Relation {
                    wrap: Some(Term::layer_only("c")),
                    boundary: *boundary,
                })
            };
            let inner = Node::group(edge(), vec![anchor, left]);
            let focus = Reference::focus(parent, vec![inner]).into();
            Node::group(edge(), vec![focus, right])
        }
    }))
}
