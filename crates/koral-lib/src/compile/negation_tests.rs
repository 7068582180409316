use koral_core::{
    BooleanOp, Doc, DocGroup, Filter, MatchOperator, Term, TermGroup, ValueType, Wrap,
};
use rowan::TextRange;

use super::Context;
use super::negation::{negate_filter, negate_wrap};
use crate::test_utils::{ctx_diagnostics, dump_filter};

fn term(layer: &str, key: &str) -> Wrap {
    Term::new(key).with_layer(layer).into()
}

fn doc(key: &str, value: &str, match_op: MatchOperator) -> Filter {
    Filter::Doc(Doc {
        key: key.to_string(),
        value: value.to_string(),
        value_type: ValueType::String,
        match_op,
    })
}

#[test]
fn negated_disjunction_becomes_conjunction() {
    let wrap = Wrap::combine(BooleanOp::Or, vec![term("l", "Baum"), term("p", "NN")]).unwrap();

    assert_eq!(negate_wrap(wrap).to_string(), "(l!=Baum & p!=NN)");
}

#[test]
fn operators_flip_through_nesting() {
    let inner = Wrap::Group(TermGroup {
        op: BooleanOp::And,
        operands: vec![
            term("p", "ADJA"),
            Term::new("case")
                .with_layer("m")
                .with_value("nom")
                .with_match(MatchOperator::Ne)
                .into(),
        ],
    });
    let wrap = Wrap::combine(BooleanOp::Or, vec![term("orth", "alt"), inner]).unwrap();

    assert_eq!(
        negate_wrap(wrap).to_string(),
        "(orth!=alt & (p!=ADJA | m=case:nom))"
    );
}

#[test]
fn negation_is_involutive() {
    let wrap = Wrap::combine(
        BooleanOp::And,
        vec![
            term("orth", "Mann"),
            Term::new("/M.*/")
                .with_layer("l")
                .with_type(ValueType::Regex)
                .with_foundry("tt")
                .into(),
        ],
    )
    .unwrap();

    let twice = negate_wrap(negate_wrap(wrap.clone()));
    assert_eq!(twice, wrap);
}

#[test]
fn negation_keeps_type_and_layer() {
    let wrap: Wrap = Term::new("2014")
        .with_foundry("mate")
        .with_layer("orth")
        .with_type(ValueType::Integer)
        .with_match(MatchOperator::Geq)
        .into();

    let Wrap::Term(negated) = negate_wrap(wrap) else {
        panic!("expected a term");
    };
    assert_eq!(negated.match_op, MatchOperator::Lt);
    assert_eq!(negated.value_type, ValueType::Integer);
    assert_eq!(negated.foundry.as_deref(), Some("mate"));
    assert_eq!(negated.layer.as_deref(), Some("orth"));
}

#[test]
fn filters() {
    let mut ctx = Context::new();
    let filter = Filter::Group(DocGroup {
        op: BooleanOp::And,
        operands: vec![
            doc("author", "Goethe", MatchOperator::Eq),
            doc("title", "Faust", MatchOperator::Contains),
        ],
    });

    let negated = negate_filter(&mut ctx, filter.clone(), TextRange::default()).unwrap();
    insta::assert_snapshot!(dump_filter(&negated), @r"
    or
      doc author!=Goethe
      doc title!~Faust
    ");

    let twice = negate_filter(&mut ctx, negated, TextRange::default()).unwrap();
    assert_eq!(twice, filter);
}

#[test]
fn collection_reference_cannot_be_negated() {
    let mut ctx = Context::new();
    let filter = Filter::Group(DocGroup {
        op: BooleanOp::Or,
        operands: vec![
            doc("author", "Goethe", MatchOperator::Eq),
            Filter::Ref("frag-example".to_string()),
        ],
    });

    assert_eq!(negate_filter(&mut ctx, filter, TextRange::default()), None);
    insta::assert_snapshot!(ctx_diagnostics(&ctx), @"error 302 at 0..0: the collection reference `frag-example` cannot be negated");
}
