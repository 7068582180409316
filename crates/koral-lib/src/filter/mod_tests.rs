use indoc::indoc;

use super::{FilterKind, compile};
use crate::compile::Context;
use crate::test_utils::{ctx_diagnostics, dump_filter};
use crate::tree::read;

/// Filter dump followed by the diagnostics, if any.
fn filter(notation: &str) -> String {
    let root = read::<FilterKind>(notation).unwrap();
    let mut ctx = Context::new();
    let filter = compile(&mut ctx, &root).unwrap();
    let mut out = filter.as_ref().map(dump_filter).unwrap_or_default();
    out.push_str(&ctx_diagnostics(&ctx));
    out
}

#[test]
fn date_range_and_reference() {
    let tree = indoc! {r#"
        (or
          (and
            (doc key=pubDate op=since value=2014)
            (doc key=author op="=" value=Goethe))
          (ref name=frag-1))
    "#};

    insta::assert_snapshot!(filter(tree), @r"
    or
      and
        doc pubDate>=2014::date
        doc author=Goethe
      ref frag-1
    ");
}

#[test]
fn conjunction_inside_disjunction() {
    let tree = indoc! {r#"
        (or
          (and
            (doc key=a op="=" value=1)
            (doc key=b op="=" value=2))
          (doc key=c op="=" value=3))
    "#};

    insta::assert_snapshot!(filter(tree), @r"
    or
      and
        doc a=1
        doc b=2
      doc c=3
    ");
}

#[test]
fn groups_nest_to_the_right() {
    let tree = indoc! {r#"
        (and
          (doc key=a op="=" value=1)
          (doc key=b op="=" value=2)
          (doc key=c op="=" value=3))
    "#};

    insta::assert_snapshot!(filter(tree), @r"
    and
      doc a=1
      and
        doc b=2
        doc c=3
    ");
}

#[test]
fn date_operators() {
    insta::assert_snapshot!(filter("(doc key=pubDate op=until value=2014-05-01)"), @"doc pubDate<=2014-05-01::date");
    insta::assert_snapshot!(filter("(doc key=pubDate op=in value=2014-05)"), @"doc pubDate=2014-05::date");
}

#[test]
fn regex_value() {
    insta::assert_snapshot!(filter(r#"(doc key=author op="=" value="/Goethe.*/")"#), @"doc author=/Goethe.*/");
}

#[test]
fn negation_moves_to_the_leaves() {
    let tree = indoc! {r#"
        (not
          (or
            (doc key=textClass op="~" value=politik)
            (doc key=pubDate op=since value=2014)))
    "#};

    insta::assert_snapshot!(filter(tree), @r"
    and
      doc textClass!~politik
      doc pubDate<2014::date
    ");
}

#[test]
fn date_operator_needs_a_date() {
    insta::assert_snapshot!(
        filter("(doc key=pubDate op=since value=May)"),
        @"error 302 at 0..36: `since` needs a date, found `May`"
    );
}

#[test]
fn comparison_needs_a_number() {
    insta::assert_snapshot!(
        filter(r#"(doc key=author op="<" value=Goethe)"#),
        @"error 305 at 0..36: `<` cannot compare the non-numeric value `Goethe`"
    );
}

#[test]
fn reference_cannot_be_negated() {
    insta::assert_snapshot!(
        filter("(not (ref name=frag-1))"),
        @"error 302 at 0..23: the collection reference `frag-1` cannot be negated"
    );
}

#[test]
fn empty_group() {
    insta::assert_snapshot!(filter("(and)"), @"error 302 at 0..5: empty `and` group");
}

#[test]
fn unknown_operator() {
    insta::assert_snapshot!(
        filter("(doc key=pubDate op=before value=2014)"),
        @"error 306 at 0..38: `before` is not a known query element"
    );
}
