use indoc::indoc;

use crate::test_utils::{errors, graph};

fn annis(notation: &str) -> String {
    graph("annis", notation)
}

#[test]
fn token_and_annotations() {
    insta::assert_snapshot!(annis("(tok key=Mann)"), @"token orth=Mann");
    insta::assert_snapshot!(annis("(tok)"), @"token");
    insta::assert_snapshot!(annis("(anno foundry=tt layer=pos key=NN)"), @"token tt/p=NN");
    insta::assert_snapshot!(annis("(anno layer=cat key=NP)"), @"span c=NP");
    insta::assert_snapshot!(annis("(anno layer=lemma key=/geh.*/ op=\"!=\")"), @"token l!=/geh.*/");
}

#[test]
fn adjacent_tokens() {
    let tree = indoc! {"
        (statement
          (tok key=der)
          (tok key=Mann)
          (chain (ref n=1) (operator type=precedence) (ref n=2)))
    "};

    insta::assert_snapshot!(annis(tree), @r"
    sequence
      token orth=der
      token orth=Mann
    ");
}

#[test]
fn precedence_range() {
    let tree = "(chain (tok key=der) (operator type=precedence min=2 max=4) (tok key=Mann))";

    insta::assert_snapshot!(annis(tree), @r"
    sequence w{2,4}
      token orth=der
      token orth=Mann
    ");
}

#[test]
fn near_with_star() {
    let tree = "(chain (tok key=der) (operator type=near star=true) (tok key=Mann))";

    insta::assert_snapshot!(annis(tree), @r"
    sequence w{1,} unordered
      token orth=der
      token orth=Mann
    ");
}

#[test]
fn dominance_chain() {
    let tree = indoc! {"
        (statement
          (anno layer=cat key=S)
          (anno layer=cat key=NP)
          (anno layer=cat key=PP)
          (chain
            (ref n=1) (operator type=dominance)
            (ref n=2) (operator type=dominance)
            (ref n=3)))
    "};

    insta::assert_snapshot!(annis(tree), @r"
    relation c
      focus 0
        relation c
          span c=S
          class 0
            span c=NP
      span c=PP
    ");
}

#[test]
fn split_chain_folds_the_same() {
    let chained = indoc! {"
        (statement
          (anno layer=cat key=S) (anno layer=cat key=NP) (anno layer=cat key=PP)
          (chain (ref n=1) (operator type=dominance) (ref n=2) (operator type=dominance) (ref n=3)))
    "};
    let split = indoc! {"
        (statement
          (anno layer=cat key=S) (anno layer=cat key=NP) (anno layer=cat key=PP)
          (chain (ref n=1) (operator type=dominance) (ref n=2))
          (chain (ref n=2) (operator type=dominance) (ref n=3)))
    "};

    assert_eq!(annis(chained), annis(split));
}

#[test]
fn labelled_indirect_dominance() {
    let tree = indoc! {"
        (chain
          (anno layer=cat key=S)
          (operator type=dominance label=OA foundry=tt min=2 max=3)
          (anno layer=cat key=NP))
    "};

    insta::assert_snapshot!(annis(tree), @r"
    relation tt/c=OA {2,3}
      span c=S
      span c=NP
    ");
}

#[test]
fn pointing_relation() {
    let tree = "(chain (tok key=Mann) (operator type=pointing rel=subj) (tok key=geht))";

    insta::assert_snapshot!(annis(tree), @r"
    relation d=subj
      token orth=Mann
      token orth=geht
    ");
}

#[test]
fn span_relations() {
    let tree = "(chain (anno layer=cat key=NP) (operator type=spanrelation rel=_i_) (tok key=Mann))";

    insta::assert_snapshot!(annis(tree), @r"
    position isAround
      span c=NP
      token orth=Mann
    ");

    let tree = "(chain (anno layer=cat key=NP) (operator type=identity) (anno layer=cat key=PP))";

    insta::assert_snapshot!(annis(tree), @r"
    position matches
      span c=NP
      span c=PP
    ");
}

#[test]
fn common_parent() {
    let tree = "(chain (anno layer=cat key=NP) (operator type=commonparent) (anno layer=cat key=VP))";

    insta::assert_snapshot!(annis(tree), @r"
    relation c
      focus 0
        relation c
          class 0
            span
          span c=NP
      span c=VP
    ");
}

#[test]
fn common_ancestor() {
    let tree = "(chain (tok key=a) (operator type=commonancestor) (tok key=b))";

    insta::assert_snapshot!(annis(tree), @r"
    relation c {1,}
      focus 0
        relation c {1,}
          class 0
            span
          token orth=a
      token orth=b
    ");
}

#[test]
fn alternatives() {
    let tree = indoc! {"
        (alternatives
          (statement (tok key=Haus))
          (statement
            (tok key=das)
            (tok key=Haus)
            (chain (ref n=2) (operator type=precedence) (ref n=3))))
    "};

    insta::assert_snapshot!(annis(tree), @r"
    disjunction
      token orth=Haus
      sequence
        token orth=das
        token orth=Haus
    ");
}

#[test]
fn indirect_dominance_across_layers() {
    let tree = "(statement (anno layer=cat key=S) (tok key=Haus) (chain (ref n=1) (operator type=dominance star=true) (ref n=2)))";

    insta::assert_snapshot!(errors("annis", tree), @"error 305 at 66..101: indirect dominance between operands of different layers is not possible");
}

#[test]
fn unconnected_operands() {
    insta::assert_snapshot!(errors("annis", "(statement (tok key=a) (tok key=b))"), @"error 308 at 0..35: operands must be connected by a relation");
}

#[test]
fn unbound_operand() {
    let tree = "(statement (tok key=a) (tok key=b) (chain (ref n=1) (operator type=precedence) (ref n=2)) (tok key=c))";

    insta::assert_snapshot!(errors("annis", tree), @"error 308 at 0..102: operand #3 is not bound by any relation");
}

#[test]
fn undeclared_operand() {
    let tree = "(statement (tok key=a) (chain (ref n=1) (operator type=precedence) (ref n=5)))";

    insta::assert_snapshot!(errors("annis", tree), @"error 302 at 40..66: operand #5 is not declared");
}

#[test]
fn zero_distance() {
    let tree = "(chain (tok key=a) (operator type=precedence min=0 max=0) (tok key=b))";

    insta::assert_snapshot!(errors("annis", tree), @"error 302 at 19..57: Distance may not be 0");
}
