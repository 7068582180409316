use indoc::indoc;

use crate::test_utils::{errors, graph};

fn poliqarp(notation: &str) -> String {
    graph("poliqarp", notation)
}

#[test]
fn surface_form() {
    insta::assert_snapshot!(poliqarp("(token (term layer=orth key=Mann))"), @"token orth=Mann");
}

#[test]
fn bare_term_is_a_token() {
    insta::assert_snapshot!(poliqarp("(term layer=base key=Haus flags=i)"), @"token l=Haus[i]");
}

#[test]
fn regex_key() {
    insta::assert_snapshot!(poliqarp("(token (term layer=pos key=/N.*/))"), @"token p=/N.*/");
}

#[test]
fn optional_gap_becomes_distance() {
    let tree = indoc! {"
        (sequence
          (token (term key=der))
          (repetition q=? (token))
          (token (term key=Mann)))
    "};

    insta::assert_snapshot!(poliqarp(tree), @r"
    sequence w{1,2}
      token orth=der
      token orth=Mann
    ");
}

#[test]
fn leading_empty_token() {
    let tree = "(sequence (token) (token (term key=Mann)))";

    insta::assert_snapshot!(poliqarp(tree), @r"
    sequence
      token
      token orth=Mann
    ");
}

#[test]
fn negated_disjunction() {
    let tree = indoc! {"
        (not
          (termGroup op=or
            (term layer=lemma key=Baum)
            (term layer=pos key=NN)))
    "};

    insta::assert_snapshot!(poliqarp(tree), @"token (l!=Baum & p!=NN)");
}

#[test]
fn double_negation_cancels() {
    let tree = "(token (not (not (term layer=pos key=NN))))";

    insta::assert_snapshot!(poliqarp(tree), @"token p=NN");
}

#[test]
fn span_with_attribute() {
    let tree = indoc! {"
        (span layer=c key=NP
          (termGroup op=and
            (term key=type value=top)
            (term key=id op=\"!=\" value=7)))
    "};

    insta::assert_snapshot!(poliqarp(tree), @"span c=NP attr (type:top & !=id:7)");
}

#[test]
fn repetition_and_disjunction() {
    let tree = indoc! {"
        (disjunction
          (repetition q={2,3} (token (term key=sehr)))
          (token (term key=ganz)))
    "};

    insta::assert_snapshot!(poliqarp(tree), @r"
    disjunction
      repetition {2,3}
        token orth=sehr
      token orth=ganz
    ");
}

#[test]
fn classes_and_focus() {
    let tree = indoc! {"
        (focus classes=2
          (sequence
            (token (term key=der))
            (class id=2 (token (term key=Mann)))))
    "};

    insta::assert_snapshot!(poliqarp(tree), @r"
    focus 2
      sequence
        token orth=der
        class 2
          token orth=Mann
    ");
}

#[test]
fn unnumbered_class_is_one() {
    let tree = "(focus (class (token (term key=Mann))))";

    insta::assert_snapshot!(poliqarp(tree), @r"
    focus 1
      class 1
        token orth=Mann
    ");
}

#[test]
fn split_on_intersection() {
    let tree = indoc! {"
        (split classes=1|2
          (sequence
            (class id=1 (token (term key=a)))
            (class id=2 (token (term key=b)))))
    "};

    insta::assert_snapshot!(poliqarp(tree), @r"
    split 1|2
      sequence
        class 1
          token orth=a
        class 2
          token orth=b
    ");
}

#[test]
fn submatch() {
    let tree = "(submatch start=1 length=2 (sequence (token (term key=a)) (token (term key=b))))";

    insta::assert_snapshot!(poliqarp(tree), @r"
    focus span[1,2]
      sequence
        token orth=a
        token orth=b
    ");
}

#[test]
fn position_frames() {
    let tree = "(position frame=startswith (span key=s) (token (term key=Mann)))";

    insta::assert_snapshot!(poliqarp(tree), @r"
    position startsWith,matches
      span s
      token orth=Mann
    ");
}

#[test]
fn within_span() {
    let tree = "(within span=s (token (term key=Mann)))";

    insta::assert_snapshot!(poliqarp(tree), @r"
    position isAround
      span s
      token orth=Mann
    ");
}

#[test]
fn dominance_relation() {
    let tree = indoc! {"
        (relation type=dominates min=1 max=3
          (span layer=c key=NP)
          (span layer=c key=VP))
    "};

    insta::assert_snapshot!(poliqarp(tree), @r"
    relation c {1,3}
      span c=NP
      span c=VP
    ");
}

#[test]
fn labelled_dependency() {
    let tree = indoc! {"
        (relation type=relatesTo foundry=mate key=SBJ
          (token (term key=Mann))
          (token (term key=geht)))
    "};

    insta::assert_snapshot!(poliqarp(tree), @r"
    relation mate/d=SBJ
      token orth=Mann
      token orth=geht
    ");
}

#[test]
fn meta_is_deprecated() {
    insta::assert_snapshot!(errors("poliqarp", "(meta)"), @"warning 303 at 0..6: deprecated query element: meta (hint: restrict the corpus with a collection filter)");
}

#[test]
fn unknown_layer() {
    insta::assert_snapshot!(errors("poliqarp", "(token (term layer=cat key=NP))"), @"error 306 at 7..30: `cat` is not a known query element");
}

#[test]
fn unknown_frame() {
    let tree = "(position frame=around (span key=s) (token (term key=a)))";

    insta::assert_snapshot!(errors("poliqarp", tree), @"error 306 at 0..57: `around` is not a known query element");
}

#[test]
fn undefined_class() {
    let tree = "(focus classes=3 (class id=1 (token (term key=a))))";

    insta::assert_snapshot!(errors("poliqarp", tree), @"error 304 at 0..51: class 3 is not defined in its operand");
}

#[test]
fn focus_without_class() {
    insta::assert_snapshot!(errors("poliqarp", "(focus (token (term key=a)))"), @"error 304 at 0..28: reference to an undefined class (hint: wrap part of the operand in a class)");
}

#[test]
fn negated_empty_token() {
    insta::assert_snapshot!(errors("poliqarp", "(not (token))"), @"error 302 at 0..13: an empty token cannot be negated");
}
