use super::lexer::{TokenKind, lex, token_text, unquote};

fn kinds(source: &str) -> String {
    lex(source)
        .iter()
        .filter(|t| !t.kind.is_trivia())
        .map(|t| format!("{:?} {:?}", t.kind, token_text(source, t)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn term_with_attributes() {
    let res = kinds(r#"(term layer=orth key="der Mann" value=/N.*/)"#);

    insta::assert_snapshot!(res, @r#"
    ParenOpen "("
    Word "term"
    Word "layer"
    Equals "="
    Word "orth"
    Word "key"
    Equals "="
    Str "\"der Mann\""
    Word "value"
    Equals "="
    Regex "/N.*/"
    ParenClose ")"
    "#);
}

#[test]
fn operator_symbols_are_words() {
    let res = kinds("(repetition q={2,3}) (operator min=-1 max=*)");

    insta::assert_snapshot!(res, @r#"
    ParenOpen "("
    Word "repetition"
    Word "q"
    Equals "="
    Word "{2,3}"
    ParenClose ")"
    ParenOpen "("
    Word "operator"
    Word "min"
    Equals "="
    Word "-1"
    Word "max"
    Equals "="
    Word "*"
    ParenClose ")"
    "#);
}

#[test]
fn comments_are_trivia() {
    let tokens = lex("(token) ; trailing comment");
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Comment));
    assert_eq!(tokens.iter().filter(|t| !t.kind.is_trivia()).count(), 3);
}

#[test]
fn unquote_resolves_escapes() {
    assert_eq!(unquote(r#""a\"b""#), r#"a"b"#);
    assert_eq!(unquote(r#""back\\slash""#), r"back\slash");
    assert_eq!(unquote(r#""keep\d""#), r"keep\d");
}
