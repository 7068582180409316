use serde_json::json;

use super::QueryBuilder;
use crate::compile::DEFAULT_RECURSION_FUEL;
use crate::diagnostics::DiagnosticKind;
use crate::dialect::Dialect;
use crate::dialect::poliqarp::{PoliqarpKind, PoliqarpNode};
use crate::emit::ApiVersion;
use crate::test_utils::{compile, dump_diagnostics};

const MANN: &str = "(token (term key=Mann))";

#[test]
fn missing_version() {
    let query = QueryBuilder::from_notation("poliqarp", MANN).build();

    insta::assert_snapshot!(dump_diagnostics(query.diagnostics()), @"error 309 at 0..0: no API version given (hint: the request is rendered as version 1.0)");
    assert_eq!(query.version(), ApiVersion::Current);
    assert!(query.graph().is_some());
    assert!(query.query().is_none());
    insta::assert_snapshot!(
        query.to_json_string().unwrap(),
        @r#"{"@context":"http://korap.ids-mannheim.de/ns/KoralQuery/v1.0/context.jsonld","errors":[[309,"no API version given"]],"query":null}"#
    );
}

#[test]
fn lenient_keeps_the_graph() {
    let query = QueryBuilder::from_notation("poliqarp", MANN)
        .lenient(true)
        .build();

    assert!(!query.is_valid());
    let json = query.to_json();
    assert_eq!(json["query"]["@type"], "koral:token");
    assert_eq!(json["errors"][0][0], 309);
}

#[test]
fn unsupported_version() {
    let query = QueryBuilder::from_notation("poliqarp", MANN)
        .version("2.0")
        .build();

    insta::assert_snapshot!(dump_diagnostics(query.diagnostics()), @"error 310 at 0..0: `2.0` is not a supported API version");
    assert_eq!(query.version(), ApiVersion::Current);
}

#[test]
fn unknown_query_language() {
    let query = compile("cql", "(token)");

    insta::assert_snapshot!(dump_diagnostics(query.diagnostics()), @"error 307 at 0..0: `cql` is not a supported query language");
    assert_eq!(query.dialect(), None);
    assert!(query.graph().is_none());
}

#[test]
fn blank_query() {
    let query = compile("poliqarp", "  \n ");

    insta::assert_snapshot!(dump_diagnostics(query.diagnostics()), @"error 301 at 0..0: no query given");
}

#[test]
fn unreadable_notation() {
    let query = compile("poliqarp", "(token))");

    insta::assert_snapshot!(dump_diagnostics(query.diagnostics()), @"error 302 at 7..8: could not parse the query at `)`");
    assert!(query.dump_diagnostics().contains("could not parse the query"));
}

#[test]
fn recursion_limit() {
    let query = QueryBuilder::from_notation("poliqarp", "(sequence (token) (token))")
        .version("1.0")
        .with_recursion_fuel(Some(1))
        .build();

    insta::assert_snapshot!(dump_diagnostics(query.diagnostics()), @"error 311 at 0..26: query too complex: nested too deeply");
    assert!(query.graph().is_none());
}

fn nested_repetitions(depth: u32) -> String {
    let depth = depth as usize;
    format!(
        "{}(token (term key=a)){}",
        "(repetition q=? ".repeat(depth),
        ")".repeat(depth)
    )
}

#[test]
fn nesting_within_the_default_fuel() {
    // Repetitions, the token and its term each take one level.
    let query = compile("poliqarp", &nested_repetitions(DEFAULT_RECURSION_FUEL - 2));

    assert!(query.is_valid());
    assert!(query.query().is_some());
    assert!(query.to_json_string().is_ok());
}

#[test]
fn nesting_past_the_default_fuel() {
    let query = compile("poliqarp", &nested_repetitions(DEFAULT_RECURSION_FUEL - 1));

    assert!(query.diagnostics().has_kind(DiagnosticKind::QueryTooComplex));
    assert!(query.graph().is_none());
    assert_eq!(
        query.to_json()["errors"],
        json!([[311, "query too complex: nested too deeply"]])
    );
}

#[test]
fn legacy_request() {
    let query = QueryBuilder::from_notation("poliqarp", "(class id=1 (token (term key=a)))")
        .version("v0.3")
        .filter_notation("(ref name=frag-1)")
        .build();

    assert!(query.is_valid());
    let json = query.to_json();
    assert_eq!(
        json["@context"],
        "http://korap.ids-mannheim.de/ns/koral/0.3/context.jsonld"
    );
    assert_eq!(json["query"]["@type"], "korap:group");
    assert_eq!(json["query"]["class"], 1);
    assert_eq!(
        json["collection"],
        json!({ "@type": "korap:docGroupRef", "ref": "frag-1" })
    );
    assert!(json.get("corpus").is_none());
}

#[test]
fn warnings_keep_the_query() {
    let query = compile("cosmas2", "(ov pos=FE (wf value=a) (elem name=s))");

    assert!(query.is_valid());
    let json = query.to_json();
    assert_eq!(
        json["warnings"],
        json!([[306, "query element ignored: identity check FE"]])
    );
    assert!(json.get("errors").is_none());
    assert!(json["query"].is_object());
}

#[test]
fn filter_errors_drop_the_query() {
    let query = QueryBuilder::from_notation("poliqarp", MANN)
        .version("1.0")
        .filter_notation("(doc key=pubDate op=since value=May)")
        .build();

    assert!(query.graph().is_some());
    assert!(query.query().is_none());
    assert!(query.filter().is_none());
}

#[test]
fn from_parse_tree() {
    let tree = PoliqarpNode::detached(PoliqarpKind::Token)
        .with_child(PoliqarpNode::detached(PoliqarpKind::Term).with_attr("key", "Mann"));
    let query = QueryBuilder::new(tree).version("1.0").build();

    assert_eq!(query.dialect(), Some(Dialect::Poliqarp));
    assert!(query.diagnostics().is_empty());
    insta::assert_snapshot!(query.dump_graph(), @"token orth=Mann");
}

#[test]
fn parse_failure_drops_the_filter() {
    let query = QueryBuilder::from_notation("poliqarp", "(token))")
        .version("1.0")
        .lenient(true)
        .filter_notation(r#"(doc key=author op="=" value=Goethe)"#)
        .build();

    assert!(query.query().is_none());
    assert!(query.filter().is_none());
    insta::assert_snapshot!(
        query.to_json_string().unwrap(),
        @r#"{"@context":"http://korap.ids-mannheim.de/ns/KoralQuery/v1.0/context.jsonld","errors":[[302,"could not parse the query at `)`"]],"query":null}"#
    );
}

#[test]
fn unreadable_filter_drops_the_query() {
    let query = QueryBuilder::from_notation("poliqarp", MANN)
        .version("1.0")
        .lenient(true)
        .filter_notation("(doc key=author")
        .build();

    assert!(query.graph().is_some());
    assert!(query.diagnostics().has_kind(DiagnosticKind::ParseFailure));
    assert!(query.query().is_none());
    assert!(query.filter().is_none());
}
