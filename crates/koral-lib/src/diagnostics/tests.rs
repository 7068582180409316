use rowan::TextRange;

use super::*;

fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

#[test]
fn severity_display() {
    insta::assert_snapshot!(format!("{}", Severity::Error), @"error");
    insta::assert_snapshot!(format!("{}", Severity::Warning), @"warning");
}

#[test]
fn report_with_default_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::NoQuery, range(0, 0))
        .emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    assert_eq!(diagnostics.raw()[0].message(), "no query given");
}

#[test]
fn only_parse_failures_and_fuel_are_fatal() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MalformedQuery, range(0, 4))
        .emit();
    assert!(!diagnostics.has_fatal());

    diagnostics
        .report(DiagnosticKind::ParseFailure, range(4, 5))
        .message(")")
        .emit();
    assert!(diagnostics.has_fatal());
}

#[test]
fn report_with_custom_message() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownQueryLanguage, range(0, 4))
        .message("cql")
        .emit();
    diagnostics
        .report(DiagnosticKind::MalformedQuery, range(0, 4))
        .message("Distance may not be 0")
        .emit();

    let messages: Vec<_> = diagnostics.iter().map(|d| d.message()).collect();
    assert_eq!(
        messages,
        ["`cql` is not a supported query language", "Distance may not be 0"]
    );
}

#[test]
fn status_codes() {
    assert_eq!(DiagnosticKind::ParseFailure.code(), 302);
    assert_eq!(DiagnosticKind::MalformedQuery.code(), 302);
    assert_eq!(DiagnosticKind::UnboundRelation.code(), 308);
    assert_eq!(DiagnosticKind::DistanceCropped.code(), 311);
    assert_eq!(DiagnosticKind::LemmaWildcards.code(), 350);
    assert_eq!(DiagnosticKind::UnknownQueryError.code(), 399);
}

#[test]
fn diagnostic_kind_default_severity() {
    assert_eq!(
        DiagnosticKind::QueryTooComplex.default_severity(),
        Severity::Error
    );
    assert_eq!(
        DiagnosticKind::DistanceCropped.default_severity(),
        Severity::Warning
    );
    assert_eq!(
        DiagnosticKind::IgnoredQueryElement.default_severity(),
        Severity::Warning
    );
}

#[test]
fn diagnostics_collection_methods() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownQueryElement, range(0, 1))
        .emit();
    diagnostics
        .report(DiagnosticKind::DeprecatedQueryElement, range(1, 2))
        .emit();
    diagnostics
        .report(DiagnosticKind::LooksLikeDate, range(2, 3))
        .emit();

    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(diagnostics.warning_count(), 2);
    assert!(diagnostics.has_warnings());
    assert!(diagnostics.has_kind(DiagnosticKind::LooksLikeDate));
    assert!(!diagnostics.has_kind(DiagnosticKind::NoQuery));
}

#[test]
fn unique_removes_duplicates_in_order() {
    let mut diagnostics = Diagnostics::new();
    for (start, element) in [(0, "meta"), (5, "within"), (9, "meta")] {
        diagnostics
            .report(DiagnosticKind::UnknownQueryElement, range(start, start + 1))
            .message(element)
            .emit();
    }
    diagnostics
        .report(DiagnosticKind::DistanceCropped, range(0, 1))
        .message("150")
        .emit();

    assert_eq!(
        diagnostics.unique(Severity::Error),
        [
            (306, "`meta` is not a known query element"),
            (306, "`within` is not a known query element"),
        ]
    );
    assert_eq!(
        diagnostics.unique(Severity::Warning),
        [(311, "distance 150 cropped to the maximum")]
    );
}

#[test]
fn extend_appends() {
    let mut first = Diagnostics::new();
    first.report(DiagnosticKind::NoQuery, range(0, 0)).emit();
    let mut second = Diagnostics::new();
    second
        .report(DiagnosticKind::MissingVersion, range(0, 0))
        .emit();

    first.extend(second);

    assert_eq!(first.len(), 2);
}

#[test]
fn plain_rendering_without_source() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnboundRelation, range(3, 5))
        .message("#3 is never bound")
        .related_to("declared here", range(10, 12))
        .emit();
    diagnostics
        .report(DiagnosticKind::LooksLikeDate, range(6, 10))
        .emit();

    let result = diagnostics.printer().render();
    insta::assert_snapshot!(result, @r"
    error 308 at 3..5: #3 is never bound (related: declared here at 10..12)
    warning 305 at 6..10: value looks like a date but is compared as a string (hint: use `in`, `since` or `until` to compare dates)
    ");
}

#[test]
fn printer_with_related() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::UnknownQueryElement, range(0, 5))
        .message("lemma")
        .related_to("in this token", range(6, 10))
        .emit();

    let result = diagnostics.printer().source("hello world!").render();
    insta::assert_snapshot!(result, @r"
    error: [306] `lemma` is not a known query element
      |
    1 | hello world!
      | ^^^^^ ---- in this token
    ");
}

#[test]
fn printer_with_path() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MalformedQuery, range(0, 5))
        .message("Distance may not be 0")
        .emit();

    let result = diagnostics
        .printer()
        .source("hello world")
        .path("query.aql")
        .render();
    insta::assert_snapshot!(result, @r"
    error: [302] Distance may not be 0
     --> query.aql:1:1
      |
    1 | hello world
      | ^^^^^
    ");
}

#[test]
fn printer_zero_width_range() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::NoQuery, TextRange::empty(0.into()))
        .emit();

    let result = diagnostics.printer().source("hello").render();
    insta::assert_snapshot!(result, @r"
    error: [301] no query given
      |
    1 | hello
      | ^
    ");
}

#[test]
fn printer_hint_labels_the_range() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::MissingVersion, TextRange::empty(0.into()))
        .emit();

    let result = diagnostics.printer().source("(tok)").render();
    insta::assert_snapshot!(result, @r"
    error: [309] no API version given
      |
    1 | (tok)
      | ^ the request is rendered as version 1.0
    ");
}

#[test]
fn printer_range_past_the_source() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::QueryTooComplex, range(2, 40))
        .emit();

    let result = diagnostics.printer().source("hello").render();
    insta::assert_snapshot!(result, @r"
    error: [311] query too complex
      |
    1 | hello
      |   ^^^
    ");
}

#[test]
fn printer_only_one_severity() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DeprecatedQueryElement, range(0, 6))
        .message("meta")
        .emit();
    diagnostics
        .report(DiagnosticKind::NoQuery, range(0, 0))
        .emit();

    let warnings = diagnostics.printer().only(Severity::Warning).render();
    insta::assert_snapshot!(warnings, @"warning 303 at 0..6: deprecated query element: meta");
    let errors = diagnostics.printer().only(Severity::Error).render();
    insta::assert_snapshot!(errors, @"error 301 at 0..0: no query given");
}

#[test]
fn printer_colored() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .report(DiagnosticKind::DeprecatedQueryElement, range(0, 5))
        .message("meta")
        .emit();

    let result = diagnostics.printer().source("hello").colored(true).render();
    assert!(result.contains("meta"));
    assert!(result.contains('\x1b'));
}

#[test]
fn printer_empty_diagnostics() {
    let diagnostics = Diagnostics::new();
    let result = diagnostics.printer().source("source").render();
    assert!(result.is_empty());
}
