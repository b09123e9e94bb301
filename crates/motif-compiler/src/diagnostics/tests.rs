use super::*;

#[test]
fn fallback_message_without_detail() {
    let diag = Diagnostic::new(DiagnosticKind::TypeError, Span::new(0, 3));
    assert_eq!(diag.message, "type error");
}

#[test]
fn custom_message_uses_template() {
    let diag = Diagnostic::new(DiagnosticKind::UnresolvedReference, Span::new(0, 3)).message("foo");
    assert_eq!(diag.message, "`foo` is not defined");

    let diag = Diagnostic::new(DiagnosticKind::TypeError, Span::new(0, 3))
        .message("STRING and LONG are not comparable");
    assert_eq!(
        diag.message,
        "type error: STRING and LONG are not comparable"
    );
}

#[test]
fn default_hint_is_attached() {
    let diag = Diagnostic::new(DiagnosticKind::ScopeAxisError, Span::default());
    assert_eq!(diag.hints.len(), 1);
}

#[test]
fn kinds_ordered_by_pipeline_stage() {
    assert!(DiagnosticKind::SyntaxDefect < DiagnosticKind::UnresolvedReference);
    assert!(DiagnosticKind::UnresolvedReference < DiagnosticKind::TypeError);
    assert!(DiagnosticKind::TypeError < DiagnosticKind::PatternStructureError);
}

#[test]
fn span_cover_ignores_synthetic() {
    let a = Span::new(4, 8);
    assert_eq!(a.cover(Span::default()), a);
    assert_eq!(Span::default().cover(a), a);
    assert_eq!(a.cover(Span::new(1, 5)), Span::new(1, 8));
}

#[test]
fn or_span_only_fills_synthetic() {
    let diag = Diagnostic::new(DiagnosticKind::TypeError, Span::default()).or_span(Span::new(2, 4));
    assert_eq!(diag.span, Span::new(2, 4));
    let diag = diag.or_span(Span::new(9, 10));
    assert_eq!(diag.span, Span::new(2, 4));
}

#[test]
fn display_plain() {
    let diag = Diagnostic::new(DiagnosticKind::UnresolvedReference, Span::new(0, 5))
        .message("evnts")
        .hint("did you mean `events`?")
        .related_to("declared here", Span::new(7, 9));
    insta::assert_snapshot!(diag.to_string(), @"error at 0..5: `evnts` is not defined (related: declared here at 7..9) (hint: did you mean `events`?)");
}

#[test]
fn printer_without_source_falls_back_to_display() {
    let diag = Diagnostic::new(DiagnosticKind::TypeError, Span::new(0, 1));
    assert_eq!(diag.printer().render(), "error at 0..1: type error");
}

#[test]
fn printer_with_source_annotates_span() {
    let source = "evnts.ts > 5";
    let diag = Diagnostic::new(DiagnosticKind::UnresolvedReference, Span::new(0, 8))
        .message("evnts.ts");
    let out = diag.printer().source(source).render();
    assert!(out.contains("`evnts.ts` is not defined"));
    assert!(out.contains(source));
    assert!(out.contains("^^^^^^^^"));
}
