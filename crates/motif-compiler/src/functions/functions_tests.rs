use crate::ast::{Program, Query, Statement, View};
use crate::diagnostics::DiagnosticKind;
use crate::reader::{read_bool, read_value};
use crate::test_utils::{compile, compile_error, compile_program, folded, program_error};

use super::{Arity, FunctionRegistry};

fn view_and_query(view: &str, filter: &str, selection: &str) -> Program {
    Program::new(vec![
        Statement::View(View::new(view, read_bool(filter).unwrap())),
        Statement::Query(Query::default().select(read_value(selection).unwrap(), Some("x"))),
    ])
}

#[test]
fn builtin_registry_names() {
    let registry = FunctionRegistry::builtin();
    let names: Vec<_> = registry.names().collect();
    assert_eq!(
        names,
        vec![
            "parse_datetime",
            "format_datetime",
            "epoch_millis",
            "enum",
            "split",
            "frequency",
            "size",
            "funnel_completed",
            "funnel_step_reached",
            "segment_of",
            "in_view",
        ]
    );
    assert!(registry.get("size").is_some());
    assert!(registry.get("SIZE").is_none());
}

#[test]
fn arity_display_and_acceptance() {
    assert_eq!(Arity::Exact(1).to_string(), "1 argument");
    assert_eq!(Arity::Exact(2).to_string(), "2 arguments");
    assert_eq!(Arity::Between(2, 3).to_string(), "2 to 3 arguments");
    assert_eq!(Arity::AtLeast(2).to_string(), "at least 2 arguments");

    assert!(Arity::Between(2, 3).accepts(3));
    assert!(!Arity::Between(2, 3).accepts(4));
    assert!(Arity::AtLeast(2).accepts(9));
    assert!(!Arity::Exact(1).accepts(0));
}

#[test]
fn enum_folds_to_first_match() {
    assert_eq!(folded("enum('b', 'a', 'b')"), "1");
    assert_eq!(folded("enum('z', 'a', 'b')"), "(-1)");
    assert_eq!(
        folded("enum(country, 'de', 'fr')"),
        "enum(country, 'de', 'fr')"
    );
}

#[test]
fn enum_candidates_must_unify() {
    let err = compile_error("enum(country, 1)");
    assert_eq!(err.kind, DiagnosticKind::TypeError);
    assert_eq!(
        err.message,
        "type error: `enum` cannot compare STRING with INTEGER"
    );
}

#[test]
fn split_counts_boundaries_below() {
    assert_eq!(folded("split(5, 1, 10)"), "1");
    assert_eq!(folded("split(0, 1, 10)"), "0");
    assert_eq!(folded("split(10, 1, 10)"), "2");
    assert_eq!(
        folded("split(userId, 1, 10)"),
        "split(userId, 1, 10)"
    );
}

#[test]
fn split_boundaries_ascend() {
    let err = compile_error("split(userId, 10, 1)");
    assert_eq!(err.kind, DiagnosticKind::TypeError);
    assert_eq!(
        err.message,
        "type error: boundaries of `split` must be strictly ascending"
    );
}

#[test]
fn split_boundaries_are_constant() {
    let err = compile_error("split(userId, userId)");
    assert_eq!(err.kind, DiagnosticKind::ConstantRequiredError);
    assert_eq!(
        err.message,
        "constant expression required: argument 2 of `split` must be a constant"
    );
}

#[test]
fn size_needs_collection() {
    compile("size(sessions)").unwrap();
    compile("size(events.tags)").unwrap();
    let err = compile_error("size(userId)");
    assert_eq!(err.kind, DiagnosticKind::TypeError);
    assert_eq!(
        err.message,
        "type error: `size` needs a relation or vector field, `user.userId` is a scalar"
    );
}

#[test]
fn frequency_needs_path() {
    let err = compile_error("frequency(1)");
    assert_eq!(err.kind, DiagnosticKind::TypeError);
    assert_eq!(err.message, "type error: `frequency` expects a schema path");
}

#[test]
fn structure_functions_carry_evaluation_points() {
    compile("frequency(events.name) > size(sessions)").unwrap();
    let err = compile_error("frequency(events.name) == frequency(segments.segmentId)");
    assert_eq!(err.kind, DiagnosticKind::ScopeAxisError);
}

#[test]
fn format_datetime_uses_zone() {
    assert_eq!(
        folded("format_datetime(CAST(0 AS DATETIME), '%Y-%m-%d %H')"),
        "'1970-01-01 00'"
    );
    assert_eq!(
        folded("format_datetime(CAST(0 AS DATETIME), '%H', 'Asia/Tokyo')"),
        "'09'"
    );
}

#[test]
fn format_datetime_rejects_bad_input() {
    let err = compile_error("format_datetime(signup, '%Y', 'Nowhere/Zone')");
    assert_eq!(
        err.message,
        "type error: `Nowhere/Zone` is not a known time zone"
    );

    let err = compile_error("format_datetime(country, '%Y')");
    assert_eq!(
        err.message,
        "type error: argument 1 of `format_datetime` must be a DATETIME, found STRING"
    );
}

#[test]
fn epoch_millis_folds_to_long() {
    assert_eq!(
        folded("epoch_millis(CAST(5 AS DATETIME))"),
        "CAST(5 AS LONG)"
    );
}

#[test]
fn reference_resolves_statement() {
    let optimized = compile_program(view_and_query("active", "userId > 0", "in_view('active')"))
        .unwrap();
    assert!(optimized.render().contains("SELECT in_view('active') AS x"));
}

#[test]
fn reference_suggests_close_statement() {
    let err = program_error(view_and_query("active", "userId > 0", "in_view('ative')"));
    assert_eq!(err.kind, DiagnosticKind::UnresolvedReference);
    assert_eq!(err.message, "`ative` is not defined");
    assert_eq!(err.hints, vec!["did you mean `active`?"]);
}

#[test]
fn reference_checks_statement_kind() {
    let err = program_error(view_and_query("active", "userId > 0", "segment_of('active')"));
    assert_eq!(err.kind, DiagnosticKind::TypeError);
    assert_eq!(err.message, "type error: `active` is a view, not a segment");
}

#[test]
fn reference_needs_literal_name() {
    let err = program_error(view_and_query("active", "userId > 0", "in_view(country)"));
    assert_eq!(
        err.message,
        "type error: `in_view` expects the view name as a string literal"
    );
}

#[test]
fn statement_cannot_reference_itself() {
    let program = Program::new(vec![Statement::View(View::new(
        "v",
        read_bool("in_view('v')").unwrap(),
    ))]);
    let err = program_error(program);
    assert_eq!(err.kind, DiagnosticKind::TypeError);
    assert_eq!(err.message, "type error: `v` cannot refer to itself");
}

#[test]
fn reference_outside_program_is_unresolved() {
    let err = compile_error("in_view('active')");
    assert_eq!(err.kind, DiagnosticKind::UnresolvedReference);
}
