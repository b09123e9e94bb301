use indoc::indoc;
use motif_core::{Constant, DataType};

use crate::ast::{
    Expr, Funnel, FunnelType, ParameterDecl, Program, Query, Segment, SegmentDefinition,
    Statement, StepDefinition, Trigger, ValueExpr, View,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::reader::{read_bool, read_pattern, read_value};
use crate::render::Motif;
use crate::test_utils::{compile_program, program_error, session};
use crate::{CompileConfig, Error};

fn count_query() -> Program {
    Program::new(vec![Statement::Query(
        Query::default()
            .select(read_value("COUNT(events.eventId)").unwrap(), Some("n"))
            .with_where(read_bool("(1 + 1) == 2").unwrap()),
    )])
}

fn funnel(steps: &[(i64, &str)], pattern: &str) -> Funnel {
    let mut funnel = Funnel::new(
        "checkout",
        FunnelType::Conversion,
        read_pattern(pattern).unwrap(),
    )
    .with_source("sessions");
    for (id, when) in steps {
        funnel = funnel.with_step(StepDefinition::new(*id, read_bool(when).unwrap()));
    }
    funnel
}

fn triggered(mut funnel: Funnel, id: i64, trigger: Trigger) -> Funnel {
    if let Some(step) = funnel.steps.get_mut(&id) {
        step.trigger = Some(trigger);
    }
    funnel
}

fn single(statement: Statement) -> Program {
    Program::new(vec![statement])
}

fn with_count(text: &str, count: Option<&str>) -> Diagnostic {
    let mut value = read_value(text).unwrap();
    let ValueExpr::Aggregation(node) = &mut value else {
        panic!("expected an aggregation");
    };
    node.count = count.map(|c| Box::new(read_value(c).unwrap()));
    let err = session().compile_expr(Expr::Value(value)).unwrap_err();
    err.diagnostic()
        .unwrap_or_else(|| panic!("no diagnostic in {err}"))
}

#[test]
fn stages_run_in_order() {
    let session = session();
    let bound = session.bind(count_query()).unwrap();
    let Statement::Query(query) = &bound.program().statements[0] else {
        panic!("expected a query");
    };
    assert_eq!(
        query.selections[0].expr.generate_motif(0),
        "COUNT(events.eventId SCOPE user QUANTA 1)"
    );

    let validated = bound.validate().unwrap();
    let Statement::Query(query) = &validated.program().statements[0] else {
        panic!("expected a query");
    };
    assert_eq!(
        query.condition.as_ref().unwrap().generate_motif(0),
        "((1 + 1) == 2)"
    );

    let optimized = validated.optimize().unwrap();
    assert_eq!(
        optimized.render(),
        indoc! {"
            QUERY
              SELECT COUNT(events.eventId SCOPE user QUANTA 1) AS n
              WHERE TRUE
        "}
    );
}

#[test]
fn duplicate_statement_names_rejected() {
    let program = Program::new(vec![
        Statement::View(View::new("v", read_bool("TRUE").unwrap())),
        Statement::View(View::new("v", read_bool("FALSE").unwrap())),
    ]);
    let err = program_error(program);
    assert_eq!(err.kind, DiagnosticKind::DuplicateDefinition);
    assert_eq!(err.message, "`v` is already defined");
}

#[test]
fn statements_see_each_other_in_any_order() {
    let program = Program::new(vec![
        Statement::View(View::new("late", read_bool("in_view('early')").unwrap())),
        Statement::View(View::new("early", read_bool("userId > 0").unwrap())),
    ]);
    compile_program(program).unwrap();
}

#[test]
fn parameters_bind_in_statement_scope() {
    let mut query = Query::default()
        .select(read_value("userId").unwrap(), None)
        .with_where(read_bool("userId > $min").unwrap());
    query
        .parameters
        .push(ParameterDecl::new("min", DataType::Long).with_default(Constant::Long(5)));
    compile_program(single(Statement::Query(query.clone()))).unwrap();

    query.condition = Some(read_bool("userId > $mn").unwrap());
    let err = program_error(single(Statement::Query(query)));
    assert_eq!(err.kind, DiagnosticKind::UnresolvedReference);
    assert_eq!(err.message, "`$mn` is not defined");
    assert_eq!(err.hints, vec!["did you mean `min`?"]);
}

#[test]
fn parameter_default_must_fit() {
    let mut view = View::new("v", read_bool("TRUE").unwrap());
    view.parameters
        .push(ParameterDecl::new("d", DataType::Datetime).with_default(Constant::from("nope")));
    let err = program_error(single(Statement::View(view)));
    assert_eq!(err.kind, DiagnosticKind::TypeError);
}

#[test]
fn query_limit_folds() {
    let mut query = Query::default().select(read_value("userId").unwrap(), None);
    query.limit = Some(read_value("5 * 2").unwrap());
    let optimized = compile_program(single(Statement::Query(query.clone()))).unwrap();
    assert!(optimized.render().contains("LIMIT CAST(10 AS LONG)"));

    query.limit = Some(read_value("userId").unwrap());
    let err = program_error(single(Statement::Query(query.clone())));
    assert_eq!(err.kind, DiagnosticKind::ConstantRequiredError);
    assert_eq!(
        err.message,
        "constant expression required: LIMIT depends on runtime data"
    );

    query.limit = Some(read_value("-1").unwrap());
    let err = program_error(single(Statement::Query(query)));
    assert_eq!(err.message, "type error: LIMIT must be at least 0, found -1");
}

#[test]
fn funnel_defaults_filled() {
    let funnel = triggered(
        funnel(
            &[(1, "events.name == 'view'"), (2, "events.name == 'buy'")],
            "1:2",
        ),
        2,
        Trigger {
            within: Some(read_value("HOURS(1)").unwrap()),
            ..Trigger::default()
        },
    );
    let optimized = compile_program(single(Statement::Funnel(funnel))).unwrap();
    assert_eq!(
        optimized.render(),
        indoc! {"
            FUNNEL checkout CONVERSION
              SOURCES sessions
              STEP 1 WHEN (events.name == 'view')
              STEP 2 WHEN (events.name == 'buy') TRIGGER TIMING user.sessions.events.ts WITHIN CAST(3600000 AS LONG) AFTER CAST(0 AS LONG)
              MATCH 1:2
              WITHIN CAST(0 AS LONG)
        "}
    );
}

#[test]
fn timing_falls_back_to_first_source() {
    let funnel = triggered(
        funnel(&[(1, "TRUE"), (2, "sessions.device == 'ios'")], "1:2"),
        1,
        Trigger::default(),
    );
    let optimized = compile_program(single(Statement::Funnel(funnel))).unwrap();
    assert!(
        optimized
            .render()
            .contains("STEP 1 WHEN TRUE TRIGGER TIMING user.sessions.start")
    );
}

#[test]
fn timing_needs_ordinal_field() {
    let mut funnel = triggered(
        funnel(&[(1, "userId > 1"), (2, "TRUE")], "1:2"),
        1,
        Trigger::default(),
    );
    funnel.sources.clear();
    let err = program_error(single(Statement::Funnel(funnel)));
    assert_eq!(err.kind, DiagnosticKind::ScopeAxisError);
    assert_eq!(
        err.message,
        "expression mixes unrelated relations: no relation at or above `user` has an ordinal field to time the step"
    );
}

#[test]
fn step_reference_must_exist() {
    let funnel = funnel(&[(1, "STEP(3)"), (2, "TRUE")], "1:2");
    let err = program_error(single(Statement::Funnel(funnel)));
    assert_eq!(err.kind, DiagnosticKind::PatternStructureError);
    assert_eq!(
        err.message,
        "invalid match pattern: step 3 is not defined in this funnel"
    );
}

#[test]
fn step_cannot_reference_itself() {
    let funnel = funnel(&[(1, "TRUE"), (2, "STEP(2)")], "1:2");
    let err = program_error(single(Statement::Funnel(funnel)));
    assert_eq!(err.message, "invalid match pattern: step 2 refers to itself");
}

#[test]
fn pattern_steps_must_exist() {
    let funnel = funnel(&[(1, "TRUE"), (2, "STEP(1)")], "1:5");
    let err = program_error(single(Statement::Funnel(funnel)));
    assert_eq!(err.kind, DiagnosticKind::PatternStructureError);
    assert_eq!(err.message, "invalid match pattern: step 5 is not defined");
    assert_eq!(err.hints, vec!["defined steps: 1, 2"]);
}

#[test]
fn funnel_within_is_non_negative() {
    let mut funnel = funnel(&[(1, "TRUE")], "1");
    funnel.within = Some(read_value("-5").unwrap());
    let err = program_error(single(Statement::Funnel(funnel)));
    assert_eq!(err.message, "type error: WITHIN must be at least 0, found -5");
}

#[test]
fn steps_stay_on_source_axis() {
    let mut funnel = funnel(&[(1, "events.name == 'x'")], "1");
    funnel.sources = vec!["segments".to_string()];
    let err = program_error(single(Statement::Funnel(funnel)));
    assert_eq!(err.kind, DiagnosticKind::ScopeAxisError);
}

#[test]
fn segment_definitions_unique_and_named() {
    let duplicate = Segment::new(
        "tier",
        vec![
            SegmentDefinition::new("a", read_bool("userId > 1").unwrap()),
            SegmentDefinition::new("a", read_bool("TRUE").unwrap()),
        ],
    );
    let err = program_error(single(Statement::Segment(duplicate)));
    assert_eq!(err.kind, DiagnosticKind::DuplicateDefinition);
    assert_eq!(err.message, "`a` is already defined");

    let unnamed = Segment::new(
        "tier",
        vec![SegmentDefinition::new(" ", read_bool("TRUE").unwrap())],
    );
    assert_eq!(
        program_error(single(Statement::Segment(unnamed))).kind,
        DiagnosticKind::PatternStructureError
    );
}

#[test]
fn top_without_count_rejected() {
    let err = with_count("TOP(3, events.eventId)", None);
    assert_eq!(err.kind, DiagnosticKind::ArityError);
    assert_eq!(err.message, "`TOP` needs a count");
}

#[test]
fn count_on_other_aggregations_rejected() {
    let err = with_count("COUNT(events.eventId)", Some("3"));
    assert_eq!(err.kind, DiagnosticKind::ArityError);
    assert_eq!(err.message, "`COUNT` does not take a count");
}

#[test]
fn views_referring_in_a_cycle_rejected() {
    let program = Program::new(vec![
        Statement::View(View::new("a", read_bool("in_view('b')").unwrap())),
        Statement::View(View::new("b", read_bool("in_view('a')").unwrap())),
    ]);
    let err = program_error(program);
    assert_eq!(err.kind, DiagnosticKind::TypeError);
    assert_eq!(
        err.message,
        "type error: `a` refers to itself through `a` -> `b` -> `a`"
    );
}

#[test]
fn references_without_cycle_accepted() {
    let program = Program::new(vec![
        Statement::View(View::new("a", read_bool("in_view('b') AND in_view('c')").unwrap())),
        Statement::View(View::new("b", read_bool("in_view('c')").unwrap())),
        Statement::View(View::new("c", read_bool("userId > 0").unwrap())),
    ]);
    compile_program(program).unwrap();
}

#[test]
fn step_timing_shares_condition_axis() {
    let funnel = triggered(
        funnel(&[(1, "events.name == 'view'"), (2, "TRUE")], "1:2"),
        1,
        Trigger {
            timing: Some(read_value("segments.joined").unwrap()),
            ..Trigger::default()
        },
    );
    let err = program_error(single(Statement::Funnel(funnel)));
    assert_eq!(err.kind, DiagnosticKind::ScopeAxisError);
    assert_eq!(
        err.message,
        "expression mixes unrelated relations: step timing at `user.segments` is on no path of the step condition at `user.sessions.events`"
    );
}

#[test]
fn program_depth_checked_before_bind() {
    let program = single(Statement::View(View::new(
        "v",
        read_bool("((userId + 1) + 1) > 0").unwrap(),
    )));
    let err = session().with_max_depth(2).compile(program).unwrap_err();
    assert!(matches!(err, Error::RecursionLimitExceeded(_)), "{err}");
}

#[test]
fn compile_is_idempotent() {
    let program = Program::new(vec![
        count_query().statements.remove(0),
        Statement::Funnel(triggered(
            funnel(
                &[(1, "events.name == 'view'"), (2, "events.name == 'buy'")],
                "1:(?:2)*:2",
            ),
            2,
            Trigger::default(),
        )),
    ]);
    let once = compile_program(program).unwrap();
    let twice = compile_program(once.program.clone()).unwrap();
    assert_eq!(twice.render(), once.render());
}

#[test]
fn optimized_outputs() {
    let optimized = compile_program(count_query()).unwrap();
    assert!(optimized.explain().starts_with("Query <anonymous>\n  select n:\n"));

    let json: serde_json::Value = serde_json::from_str(&optimized.to_json().unwrap()).unwrap();
    assert_eq!(json["statements"][0]["kind"], "query");
    assert_eq!(json["statements"][0]["where"]["kind"], "constant");
}

#[test]
fn config_reaches_session() {
    let config = CompileConfig {
        default_time_zone: "Asia/Tokyo".to_string(),
        ..CompileConfig::default()
    };
    let session = session().with_config(config.clone());
    assert_eq!(session.config(), &config);
    let expr = crate::reader::read_expr("EXTRACT(HOUR_OF_DAY, CAST(0 AS DATETIME))").unwrap();
    assert_eq!(session.compile_expr(expr).unwrap().generate_motif(0), "9");
}
