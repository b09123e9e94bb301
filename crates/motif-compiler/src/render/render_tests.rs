use indoc::indoc;
use motif_core::Constant;

use super::{Explain, Motif, constant_text, from_json, to_json};
use crate::ast::{
    Expr, Funnel, FunnelType, ParameterDecl, Program, Query, Segment, SegmentDefinition,
    Statement, StepDefinition, Trigger, ValueExpr, View,
};
use crate::reader::{read_bool, read_expr, read_pattern, read_value};
use crate::test_utils::compile;
use crate::Error;

fn query() -> Query {
    let mut query = Query::default()
        .select(read_value("COUNT(events.eventId)").unwrap(), Some("n"))
        .with_where(read_bool("country == 'de'").unwrap());
    query.name = Some("q".to_string());
    query.parameters.push(
        ParameterDecl::new("min", motif_core::DataType::Long).with_default(Constant::Long(5)),
    );
    query.group_by.push(read_value("country").unwrap());
    query.limit = Some(ValueExpr::constant(10));
    query.tags.push("daily".to_string());
    query
}

fn funnel() -> Funnel {
    let mut funnel = Funnel::new("checkout", FunnelType::Conversion, read_pattern("1:2").unwrap())
        .with_source("sessions")
        .with_step(StepDefinition::new(1, read_bool("events.name == 'view'").unwrap()))
        .with_step(
            StepDefinition::new(2, read_bool("events.name == 'buy'").unwrap()).triggered(Trigger {
                within: Some(read_value("HOURS(1)").unwrap()),
                ..Trigger::default()
            }),
        );
    funnel.within = Some(read_value("DAYS(7)").unwrap());
    funnel
}

#[test]
fn constant_literals() {
    let cases = [
        (Constant::Integer(7), "7"),
        (Constant::Integer(-5), "(-5)"),
        (Constant::Long(5), "CAST(5 AS LONG)"),
        (Constant::Long(-3), "CAST((-3) AS LONG)"),
        (Constant::Long(6_000_000_000), "6000000000"),
        (Constant::Byte(1), "CAST(1 AS BYTE)"),
        (Constant::Short(-2), "CAST((-2) AS SHORT)"),
        (Constant::Double(2.0), "2.0"),
        (Constant::Double(-0.5), "(-0.5)"),
        (Constant::Double(f64::NAN), "CAST('NaN' AS DOUBLE)"),
        (Constant::Double(f64::NEG_INFINITY), "CAST('-inf' AS DOUBLE)"),
        (Constant::Datetime(0), "CAST(0 AS DATETIME)"),
        (Constant::from("it's"), "'it''s'"),
        (Constant::Boolean(true), "TRUE"),
        (Constant::Null, "NULL"),
    ];
    for (value, text) in cases {
        assert_eq!(constant_text(&value), text, "{value:?}");
    }
}

#[test]
fn literals_read_back_unchanged() {
    for value in [
        Constant::Long(-3),
        Constant::Long(6_000_000_000),
        Constant::Short(-2),
        Constant::Double(-0.5),
        Constant::Datetime(86_400_000),
        Constant::from("it's"),
    ] {
        let text = constant_text(&value);
        let read = read_value(&text).unwrap();
        assert_eq!(read.as_constant(), Some(&value), "{text}");
    }
}

#[test]
fn query_layout() {
    let text = Statement::Query(query()).generate_motif(0);
    assert_eq!(
        text,
        indoc! {"
            QUERY q
              PARAMETERS $min LONG DEFAULT CAST(5 AS LONG)
              SELECT COUNT(events.eventId) AS n
              WHERE (country == 'de')
              GROUP BY country
              LIMIT 10
              TAGS 'daily'
        "}
    );
}

#[test]
fn nested_statements_indent() {
    let view = Statement::View(View::new("active", read_bool("userId > 0").unwrap()));
    assert_eq!(
        view.generate_motif(1),
        "  VIEW active\n    WHERE (userId > 0)\n"
    );
}

#[test]
fn funnel_layout() {
    let text = Statement::Funnel(funnel()).generate_motif(0);
    assert_eq!(
        text,
        indoc! {"
            FUNNEL checkout CONVERSION
              SOURCES sessions
              STEP 1 WHEN (events.name == 'view')
              STEP 2 WHEN (events.name == 'buy') TRIGGER WITHIN HOURS(1)
              MATCH 1:2
              WITHIN DAYS(7)
        "}
    );
}

#[test]
fn segment_layout() {
    let segment = Segment::new(
        "tier",
        vec![
            SegmentDefinition::new("high", read_bool("userId > 100").unwrap()),
            SegmentDefinition::new("rest", read_bool("TRUE").unwrap()),
        ],
    );
    assert_eq!(
        Statement::Segment(segment).generate_motif(0),
        indoc! {"
            SEGMENT tier
              DEFINE 'high' WHERE (userId > 100)
              DEFINE 'rest' WHERE TRUE
        "}
    );
}

#[test]
fn program_separates_statements() {
    let program = Program::new(vec![
        Statement::View(View::new("a", read_bool("TRUE").unwrap())),
        Statement::View(View::new("b", read_bool("FALSE").unwrap())),
    ]);
    assert_eq!(
        program.generate_motif(0),
        "VIEW a\n  WHERE TRUE\n\nVIEW b\n  WHERE FALSE\n"
    );
}

#[test]
fn explain_unbound_expression() {
    let expr = read_expr("(userId + 1) > 5").unwrap();
    insta::assert_snapshot!(expr.explain(0), @r"
    Comparison >
      ValueBinary +
        Path userId
        Constant INTEGER 1
      Constant INTEGER 5
    ");
}

#[test]
fn explain_shows_resolved_paths() {
    let expr = compile("userId > 5").unwrap();
    insta::assert_snapshot!(expr.explain(0), @r"
    Comparison >
      Path userId -> user.userId
      Constant INTEGER 5
    ");
}

#[test]
fn explain_pattern_marks_non_capturing() {
    let pattern = read_pattern("1:(?:2)*:3").unwrap();
    insta::assert_snapshot!(pattern.explain(0), @r"
    List And
      Step 1
      Repeat 0.. non-capturing
        Step 2 non-capturing
      Step 3
    ");
}

#[test]
fn explain_statement() {
    let view = Statement::View(View::new("active", read_bool("NOT userId IS NULL").unwrap()));
    insta::assert_snapshot!(view.explain(0), @r"
    View active
      where:
        Not
          NullTest IS NULL
            Path userId
    ");
}

#[test]
fn json_round_trip_is_stable() {
    let program = Program::new(vec![
        Statement::Query(query()),
        Statement::Funnel(funnel()),
    ]);
    let text = to_json(&program).unwrap();
    let back: Program = from_json(&text).unwrap();
    assert_eq!(to_json(&back).unwrap(), text);
    assert_eq!(back.generate_motif(0), program.generate_motif(0));
}

#[test]
fn json_keeps_non_finite_doubles() {
    for text in ["CAST('NaN' AS DOUBLE)", "CAST('inf' AS DOUBLE)", "CAST('-inf' AS DOUBLE)"] {
        let expr = compile(text).unwrap();
        let json = to_json(&expr).unwrap();
        let back: Expr = from_json(&json).unwrap();
        assert_eq!(to_json(&back).unwrap(), json);
        assert_eq!(back.generate_motif(0), text);
    }
}

#[test]
fn json_rejects_malformed_input() {
    let err = from_json::<Program>("{").unwrap_err();
    assert!(matches!(err, Error::Json(_)), "{err}");
    assert!(err.diagnostic().is_none());
}
