use motif_core::{ArithmeticOp, ComparisonOp, DataType};
use serde_json::json;

use super::*;

fn sum() -> Expr {
    Expr::Value(ValueExpr::binary(
        ArithmeticOp::Add,
        ValueExpr::path("userId"),
        ValueExpr::constant(1),
    ))
}

#[test]
fn children_in_source_order() {
    let expr = Expr::Bool(BoolExpr::between(
        ValueExpr::path("userId"),
        ValueExpr::constant(1),
        ValueExpr::constant(9),
    ));
    assert_eq!(expr.child_count(), 3);
    let Some(ExprRef::Value(lower)) = expr.child(1) else {
        panic!("expected a value slot");
    };
    assert_eq!(lower.as_constant(), Some(&Constant::Integer(1)));
    assert!(expr.child(3).is_none());
}

#[test]
fn aggregation_children_skip_absent_parts() {
    let aggregation = Aggregation::new(AggregationOp::Sum, ValueExpr::path("sessions.duration"))
        .with_where(BoolExpr::constant(true));
    let expr = Expr::Value(aggregation.into());
    let kinds: Vec<_> = (0..expr.child_count())
        .filter_map(|i| expr.child(i))
        .map(|child| match child {
            ExprRef::Bool(b) => b.kind(),
            ExprRef::Value(v) => v.kind(),
        })
        .collect();
    assert_eq!(kinds, vec![NodeKind::Path, NodeKind::Constant]);
}

#[test]
fn set_child_swaps_matching_family() {
    let mut expr = sum();
    let previous = expr
        .set_child(1, Expr::Value(ValueExpr::constant(2)))
        .unwrap();
    assert_eq!(previous, Expr::Value(ValueExpr::constant(1)));
    let Some(ExprRef::Value(right)) = expr.child(1) else {
        panic!("expected a value slot");
    };
    assert_eq!(right.as_constant(), Some(&Constant::Integer(2)));
}

#[test]
fn set_child_rejects_wrong_family() {
    let mut expr = sum();
    let offered = Expr::Bool(BoolExpr::constant(true));
    assert_eq!(expr.set_child(0, offered.clone()), Err(offered));
}

#[test]
fn set_child_rejects_missing_slot() {
    let mut expr = Expr::Value(ValueExpr::constant(1));
    let offered = Expr::Value(ValueExpr::constant(2));
    assert_eq!(expr.set_child(0, offered.clone()), Err(offered));
}

#[test]
fn membership_slots_include_candidates() {
    let list = BoolExpr::in_list(
        ValueExpr::path("country"),
        vec![ValueExpr::constant("de"), ValueExpr::constant("fr")],
    );
    assert_eq!(list.child_count(), 3);
    let vector = BoolExpr::in_vector(ValueExpr::constant("x"), ValueExpr::path("events.tags"));
    assert_eq!(vector.child_count(), 2);
}

#[test]
fn binary_span_covers_operands() {
    let left = ValueExpr::path("a").with_span(Span::new(0, 1));
    let right = ValueExpr::path("b").with_span(Span::new(4, 5));
    let expr = ValueExpr::binary(ArithmeticOp::Add, left, right);
    assert_eq!(expr.span(), Span::new(0, 5));
}

#[test]
fn boundary_steps_take_negative_ids() {
    let mut funnel = Funnel::new("f", FunnelType::Conversion, MatchDef::step(1))
        .with_step(StepDefinition::new(1, BoolExpr::constant(true)));
    assert_eq!(funnel.add_boundary_step(BoundaryEdge::Start, "sessions"), -1);
    assert_eq!(funnel.add_boundary_step(BoundaryEdge::End, "sessions"), -2);
    assert_eq!(
        funnel.add_untriggered_step(BoolExpr::constant(false)),
        -3
    );
    let ids: Vec<_> = funnel.steps.keys().copied().collect();
    assert_eq!(ids, vec![1, -1, -2, -3]);
}

#[test]
fn non_capturing_mark_reaches_leaves() {
    let mut pattern = MatchDef::seq(vec![
        MatchDef::step(1),
        MatchDef::repeat(MatchDef::alt(vec![MatchDef::step(2), MatchDef::step(3)]), 0, None),
    ]);
    pattern.mark_non_capturing();
    let MatchDef::List(list) = &pattern else {
        panic!("expected a list");
    };
    assert!(!list.capturing);
    let MatchDef::Repeat(repeat) = &list.items[1] else {
        panic!("expected a repeat");
    };
    assert!(!repeat.child.capturing());
    assert_eq!(pattern.step_ids(), vec![1, 2, 3]);
}

#[test]
fn bracket_members_are_step_ids() {
    let pattern = MatchDef::seq(vec![MatchDef::bracket(true, vec![4, 5]), MatchDef::step(6)]);
    assert_eq!(pattern.step_ids(), vec![4, 5, 6]);
}

#[test]
fn predicate_json_shape() {
    let expr = BoolExpr::compare(
        ComparisonOp::Gt,
        ValueExpr::path("userId"),
        ValueExpr::constant(5),
    );
    let value = serde_json::to_value(&expr).unwrap();
    assert_eq!(
        value,
        json!({
            "kind": "comparison",
            "op": "GT",
            "left": { "kind": "path", "name": "userId" },
            "right": { "kind": "constant", "value": { "type": "INTEGER", "value": 5 } }
        })
    );
}

#[test]
fn funnel_json_lists_steps() {
    let funnel = Funnel::new(
        "checkout",
        FunnelType::Transaction,
        MatchDef::seq(vec![MatchDef::step(1), MatchDef::step(2)]),
    )
    .with_step(StepDefinition::new(1, BoolExpr::constant(true)))
    .with_step(StepDefinition::new(2, BoolExpr::constant(false)));
    let value = serde_json::to_value(Statement::Funnel(funnel)).unwrap();

    assert_eq!(value["kind"], "funnel");
    assert_eq!(value["type"], "TRANSACTION");
    assert_eq!(value["steps"][1]["id"], 2);
    assert_eq!(value["match"]["kind"], "list");
    assert_eq!(value["match"]["op"], "AND");
    assert!(value["match"].get("capturing").is_none());
}

#[test]
fn duplicate_step_ids_rejected_in_json() {
    let text = r#"{
        "kind": "funnel",
        "name": "f",
        "type": "CONVERSION",
        "steps": [
            { "id": 1, "when": { "kind": "constant", "value": { "type": "BOOLEAN", "value": true } } },
            { "id": 1, "when": { "kind": "constant", "value": { "type": "BOOLEAN", "value": true } } }
        ],
        "match": { "kind": "step", "id": 1 }
    }"#;
    let err = serde_json::from_str::<Statement>(text).unwrap_err();
    assert!(err.to_string().contains("duplicate step id 1"), "{err}");
}

#[test]
fn parameter_decl_json_round_trip() {
    let mut query = Query::default()
        .select(ValueExpr::param("limit"), Some("l"))
        .with_where(BoolExpr::constant(true));
    query
        .parameters
        .push(ParameterDecl::new("limit", DataType::Long).with_default(Constant::Long(10)));
    let statement = Statement::Query(query);
    let text = serde_json::to_string(&statement).unwrap();
    let back: Statement = serde_json::from_str(&text).unwrap();
    assert_eq!(back, statement);
}
