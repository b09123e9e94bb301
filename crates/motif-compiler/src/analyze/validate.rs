//! Type, axis and structure checks.
//!
//! Positions that must be known at compile time (`WITHIN`, `AFTER`, `LIMIT`,
//! `QUANTA`, the `n` of `TOP`) are folded here and replaced by their values.

use indexmap::IndexSet;
use motif_core::{Constant, DataType, Path};

use super::context::{AnalysisCx, Frame};
use crate::ast::{
    Aggregation, AggregationOp, BoolExpr, ConstantNode, Expr, ExprMut, Funnel, ParameterDecl,
    Program, Query, Segment, Statement, StepDefinition, ValueExpr, View,
};
use crate::config::parse_time_zone;
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind, Span};
use crate::pattern::validate_pattern;

#[tracing::instrument(skip_all, fields(statements = program.statements.len()))]
pub fn validate_program(program: &mut Program, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
    for statement in &mut program.statements {
        statement.validate(cx)?;
    }
    Ok(())
}

/// Replace `slot` with its folded value.
pub(crate) fn fold_required(slot: &mut ValueExpr, what: &str) -> DiagResult<Constant> {
    let span = slot.span();
    if !slot.can_reduce_to_constant() {
        return Err(Diagnostic::new(DiagnosticKind::ConstantRequiredError, span)
            .message(format!("{what} depends on runtime data")));
    }
    let value = slot.reduce_to_constant()?;
    if !matches!(slot, ValueExpr::Constant(_)) {
        tracing::trace!(position = what, %value, "folded constant-required position");
    }
    *slot = ValueExpr::Constant(ConstantNode::spanned(value.clone(), span));
    Ok(value)
}

/// Fold an integral count of at least `min`.
fn fold_count(slot: &mut ValueExpr, what: &str, min: i64) -> DiagResult<i64> {
    let span = slot.span();
    let value = fold_required(slot, what)?;
    let dtype = value.dtype();
    let count = value
        .as_i64()
        .filter(|_| dtype.is_integral())
        .ok_or_else(|| {
            Diagnostic::new(DiagnosticKind::TypeError, span)
                .message(format!("{what} must be an integer, found {dtype}"))
        })?;
    if count < min {
        return Err(Diagnostic::new(DiagnosticKind::TypeError, span)
            .message(format!("{what} must be at least {min}, found {count}")));
    }
    Ok(count)
}

/// Fold a duration in milliseconds into a non-negative `LONG`.
pub(crate) fn fold_duration(slot: &mut Option<ValueExpr>, what: &str) -> DiagResult<()> {
    let Some(value) = slot else {
        return Ok(());
    };
    let span = value.span();
    let millis = fold_count(value, what, 0)?;
    *value = ValueExpr::Constant(ConstantNode::spanned(Constant::Long(millis), span));
    Ok(())
}

impl ExprMut<'_> {
    pub fn validate(self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        match self {
            ExprMut::Bool(b) => b.validate(cx),
            ExprMut::Value(v) => v.validate(cx),
        }
    }
}

impl Expr {
    /// Validate the tree and check its type and evaluation point.
    pub fn validate(&mut self, cx: &mut AnalysisCx<'_>) -> DiagResult<Option<Path>> {
        match self {
            Expr::Bool(b) => check_bool(b, cx),
            Expr::Value(v) => check_value(v, cx),
        }
    }
}

pub(crate) fn check_bool(
    expr: &mut BoolExpr,
    cx: &mut AnalysisCx<'_>,
) -> DiagResult<Option<Path>> {
    expr.validate(cx)?;
    expr.dtype()?;
    expr.lowest_evaluation_point()
}

pub(crate) fn check_value(
    expr: &mut ValueExpr,
    cx: &mut AnalysisCx<'_>,
) -> DiagResult<Option<Path>> {
    expr.validate(cx)?;
    expr.dtype()?;
    expr.lowest_evaluation_point()
}

impl BoolExpr {
    /// Node-local checks over the whole subtree. Types and evaluation points
    /// are checked from the expression root by [`Expr::validate`].
    pub fn validate(&mut self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        for child in self.slots_mut() {
            child.validate(cx)?;
        }
        Ok(())
    }
}

impl ValueExpr {
    pub fn validate(&mut self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        match self {
            ValueExpr::FunctionCall(call) => match call.context.as_ref() {
                Some(context) => {
                    let function = context.function.clone();
                    function.validate(cx, call)
                }
                None => Err(Diagnostic::new(DiagnosticKind::UnresolvedReference, call.span)
                    .message(&call.name)),
            },
            ValueExpr::Aggregation(n) => validate_aggregation(cx, n),
            ValueExpr::DateTimeQuantum(n) => {
                n.operand.validate(cx)?;
                if let Some(zone) = &n.zone {
                    n.tz = Some(parse_time_zone(zone, n.span)?);
                }
                Ok(())
            }
            _ => {
                for child in self.slots_mut() {
                    child.validate(cx)?;
                }
                Ok(())
            }
        }
    }
}

fn validate_aggregation(cx: &mut AnalysisCx<'_>, node: &mut Aggregation) -> DiagResult<()> {
    let keyword = node.op.keyword();
    match (node.op, node.count.is_some()) {
        (AggregationOp::Top, false) => {
            return Err(Diagnostic::new(DiagnosticKind::ArityError, node.span)
                .message(format!("`{keyword}` needs a count")));
        }
        (op, true) if op != AggregationOp::Top => {
            return Err(Diagnostic::new(DiagnosticKind::ArityError, node.span)
                .message(format!("`{keyword}` does not take a count")));
        }
        _ => {}
    }
    node.target.validate(cx)?;
    if let Some(condition) = &mut node.condition {
        condition.validate(cx)?;
    }
    if let Some(count) = &mut node.count {
        count.validate(cx)?;
        fold_count(count, "TOP count", 1)?;
    }
    if let Some(quanta) = &mut node.quanta {
        quanta.validate(cx)?;
        fold_count(quanta, "QUANTA", 1)?;
    }
    Ok(())
}

impl Statement {
    pub fn validate(&mut self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        let frame = Frame::Statement {
            name: self.name().map(str::to_string),
        };
        cx.with_frame(frame, |cx| {
            validate_parameters(self.parameters())?;
            match self {
                Statement::Query(query) => validate_query(cx, query),
                Statement::View(view) => validate_view(cx, view),
                Statement::Funnel(funnel) => validate_funnel(cx, funnel),
                Statement::Segment(segment) => validate_segment(cx, segment),
            }
        })
    }
}

fn validate_parameters(parameters: &[ParameterDecl]) -> DiagResult<()> {
    for parameter in parameters {
        if let Some(default) = &parameter.default
            && let Err(err) = default.cast(parameter.dtype)
        {
            return Err(
                Diagnostic::new(DiagnosticKind::TypeError, parameter.span).message(format!(
                    "default of `${}` does not fit {}: {err}",
                    parameter.name, parameter.dtype
                )),
            );
        }
    }
    Ok(())
}

fn validate_query(cx: &mut AnalysisCx<'_>, query: &mut Query) -> DiagResult<()> {
    for selection in &mut query.selections {
        selection.expr.validate(cx)?;
    }
    if let Some(condition) = &mut query.condition {
        check_bool(condition, cx)?;
    }
    for key in &mut query.group_by {
        check_value(key, cx)?;
    }
    if let Some(limit) = &mut query.limit {
        fold_count(limit, "LIMIT", 0)?;
    }
    Ok(())
}

fn validate_view(cx: &mut AnalysisCx<'_>, view: &mut View) -> DiagResult<()> {
    check_bool(&mut view.filter, cx).map(drop)
}

/// A point is acceptable when it shares an axis with at least one source.
fn check_on_source_axis(point: Option<&Path>, sources: &[Path], span: Span) -> DiagResult<()> {
    let Some(point) = point else {
        return Ok(());
    };
    if sources.is_empty() || sources.iter().any(|source| !Path::not_on_path(source, point)) {
        return Ok(());
    }
    let sources = sources
        .iter()
        .map(|source| format!("`{source}`"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(Diagnostic::new(DiagnosticKind::ScopeAxisError, span)
        .message(format!("`{point}` is on no path of the sources {sources}")))
}

fn validate_funnel(cx: &mut AnalysisCx<'_>, funnel: &mut Funnel) -> DiagResult<()> {
    let sources = funnel.source_paths.clone();
    let frame = Frame::Funnel {
        steps: funnel.steps.keys().copied().collect(),
        sources: sources.clone(),
    };
    cx.with_frame(frame, |cx| -> DiagResult<()> {
        for step in funnel.steps.values_mut() {
            validate_step(cx, step, &sources)?;
        }
        Ok(())
    })?;

    fold_duration(&mut funnel.within, "WITHIN")?;
    if let Some(limit) = &mut funnel.limit {
        fold_count(limit, "LIMIT", 0)?;
    }

    let known: Vec<i64> = funnel.steps.keys().copied().collect();
    validate_pattern(&mut funnel.pattern, &known)
}

fn validate_step(
    cx: &mut AnalysisCx<'_>,
    step: &mut StepDefinition,
    sources: &[Path],
) -> DiagResult<()> {
    cx.with_frame(Frame::Step { id: step.id }, |cx| -> DiagResult<()> {
        let point = check_bool(&mut step.when, cx)?;
        check_on_source_axis(point.as_ref(), sources, step.when.span())?;

        let Some(trigger) = &mut step.trigger else {
            return Ok(());
        };
        if let Some(timing) = &mut trigger.timing {
            let timing_point = check_value(timing, cx)?;
            let dtype = timing.dtype()?;
            if !(dtype == DataType::Datetime || dtype.is_integral()) {
                return Err(Diagnostic::new(DiagnosticKind::TypeError, timing.span())
                    .message(format!("step timing must be DATETIME or integral, found {dtype}")));
            }
            if let (Some(at), Some(when)) = (&timing_point, &point)
                && Path::not_on_path(at, when)
            {
                return Err(Diagnostic::new(DiagnosticKind::ScopeAxisError, timing.span())
                    .message(format!(
                        "step timing at `{at}` is on no path of the step condition at `{when}`"
                    )));
            }
        }
        fold_duration(&mut trigger.within, "WITHIN")?;
        fold_duration(&mut trigger.after, "AFTER")?;
        Ok(())
    })
}

fn validate_segment(cx: &mut AnalysisCx<'_>, segment: &mut Segment) -> DiagResult<()> {
    let mut names = IndexSet::new();
    for definition in &mut segment.definitions {
        if definition.name.trim().is_empty() {
            return Err(
                Diagnostic::new(DiagnosticKind::PatternStructureError, definition.span)
                    .message("segment definitions need a name"),
            );
        }
        if !names.insert(definition.name.clone()) {
            return Err(
                Diagnostic::new(DiagnosticKind::DuplicateDefinition, definition.span)
                    .message(&definition.name),
            );
        }
        let point = check_bool(&mut definition.condition, cx)?;
        check_on_source_axis(point.as_ref(), &segment.source_paths, definition.condition.span())?;
    }
    Ok(())
}
