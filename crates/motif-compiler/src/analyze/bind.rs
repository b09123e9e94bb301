//! Name resolution and default filling.
//!
//! Statement names are registered before any statement binds, so statements
//! may refer to each other in any order. Each statement then binds in its own
//! scope holding its parameters.

use motif_core::{Path, SchemaError};

use super::context::{AnalysisCx, Frame};
use super::symbols::Definition;
use super::utils::did_you_mean;
use crate::ast::{
    Aggregation, BoolExpr, Expr, ExprMut, FunctionCall, Funnel, ParameterDecl, PathAccessor,
    Program, Query, Segment, Statement, StepDefinition, StepReference, ValueExpr, View,
};
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind, Span};
use crate::functions::CallContext;

#[tracing::instrument(skip_all, fields(statements = program.statements.len()))]
pub fn bind_program(program: &mut Program, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
    for statement in &program.statements {
        let Some(name) = statement.name() else {
            continue;
        };
        if !cx
            .symbols_mut()
            .add_current_scope_definition(name, definition_of(statement))
        {
            return Err(
                Diagnostic::new(DiagnosticKind::DuplicateDefinition, statement.span())
                    .message(name),
            );
        }
    }

    for statement in &mut program.statements {
        statement.bind(cx)?;
    }

    if let Some(cycle) = cx.symbols().reference_cycle() {
        let chain = cycle
            .names
            .iter()
            .map(|name| format!("`{name}`"))
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(Diagnostic::new(DiagnosticKind::TypeError, cycle.span)
            .message(format!("`{}` refers to itself through {chain}", cycle.names[0])));
    }
    Ok(())
}

fn definition_of(statement: &Statement) -> Definition {
    match statement {
        Statement::Query(_) => Definition::Query,
        Statement::View(_) => Definition::View,
        Statement::Funnel(funnel) => Definition::Funnel {
            steps: funnel.steps.keys().copied().collect(),
        },
        Statement::Segment(segment) => Definition::Segment {
            names: segment
                .definitions
                .iter()
                .map(|definition| definition.name.clone())
                .collect(),
        },
    }
}

/// Resolve a dotted schema name, suggesting close known paths on failure.
pub(crate) fn resolve_path(cx: &AnalysisCx<'_>, name: &str, span: Span) -> DiagResult<Path> {
    let schema = cx.schema();
    match schema.resolve(name) {
        Ok(path) => Ok(path),
        Err(SchemaError::AmbiguousPath { candidates, .. }) => {
            Err(Diagnostic::new(DiagnosticKind::UnresolvedReference, span)
                .message(name)
                .hint(format!("ambiguous, qualify it as one of: {}", candidates.join(", "))))
        }
        Err(_) => {
            let known = schema.known_paths();
            let mut diagnostic =
                Diagnostic::new(DiagnosticKind::UnresolvedReference, span).message(name);
            if let Some(hint) = did_you_mean(name, known.iter().map(String::as_str)) {
                diagnostic = diagnostic.hint(hint);
            }
            Err(diagnostic)
        }
    }
}

pub(crate) fn resolve_relation(cx: &AnalysisCx<'_>, name: &str, span: Span) -> DiagResult<Path> {
    let path = resolve_path(cx, name, span)?;
    if !path.is_relation() {
        return Err(Diagnostic::new(DiagnosticKind::TypeError, span)
            .message(format!("`{name}` is a field, a relation is required")));
    }
    Ok(path)
}

impl ExprMut<'_> {
    pub fn bind(self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        match self {
            ExprMut::Bool(b) => b.bind(cx),
            ExprMut::Value(v) => v.bind(cx),
        }
    }
}

impl Expr {
    pub fn bind(&mut self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        match self {
            Expr::Bool(b) => b.bind(cx),
            Expr::Value(v) => v.bind(cx),
        }
    }
}

impl BoolExpr {
    pub fn bind(&mut self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        match self {
            BoolExpr::Boundary(n) => {
                n.resolved = Some(resolve_relation(cx, &n.relation, n.span)?);
                Ok(())
            }
            BoolExpr::StepReference(n) => bind_step_reference(cx, n),
            _ => {
                for child in self.slots_mut() {
                    child.bind(cx)?;
                }
                Ok(())
            }
        }
    }
}

impl ValueExpr {
    pub fn bind(&mut self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        match self {
            ValueExpr::Path(n) => {
                n.resolved = Some(resolve_path(cx, &n.name, n.span)?);
                Ok(())
            }
            ValueExpr::Parameter(n) => match cx.symbols().get_definition(&n.name) {
                Some(Definition::Parameter { dtype, .. }) => {
                    n.dtype = Some(*dtype);
                    Ok(())
                }
                _ => {
                    let parameters = cx
                        .symbols()
                        .names_where(|d| matches!(d, Definition::Parameter { .. }));
                    let mut diagnostic =
                        Diagnostic::new(DiagnosticKind::UnresolvedReference, n.span)
                            .message(format!("${}", n.name));
                    if let Some(hint) = did_you_mean(&n.name, parameters) {
                        diagnostic = diagnostic.hint(hint);
                    }
                    Err(diagnostic)
                }
            },
            ValueExpr::FunctionCall(call) => bind_call(cx, call),
            ValueExpr::Aggregation(n) => bind_aggregation(cx, n),
            ValueExpr::DateTimeQuantum(n) => {
                n.operand.bind(cx)?;
                if n.zone.is_none() {
                    n.tz = Some(cx.global().time_zone());
                }
                Ok(())
            }
            _ => {
                for child in self.slots_mut() {
                    child.bind(cx)?;
                }
                Ok(())
            }
        }
    }
}

fn bind_call(cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<()> {
    let function = match cx.symbols().get_definition(&call.name) {
        Some(Definition::Function(function)) => function.clone(),
        Some(other) => {
            return Err(
                Diagnostic::new(DiagnosticKind::UnresolvedReference, call.span)
                    .message(&call.name)
                    .hint(format!("`{}` is a {}, not a function", call.name, other.describe())),
            );
        }
        None => {
            let functions = cx
                .symbols()
                .names_where(|d| matches!(d, Definition::Function(_)));
            let mut diagnostic =
                Diagnostic::new(DiagnosticKind::UnresolvedReference, call.span).message(&call.name);
            if let Some(hint) = did_you_mean(&call.name, functions) {
                diagnostic = diagnostic.hint(hint);
            }
            return Err(diagnostic);
        }
    };

    let arity = function.arity();
    if !arity.accepts(call.args.len()) {
        return Err(
            Diagnostic::new(DiagnosticKind::ArityError, call.span).message(format!(
                "`{}` takes {arity}, got {}",
                call.name,
                call.args.len()
            )),
        );
    }

    let state = function.bind(cx, call)?;
    call.context = Some(CallContext { function, state });
    Ok(())
}

fn bind_aggregation(cx: &mut AnalysisCx<'_>, node: &mut Aggregation) -> DiagResult<()> {
    if node.scope.is_none() {
        let root = cx.symbols().current_root_path().dotted();
        tracing::debug!(op = node.op.keyword(), scope = %root, "defaulted aggregation scope");
        node.scope = Some(root);
    }
    if node.quanta.is_none() {
        node.quanta = Some(Box::new(ValueExpr::constant(1)));
    }

    let scope_name = node.scope.as_deref().unwrap_or_default();
    let scope = resolve_relation(cx, scope_name, node.span)?;
    node.scope_path = Some(scope.clone());

    if let Some(count) = &mut node.count {
        count.bind(cx)?;
    }
    node.target.bind(cx)?;
    cx.with_scope(Some(scope), |cx| -> DiagResult<()> {
        if let Some(condition) = &mut node.condition {
            condition.bind(cx)?;
        }
        if let Some(quanta) = &mut node.quanta {
            quanta.bind(cx)?;
        }
        Ok(())
    })
}

fn bind_step_reference(cx: &AnalysisCx<'_>, node: &StepReference) -> DiagResult<()> {
    let structure_error = |message: String| {
        Diagnostic::new(DiagnosticKind::PatternStructureError, node.span).message(message)
    };
    let Some((steps, _)) = cx.enclosing_funnel() else {
        return Err(structure_error(format!(
            "STEP({}) is only valid inside a funnel",
            node.step
        )));
    };
    if !steps.contains(&node.step) {
        return Err(structure_error(format!(
            "step {} is not defined in this funnel",
            node.step
        )));
    }
    if cx.current_step() == Some(node.step) {
        return Err(structure_error(format!("step {} refers to itself", node.step)));
    }
    Ok(())
}

impl Statement {
    pub fn bind(&mut self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        let frame = Frame::Statement {
            name: self.name().map(str::to_string),
        };
        cx.with_frame(frame, |cx| {
            cx.with_scope(None, |cx| {
                bind_parameters(cx, self.parameters())?;
                match self {
                    Statement::Query(query) => bind_query(cx, query),
                    Statement::View(view) => bind_view(cx, view),
                    Statement::Funnel(funnel) => bind_funnel(cx, funnel),
                    Statement::Segment(segment) => bind_segment(cx, segment),
                }
            })
        })
    }
}

fn bind_parameters(cx: &mut AnalysisCx<'_>, parameters: &[ParameterDecl]) -> DiagResult<()> {
    for parameter in parameters {
        let definition = Definition::Parameter {
            dtype: parameter.dtype,
            default: parameter.default.clone(),
        };
        if !cx
            .symbols_mut()
            .add_current_scope_definition(&parameter.name, definition)
        {
            return Err(
                Diagnostic::new(DiagnosticKind::DuplicateDefinition, parameter.span)
                    .message(format!("${}", parameter.name)),
            );
        }
    }
    Ok(())
}

fn bind_query(cx: &mut AnalysisCx<'_>, query: &mut Query) -> DiagResult<()> {
    for selection in &mut query.selections {
        selection.expr.bind(cx)?;
    }
    if let Some(condition) = &mut query.condition {
        condition.bind(cx)?;
    }
    for key in &mut query.group_by {
        key.bind(cx)?;
    }
    if let Some(limit) = &mut query.limit {
        limit.bind(cx)?;
    }
    Ok(())
}

fn bind_view(cx: &mut AnalysisCx<'_>, view: &mut View) -> DiagResult<()> {
    view.filter.bind(cx)
}

fn bind_sources(cx: &AnalysisCx<'_>, sources: &[String], span: Span) -> DiagResult<Vec<Path>> {
    sources
        .iter()
        .map(|source| resolve_relation(cx, source, span))
        .collect()
}

fn bind_funnel(cx: &mut AnalysisCx<'_>, funnel: &mut Funnel) -> DiagResult<()> {
    funnel.source_paths = bind_sources(cx, &funnel.sources, funnel.span)?;
    if funnel.within.is_none() {
        funnel.within = Some(ValueExpr::constant(0i64));
    }
    for value in [&mut funnel.within, &mut funnel.limit].into_iter().flatten() {
        value.bind(cx)?;
    }

    let sources = funnel.source_paths.clone();
    let frame = Frame::Funnel {
        steps: funnel.steps.keys().copied().collect(),
        sources: sources.clone(),
    };
    cx.with_frame(frame, |cx| -> DiagResult<()> {
        for step in funnel.steps.values_mut() {
            bind_step(cx, step, &sources)?;
        }
        Ok(())
    })
}

fn bind_step(
    cx: &mut AnalysisCx<'_>,
    step: &mut StepDefinition,
    sources: &[Path],
) -> DiagResult<()> {
    cx.with_frame(Frame::Step { id: step.id }, |cx| -> DiagResult<()> {
        step.when.bind(cx)?;
        let Some(trigger) = &mut step.trigger else {
            return Ok(());
        };
        for value in [&mut trigger.timing, &mut trigger.within, &mut trigger.after]
            .into_iter()
            .flatten()
        {
            value.bind(cx)?;
        }
        trigger
            .within
            .get_or_insert_with(|| ValueExpr::constant(0i64));
        trigger
            .after
            .get_or_insert_with(|| ValueExpr::constant(0i64));
        if trigger.timing.is_none() {
            let span = step.when.span().cover(step.span);
            trigger.timing = Some(infer_timing(cx, &step.when, sources, span)?);
        }
        Ok(())
    })
}

/// The ordinal field of the nearest relation at or above the step's
/// evaluation point (or the first source, or the root when the step is
/// constant).
fn infer_timing(
    cx: &AnalysisCx<'_>,
    when: &BoolExpr,
    sources: &[Path],
    span: Span,
) -> DiagResult<ValueExpr> {
    let schema = cx.schema();
    let start = match when.lowest_evaluation_point()? {
        Some(point) => point,
        None => sources.first().cloned().unwrap_or_else(|| schema.root()),
    };

    let mut current = Some(start.structure());
    while let Some(relation) = current {
        if let Some(ordinal) = schema.ordinal_field(&relation) {
            tracing::debug!(timing = %ordinal, "inferred step timing");
            return Ok(ValueExpr::Path(PathAccessor {
                span: Span::default(),
                name: ordinal.dotted(),
                resolved: Some(ordinal),
            }));
        }
        current = relation.parent_structure();
    }

    Err(Diagnostic::new(DiagnosticKind::ScopeAxisError, span).message(format!(
        "no relation at or above `{start}` has an ordinal field to time the step"
    )))
}

fn bind_segment(cx: &mut AnalysisCx<'_>, segment: &mut Segment) -> DiagResult<()> {
    segment.source_paths = bind_sources(cx, &segment.sources, segment.span)?;
    for definition in &mut segment.definitions {
        definition.condition.bind(cx)?;
    }
    Ok(())
}
