//! Evaluation-point consistency.
//!
//! Every expression is evaluated once per row of some relation: the lowest
//! relation any of its paths lives in. Combining paths is only meaningful
//! when they sit on one ancestor chain (`user`, `user.sessions`,
//! `user.sessions.events`); paths on sibling branches are off-axis.

use motif_core::Path;

use crate::ast::{Aggregation, BoolExpr, ExprRef, ValueExpr};
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind, Span};
use crate::functions::FunctionDef as _;

/// Lowest of several evaluation points. `None` entries are constants and
/// combine with anything.
pub fn combine(
    points: impl IntoIterator<Item = DiagResult<Option<Path>>>,
    span: Span,
) -> DiagResult<Option<Path>> {
    let mut lowest: Option<Path> = None;
    for point in points {
        let Some(point) = point? else {
            continue;
        };
        lowest = match lowest {
            None => Some(point),
            Some(current) => Some(Path::lowest(&current, &point).ok_or_else(|| {
                off_axis(span, &current, &point)
            })?),
        };
    }
    Ok(lowest)
}

fn off_axis(span: Span, a: &Path, b: &Path) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::ScopeAxisError, span)
        .message(format!("`{a}` and `{b}` are not on one path"))
}

fn unbound(span: Span, name: &str) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::UnresolvedReference, span).message(name)
}

impl ExprRef<'_> {
    pub fn lowest_evaluation_point(self) -> DiagResult<Option<Path>> {
        match self {
            ExprRef::Bool(b) => b.lowest_evaluation_point(),
            ExprRef::Value(v) => v.lowest_evaluation_point(),
        }
    }
}

impl BoolExpr {
    pub fn lowest_evaluation_point(&self) -> DiagResult<Option<Path>> {
        match self {
            BoolExpr::Constant(_) | BoolExpr::StepReference(_) => Ok(None),
            BoolExpr::Boundary(n) => n
                .resolved
                .clone()
                .map(Some)
                .ok_or_else(|| unbound(n.span, &n.relation)),
            _ => combine(
                self.slots()
                    .into_iter()
                    .map(ExprRef::lowest_evaluation_point),
                self.span(),
            ),
        }
    }
}

impl ValueExpr {
    pub fn lowest_evaluation_point(&self) -> DiagResult<Option<Path>> {
        match self {
            ValueExpr::Constant(_) | ValueExpr::Parameter(_) | ValueExpr::Now(_) => Ok(None),
            ValueExpr::Path(n) => n
                .resolved
                .as_ref()
                .map(|path| Some(path.structure()))
                .ok_or_else(|| unbound(n.span, &n.name)),
            ValueExpr::FunctionCall(call) => match &call.context {
                Some(context) => context.function.lowest_evaluation_point(call),
                None => Err(unbound(call.span, &call.name)),
            },
            ValueExpr::Aggregation(n) => aggregation_point(n).map(Some),
            _ => combine(
                self.slots()
                    .into_iter()
                    .map(ExprRef::lowest_evaluation_point),
                self.span(),
            ),
        }
    }
}

/// An aggregation is known at its scope. Its target must sit at or below
/// the scope, and its `WHERE` on the target's axis.
fn aggregation_point(node: &Aggregation) -> DiagResult<Path> {
    let scope_name = node.scope.as_deref().unwrap_or_default();
    let scope = node
        .scope_path
        .clone()
        .ok_or_else(|| unbound(node.span, scope_name))?;

    let below_scope = |point: &Path, span: Span, what: &str| {
        if scope.is_ancestor_of(point) {
            return Ok(());
        }
        Err(Diagnostic::new(DiagnosticKind::ScopeAxisError, span)
            .message(format!("{what} at `{point}` is not below scope `{scope}`")))
    };

    let target = node.target.lowest_evaluation_point()?;
    if let Some(point) = &target {
        below_scope(point, node.target.span(), "aggregated value")?;
    }

    if let Some(condition) = &node.condition
        && let Some(point) = condition.lowest_evaluation_point()?
    {
        below_scope(&point, condition.span(), "WHERE condition")?;
        if let Some(target) = &target
            && Path::not_on_path(target, &point)
        {
            return Err(off_axis(condition.span(), target, &point));
        }
    }

    for constant in [&node.count, &node.quanta].into_iter().flatten() {
        constant.lowest_evaluation_point()?;
    }
    Ok(scope)
}
