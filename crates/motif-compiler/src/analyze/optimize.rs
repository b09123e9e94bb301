//! Bottom-up rewriting.
//!
//! Children are optimized first. A node whose value is then known is
//! replaced by a constant carrying its span, and boolean connectives with a
//! constant side are short-circuited. Running the pass twice changes nothing.

use std::mem;

use super::context::AnalysisCx;
use super::validate::fold_duration;
use crate::ast::{
    BoolBinary, BoolExpr, BoolNot, BoolOp, ConstantNode, Expr, ExprMut, Funnel, Program, Query,
    Segment, Statement, ValueExpr, View,
};
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind};

#[tracing::instrument(skip_all, fields(statements = program.statements.len()))]
pub fn optimize_program(program: Program, cx: &mut AnalysisCx<'_>) -> DiagResult<Program> {
    let Program { span, statements } = program;
    let statements = statements
        .into_iter()
        .map(|statement| statement.optimize(cx))
        .collect::<DiagResult<_>>()?;
    Ok(Program { span, statements })
}

impl ExprMut<'_> {
    fn optimize_in_place(self, cx: &mut AnalysisCx<'_>) -> DiagResult<()> {
        match self {
            ExprMut::Bool(slot) => {
                let taken = mem::replace(slot, BoolExpr::constant(false));
                *slot = taken.optimize(cx)?;
            }
            ExprMut::Value(slot) => {
                let taken = mem::replace(slot, ValueExpr::null());
                *slot = taken.optimize(cx)?;
            }
        }
        Ok(())
    }
}

impl Expr {
    pub fn optimize(self, cx: &mut AnalysisCx<'_>) -> DiagResult<Expr> {
        Ok(match self {
            Expr::Bool(b) => Expr::Bool(b.optimize(cx)?),
            Expr::Value(v) => Expr::Value(v.optimize(cx)?),
        })
    }
}

impl BoolExpr {
    pub fn optimize(mut self, cx: &mut AnalysisCx<'_>) -> DiagResult<BoolExpr> {
        for child in self.slots_mut() {
            child.optimize_in_place(cx)?;
        }
        if !cx.global().fold_constants() {
            return Ok(self);
        }

        if !matches!(self, BoolExpr::Constant(_)) && self.can_reduce_to_constant() {
            let value = self.reduce_to_constant()?;
            tracing::trace!(kind = self.kind().name(), %value, "folded predicate");
            return Ok(BoolExpr::Constant(ConstantNode::spanned(value, self.span())));
        }

        Ok(match self {
            BoolExpr::Binary(node) => short_circuit(node),
            BoolExpr::Not(BoolNot { span, operand }) => match *operand {
                BoolExpr::Not(inner) => *inner.operand,
                operand => BoolExpr::Not(BoolNot {
                    span,
                    operand: Box::new(operand),
                }),
            },
            other => other,
        })
    }
}

fn short_circuit(node: BoolBinary) -> BoolExpr {
    let span = node.span;
    match (node.op, node.left.as_constant(), node.right.as_constant()) {
        (BoolOp::And, Some(false), _) | (BoolOp::And, _, Some(false)) => {
            BoolExpr::constant(false).with_span(span)
        }
        (BoolOp::Or, Some(true), _) | (BoolOp::Or, _, Some(true)) => {
            BoolExpr::constant(true).with_span(span)
        }
        (BoolOp::And, Some(true), _) | (BoolOp::Or, Some(false), _) => *node.right,
        (BoolOp::And, _, Some(true)) | (BoolOp::Or, _, Some(false)) => *node.left,
        _ => BoolExpr::Binary(node),
    }
}

impl ValueExpr {
    pub fn optimize(self, cx: &mut AnalysisCx<'_>) -> DiagResult<ValueExpr> {
        let optimized = match self {
            ValueExpr::FunctionCall(call) => {
                let Some(context) = &call.context else {
                    return Err(
                        Diagnostic::new(DiagnosticKind::UnresolvedReference, call.span)
                            .message(&call.name),
                    );
                };
                let function = context.function.clone();
                function.optimize(cx, call)?
            }
            mut other => {
                for child in other.slots_mut() {
                    child.optimize_in_place(cx)?;
                }
                other
            }
        };

        if cx.global().fold_constants()
            && !matches!(optimized, ValueExpr::Constant(_))
            && optimized.can_reduce_to_constant()
        {
            let value = optimized.reduce_to_constant()?;
            tracing::trace!(kind = optimized.kind().name(), %value, "folded value");
            return Ok(ValueExpr::Constant(ConstantNode::spanned(
                value,
                optimized.span(),
            )));
        }
        Ok(optimized)
    }
}

fn optimize_option<T>(
    slot: Option<T>,
    optimize: impl FnOnce(T) -> DiagResult<T>,
) -> DiagResult<Option<T>> {
    slot.map(optimize).transpose()
}

impl Statement {
    pub fn optimize(self, cx: &mut AnalysisCx<'_>) -> DiagResult<Statement> {
        Ok(match self {
            Statement::Query(query) => Statement::Query(optimize_query(cx, query)?),
            Statement::View(view) => Statement::View(View {
                filter: view.filter.optimize(cx)?,
                ..view
            }),
            Statement::Funnel(funnel) => Statement::Funnel(optimize_funnel(cx, funnel)?),
            Statement::Segment(segment) => Statement::Segment(optimize_segment(cx, segment)?),
        })
    }
}

fn optimize_query(cx: &mut AnalysisCx<'_>, mut query: Query) -> DiagResult<Query> {
    for selection in &mut query.selections {
        let taken = mem::replace(&mut selection.expr, Expr::Value(ValueExpr::null()));
        selection.expr = taken.optimize(cx)?;
    }
    query.condition = optimize_option(query.condition.take(), |c| c.optimize(cx))?;
    query.group_by = query
        .group_by
        .into_iter()
        .map(|key| key.optimize(cx))
        .collect::<DiagResult<_>>()?;
    Ok(query)
}

fn optimize_funnel(cx: &mut AnalysisCx<'_>, mut funnel: Funnel) -> DiagResult<Funnel> {
    for step in funnel.steps.values_mut() {
        let when = mem::replace(&mut step.when, BoolExpr::constant(false));
        step.when = when.optimize(cx)?;
        if let Some(trigger) = &mut step.trigger {
            trigger.timing = optimize_option(trigger.timing.take(), |t| t.optimize(cx))?;
            fold_duration(&mut trigger.within, "WITHIN")?;
            fold_duration(&mut trigger.after, "AFTER")?;
        }
    }
    fold_duration(&mut funnel.within, "WITHIN")?;
    Ok(funnel)
}

fn optimize_segment(cx: &mut AnalysisCx<'_>, mut segment: Segment) -> DiagResult<Segment> {
    for definition in &mut segment.definitions {
        let condition = mem::replace(&mut definition.condition, BoolExpr::constant(false));
        definition.condition = condition.optimize(cx)?;
    }
    Ok(segment)
}
