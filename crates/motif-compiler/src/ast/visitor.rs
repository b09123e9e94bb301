//! Read-only traversal.
//!
//! Implement [`Visitor`] and override `visit_*` methods. Call the matching
//! `walk_*` inside an override to keep descending, or omit it to stop.
//!
//! ```ignore
//! impl Visitor for Depth {
//!     fn visit_expr(&mut self, expr: ExprRef<'_>) {
//!         self.current += 1;
//!         walk_expr(self, expr);
//!         self.current -= 1;
//!     }
//! }
//! ```

use super::{
    BoolExpr, ExprRef, Funnel, MatchDef, Program, Query, Segment, Statement, StepDefinition,
    ValueExpr, View,
};

pub trait Visitor: Sized {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_step(&mut self, step: &StepDefinition) {
        walk_step(self, step);
    }

    fn visit_expr(&mut self, expr: ExprRef<'_>) {
        walk_expr(self, expr);
    }

    fn visit_match(&mut self, pattern: &MatchDef) {
        walk_match(self, pattern);
    }
}

pub fn walk_program<V: Visitor>(visitor: &mut V, program: &Program) {
    for statement in &program.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Query(query) => walk_query(visitor, query),
        Statement::View(view) => walk_view(visitor, view),
        Statement::Funnel(funnel) => walk_funnel(visitor, funnel),
        Statement::Segment(segment) => walk_segment(visitor, segment),
    }
}

fn walk_query<V: Visitor>(visitor: &mut V, query: &Query) {
    for selection in &query.selections {
        visitor.visit_expr(selection.expr.as_ref());
    }
    if let Some(condition) = &query.condition {
        visitor.visit_expr(ExprRef::Bool(condition));
    }
    for key in &query.group_by {
        visitor.visit_expr(ExprRef::Value(key));
    }
    if let Some(limit) = &query.limit {
        visitor.visit_expr(ExprRef::Value(limit));
    }
}

fn walk_view<V: Visitor>(visitor: &mut V, view: &View) {
    visitor.visit_expr(ExprRef::Bool(&view.filter));
}

fn walk_funnel<V: Visitor>(visitor: &mut V, funnel: &Funnel) {
    for step in funnel.steps.values() {
        visitor.visit_step(step);
    }
    visitor.visit_match(&funnel.pattern);
    for value in [&funnel.within, &funnel.limit].into_iter().flatten() {
        visitor.visit_expr(ExprRef::Value(value));
    }
}

fn walk_segment<V: Visitor>(visitor: &mut V, segment: &Segment) {
    for definition in &segment.definitions {
        visitor.visit_expr(ExprRef::Bool(&definition.condition));
    }
}

pub fn walk_step<V: Visitor>(visitor: &mut V, step: &StepDefinition) {
    visitor.visit_expr(ExprRef::Bool(&step.when));
    if let Some(trigger) = &step.trigger {
        for value in [&trigger.timing, &trigger.within, &trigger.after]
            .into_iter()
            .flatten()
        {
            visitor.visit_expr(ExprRef::Value(value));
        }
    }
}

pub fn walk_expr<V: Visitor>(visitor: &mut V, expr: ExprRef<'_>) {
    for child in expr.children() {
        visitor.visit_expr(child);
    }
}

pub fn walk_match<V: Visitor>(visitor: &mut V, pattern: &MatchDef) {
    match pattern {
        MatchDef::List(list) => {
            for item in &list.items {
                visitor.visit_match(item);
            }
        }
        MatchDef::Repeat(repeat) => visitor.visit_match(&repeat.child),
        MatchDef::Step(_) | MatchDef::BracketSet(_) => {}
    }
}

impl<'a> From<&'a BoolExpr> for ExprRef<'a> {
    fn from(expr: &'a BoolExpr) -> Self {
        ExprRef::Bool(expr)
    }
}

impl<'a> From<&'a ValueExpr> for ExprRef<'a> {
    fn from(expr: &'a ValueExpr) -> Self {
        ExprRef::Value(expr)
    }
}
