//! Nesting limit, checked before bind.
//!
//! Every later pass recurses over the tree, so depth is bounded up front.

use crate::ast::visitor::{Visitor, walk_expr, walk_match};
use crate::ast::{ExprRef, MatchDef, Program};
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind, Span};

struct DepthCheck {
    max_depth: u32,
    depth: u32,
    exceeded: Option<Span>,
}

impl DepthCheck {
    fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            depth: 0,
            exceeded: None,
        }
    }

    /// Enter one level; false once the limit is hit.
    fn enter(&mut self, span: Span) -> bool {
        if self.exceeded.is_some() {
            return false;
        }
        self.depth += 1;
        if self.depth > self.max_depth {
            self.exceeded = Some(span);
            self.depth -= 1;
            return false;
        }
        true
    }

    fn finish(self) -> DiagResult<()> {
        match self.exceeded {
            None => Ok(()),
            Some(span) => Err(Diagnostic::new(DiagnosticKind::LimitExceeded, span)
                .message(format!("nesting deeper than {}", self.max_depth))),
        }
    }
}

impl Visitor for DepthCheck {
    fn visit_expr(&mut self, expr: ExprRef<'_>) {
        if self.enter(expr.span()) {
            walk_expr(self, expr);
            self.depth -= 1;
        }
    }

    fn visit_match(&mut self, pattern: &MatchDef) {
        if self.enter(pattern.span()) {
            walk_match(self, pattern);
            self.depth -= 1;
        }
    }
}

#[tracing::instrument(skip(program), fields(statements = program.statements.len()))]
pub fn check_depth(program: &Program, max_depth: u32) -> DiagResult<()> {
    let mut check = DepthCheck::new(max_depth);
    check.visit_program(program);
    check.finish()
}

pub fn check_expr_depth(expr: ExprRef<'_>, max_depth: u32) -> DiagResult<()> {
    let mut check = DepthCheck::new(max_depth);
    check.visit_expr(expr);
    check.finish()
}

#[cfg(test)]
mod tests {
    use motif_core::ArithmeticOp;

    use super::*;
    use crate::ast::{BoolExpr, ValueExpr};

    fn nested_sum(levels: usize) -> ValueExpr {
        (0..levels).fold(ValueExpr::constant(1), |acc, _| {
            ValueExpr::binary(ArithmeticOp::Add, acc, ValueExpr::constant(1))
        })
    }

    #[test]
    fn shallow_tree_passes() {
        let expr = nested_sum(3);
        assert!(check_expr_depth(ExprRef::Value(&expr), 4).is_ok());
    }

    #[test]
    fn deep_tree_is_rejected() {
        let expr = nested_sum(10);
        let err = check_expr_depth(ExprRef::Value(&expr), 4).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::LimitExceeded);
        assert_eq!(err.message, "nesting limit exceeded: nesting deeper than 4");
    }

    #[test]
    fn patterns_count_towards_depth() {
        let pattern = (0..6).fold(MatchDef::step(1), |acc, _| MatchDef::repeat(acc, 0, None));
        let funnel = crate::ast::Funnel::new("f", crate::ast::FunnelType::Conversion, pattern)
            .with_step(crate::ast::StepDefinition::new(1, BoolExpr::constant(true)));
        let program = Program::new(vec![crate::ast::Statement::Funnel(funnel)]);
        assert!(check_depth(&program, 8).is_ok());
        assert!(check_depth(&program, 5).is_err());
    }
}
