use motif_core::Path;
use serde::{Deserialize, Serialize};

use super::{BoolExpr, ValueExpr};
use crate::diagnostics::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationOp {
    Count,
    Sum,
    Min,
    Max,
    Unique,
    Top,
}

impl AggregationOp {
    pub const ALL: [AggregationOp; 6] = [
        AggregationOp::Count,
        AggregationOp::Sum,
        AggregationOp::Min,
        AggregationOp::Max,
        AggregationOp::Unique,
        AggregationOp::Top,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            AggregationOp::Count => "COUNT",
            AggregationOp::Sum => "SUM",
            AggregationOp::Min => "MIN",
            AggregationOp::Max => "MAX",
            AggregationOp::Unique => "UNIQUE",
            AggregationOp::Top => "TOP",
        }
    }
}

/// Rolling aggregate of `target` over the rows below `scope`.
///
/// Bind fills `scope` with the current root relation and `quanta` with `1`
/// when they are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    #[serde(skip)]
    pub span: Span,
    pub op: AggregationOp,
    /// `n` of `TOP(n, x)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<Box<ValueExpr>>,
    pub target: Box<ValueExpr>,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Box<BoolExpr>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quanta: Option<Box<ValueExpr>>,
    #[serde(skip)]
    pub scope_path: Option<Path>,
}

impl Aggregation {
    pub fn new(op: AggregationOp, target: ValueExpr) -> Self {
        Self {
            span: target.span(),
            op,
            count: None,
            target: Box::new(target),
            condition: None,
            scope: None,
            quanta: None,
            scope_path: None,
        }
    }

    pub fn top(count: ValueExpr, target: ValueExpr) -> Self {
        Self {
            count: Some(Box::new(count)),
            ..Self::new(AggregationOp::Top, target)
        }
    }

    pub fn with_where(mut self, condition: BoolExpr) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_quanta(mut self, quanta: ValueExpr) -> Self {
        self.quanta = Some(Box::new(quanta));
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}
