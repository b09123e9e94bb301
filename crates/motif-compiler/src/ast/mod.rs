//! Expression and statement tree.
//!
//! Two expression families, [`BoolExpr`] and [`ValueExpr`], joined by
//! [`Expr`] for generic traversal. Nodes own their children; binding results
//! live in `#[serde(skip)]` fields and are filled by the passes in
//! [`crate::analyze`].

mod aggregation;
mod boolean;
mod call;
mod children;
mod pattern;
mod statement;
mod value;
pub mod visitor;

#[cfg(test)]
mod ast_tests;

use motif_core::Constant;
use serde::{Deserialize, Serialize};

pub use aggregation::{Aggregation, AggregationOp};
pub use boolean::{
    BoolBinary, BoolExpr, BoolNot, BoolOp, Boundary, BoundaryEdge, Bounds, BoundsOp, Comparison,
    Membership, MembershipSet, NullTest, NullTestOp, StepReference, ValueWrapper,
};
pub use call::FunctionCall;
pub use children::{ExprMut, ExprRef};
pub use pattern::{BracketSet, ListOp, MatchDef, MatchList, MatchRepeat, MatchStep};
pub use statement::{
    Funnel, FunnelType, ParameterDecl, Program, Query, Segment, SegmentDefinition, Selection,
    Statement, StepDefinition, Trigger, View,
};
pub use value::{
    Cast, ConversionKind, DateTimeConversion, DateTimeQuantum, Now, ParameterAccessor,
    PathAccessor, Quantum, TimeOrdinal, TimeUnit, UnaryOp, ValueBinary, ValueExpr, ValueUnary,
};

use crate::diagnostics::Span;

/// A literal leaf, shared by both families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantNode {
    #[serde(skip)]
    pub span: Span,
    pub value: Constant,
}

impl ConstantNode {
    pub fn new(value: Constant) -> Self {
        Self {
            span: Span::default(),
            value,
        }
    }

    pub fn spanned(value: Constant, span: Span) -> Self {
        Self { span, value }
    }
}

/// Either expression family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Bool(BoolExpr),
    Value(ValueExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Bool(b) => b.span(),
            Expr::Value(v) => v.span(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Bool(b) => b.kind(),
            Expr::Value(v) => v.kind(),
        }
    }

    pub fn as_ref(&self) -> ExprRef<'_> {
        match self {
            Expr::Bool(b) => ExprRef::Bool(b),
            Expr::Value(v) => ExprRef::Value(v),
        }
    }
}

impl From<BoolExpr> for Expr {
    fn from(expr: BoolExpr) -> Self {
        Expr::Bool(expr)
    }
}

impl From<ValueExpr> for Expr {
    fn from(expr: ValueExpr) -> Self {
        Expr::Value(expr)
    }
}

/// Node-kind tag, also the serde `"kind"` of each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Constant,
    BoolBinary,
    Not,
    Comparison,
    Bounds,
    NullTest,
    Membership,
    ValueWrapper,
    Boundary,
    StepReference,
    Path,
    Parameter,
    ValueBinary,
    Unary,
    Cast,
    DateTimeConversion,
    DateTimeQuantum,
    FunctionCall,
    Aggregation,
    Now,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Constant => "Constant",
            NodeKind::BoolBinary => "BoolBinary",
            NodeKind::Not => "Not",
            NodeKind::Comparison => "Comparison",
            NodeKind::Bounds => "Bounds",
            NodeKind::NullTest => "NullTest",
            NodeKind::Membership => "Membership",
            NodeKind::ValueWrapper => "ValueWrapper",
            NodeKind::Boundary => "Boundary",
            NodeKind::StepReference => "StepReference",
            NodeKind::Path => "Path",
            NodeKind::Parameter => "Parameter",
            NodeKind::ValueBinary => "ValueBinary",
            NodeKind::Unary => "Unary",
            NodeKind::Cast => "Cast",
            NodeKind::DateTimeConversion => "DateTimeConversion",
            NodeKind::DateTimeQuantum => "DateTimeQuantum",
            NodeKind::FunctionCall => "FunctionCall",
            NodeKind::Aggregation => "Aggregation",
            NodeKind::Now => "Now",
        }
    }
}

impl BoolExpr {
    pub fn kind(&self) -> NodeKind {
        match self {
            BoolExpr::Constant(_) => NodeKind::Constant,
            BoolExpr::Binary(_) => NodeKind::BoolBinary,
            BoolExpr::Not(_) => NodeKind::Not,
            BoolExpr::Comparison(_) => NodeKind::Comparison,
            BoolExpr::Bounds(_) => NodeKind::Bounds,
            BoolExpr::NullTest(_) => NodeKind::NullTest,
            BoolExpr::Membership(_) => NodeKind::Membership,
            BoolExpr::ValueWrapper(_) => NodeKind::ValueWrapper,
            BoolExpr::Boundary(_) => NodeKind::Boundary,
            BoolExpr::StepReference(_) => NodeKind::StepReference,
        }
    }
}

impl ValueExpr {
    pub fn kind(&self) -> NodeKind {
        match self {
            ValueExpr::Constant(_) => NodeKind::Constant,
            ValueExpr::Path(_) => NodeKind::Path,
            ValueExpr::Parameter(_) => NodeKind::Parameter,
            ValueExpr::Binary(_) => NodeKind::ValueBinary,
            ValueExpr::Unary(_) => NodeKind::Unary,
            ValueExpr::Cast(_) => NodeKind::Cast,
            ValueExpr::DateTimeConversion(_) => NodeKind::DateTimeConversion,
            ValueExpr::DateTimeQuantum(_) => NodeKind::DateTimeQuantum,
            ValueExpr::FunctionCall(_) => NodeKind::FunctionCall,
            ValueExpr::Aggregation(_) => NodeKind::Aggregation,
            ValueExpr::Now(_) => NodeKind::Now,
        }
    }
}
