use motif_core::{ComparisonOp, Path};
use serde::{Deserialize, Serialize};

use super::{ConstantNode, ValueExpr};
use crate::diagnostics::Span;

/// Predicate expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoolExpr {
    Constant(ConstantNode),
    Binary(BoolBinary),
    Not(BoolNot),
    Comparison(Comparison),
    Bounds(Bounds),
    NullTest(NullTest),
    Membership(Membership),
    ValueWrapper(ValueWrapper),
    Boundary(Boundary),
    StepReference(StepReference),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn keyword(self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolBinary {
    #[serde(skip)]
    pub span: Span,
    pub op: BoolOp,
    pub left: Box<BoolExpr>,
    pub right: Box<BoolExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolNot {
    #[serde(skip)]
    pub span: Span,
    pub operand: Box<BoolExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(skip)]
    pub span: Span,
    pub op: ComparisonOp,
    pub left: Box<ValueExpr>,
    pub right: Box<ValueExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoundsOp {
    Between,
    NotBetween,
}

/// `value BETWEEN lower AND upper`, bounds inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(skip)]
    pub span: Span,
    pub op: BoundsOp,
    pub value: Box<ValueExpr>,
    pub lower: Box<ValueExpr>,
    pub upper: Box<ValueExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NullTestOp {
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullTest {
    #[serde(skip)]
    pub span: Span,
    pub op: NullTestOp,
    pub operand: Box<ValueExpr>,
}

/// Right-hand side of `IN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipSet {
    /// Explicit list of candidates.
    List(Vec<ValueExpr>),
    /// A vector field; must be a path accessor.
    Vector(Box<ValueExpr>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    #[serde(skip)]
    pub span: Span,
    pub value: Box<ValueExpr>,
    pub set: MembershipSet,
}

/// Lifts a boolean or numeric value into predicate position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueWrapper {
    #[serde(skip)]
    pub span: Span,
    pub value: Box<ValueExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoundaryEdge {
    Start,
    End,
}

impl BoundaryEdge {
    pub fn keyword(self) -> &'static str {
        match self {
            BoundaryEdge::Start => "START",
            BoundaryEdge::End => "END",
        }
    }
}

/// First or last row of a relation; used by boundary funnel steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    #[serde(skip)]
    pub span: Span,
    pub edge: BoundaryEdge,
    pub relation: String,
    #[serde(skip)]
    pub resolved: Option<Path>,
}

/// True when the referenced step matched earlier in the same funnel occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReference {
    #[serde(skip)]
    pub span: Span,
    pub step: i64,
}

impl BoolExpr {
    pub fn constant(value: bool) -> Self {
        BoolExpr::Constant(ConstantNode::new(value.into()))
    }

    pub fn and(left: BoolExpr, right: BoolExpr) -> Self {
        Self::binary(BoolOp::And, left, right)
    }

    pub fn or(left: BoolExpr, right: BoolExpr) -> Self {
        Self::binary(BoolOp::Or, left, right)
    }

    pub fn binary(op: BoolOp, left: BoolExpr, right: BoolExpr) -> Self {
        BoolExpr::Binary(BoolBinary {
            span: left.span().cover(right.span()),
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn not(operand: BoolExpr) -> Self {
        BoolExpr::Not(BoolNot {
            span: operand.span(),
            operand: Box::new(operand),
        })
    }

    pub fn compare(op: ComparisonOp, left: ValueExpr, right: ValueExpr) -> Self {
        BoolExpr::Comparison(Comparison {
            span: left.span().cover(right.span()),
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn between(value: ValueExpr, lower: ValueExpr, upper: ValueExpr) -> Self {
        BoolExpr::Bounds(Bounds {
            span: value.span().cover(upper.span()),
            op: BoundsOp::Between,
            value: Box::new(value),
            lower: Box::new(lower),
            upper: Box::new(upper),
        })
    }

    pub fn is_null(operand: ValueExpr) -> Self {
        BoolExpr::NullTest(NullTest {
            span: operand.span(),
            op: NullTestOp::IsNull,
            operand: Box::new(operand),
        })
    }

    pub fn in_list(value: ValueExpr, candidates: Vec<ValueExpr>) -> Self {
        BoolExpr::Membership(Membership {
            span: value.span(),
            value: Box::new(value),
            set: MembershipSet::List(candidates),
        })
    }

    pub fn in_vector(value: ValueExpr, vector: ValueExpr) -> Self {
        BoolExpr::Membership(Membership {
            span: value.span().cover(vector.span()),
            value: Box::new(value),
            set: MembershipSet::Vector(Box::new(vector)),
        })
    }

    pub fn wrap(value: ValueExpr) -> Self {
        BoolExpr::ValueWrapper(ValueWrapper {
            span: value.span(),
            value: Box::new(value),
        })
    }

    pub fn boundary(edge: BoundaryEdge, relation: impl Into<String>) -> Self {
        BoolExpr::Boundary(Boundary {
            span: Span::default(),
            edge,
            relation: relation.into(),
            resolved: None,
        })
    }

    pub fn step(step: i64) -> Self {
        BoolExpr::StepReference(StepReference {
            span: Span::default(),
            step,
        })
    }

    pub fn span(&self) -> Span {
        match self {
            BoolExpr::Constant(n) => n.span,
            BoolExpr::Binary(n) => n.span,
            BoolExpr::Not(n) => n.span,
            BoolExpr::Comparison(n) => n.span,
            BoolExpr::Bounds(n) => n.span,
            BoolExpr::NullTest(n) => n.span,
            BoolExpr::Membership(n) => n.span,
            BoolExpr::ValueWrapper(n) => n.span,
            BoolExpr::Boundary(n) => n.span,
            BoolExpr::StepReference(n) => n.span,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        let slot = match &mut self {
            BoolExpr::Constant(n) => &mut n.span,
            BoolExpr::Binary(n) => &mut n.span,
            BoolExpr::Not(n) => &mut n.span,
            BoolExpr::Comparison(n) => &mut n.span,
            BoolExpr::Bounds(n) => &mut n.span,
            BoolExpr::NullTest(n) => &mut n.span,
            BoolExpr::Membership(n) => &mut n.span,
            BoolExpr::ValueWrapper(n) => &mut n.span,
            BoolExpr::Boundary(n) => &mut n.span,
            BoolExpr::StepReference(n) => &mut n.span,
        };
        *slot = span;
        self
    }

    /// Folded truth value, if this is a boolean constant.
    pub fn as_constant(&self) -> Option<bool> {
        match self {
            BoolExpr::Constant(c) => c.value.as_bool(),
            _ => None,
        }
    }
}
