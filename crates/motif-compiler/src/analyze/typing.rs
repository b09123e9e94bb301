//! Datatype inference and checking.

use motif_core::{DataType, arithmetic_dtype, find_common_dtype};

use crate::ast::{
    Aggregation, AggregationOp, BoolExpr, ConversionKind, ExprRef, MembershipSet, Quantum,
    ValueExpr,
};
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind, Span};
use crate::functions::FunctionDef as _;

fn type_error(span: Span, message: impl AsRef<str>) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::TypeError, span).message(message)
}

fn common(span: Span, what: &str, a: DataType, b: DataType) -> DiagResult<DataType> {
    find_common_dtype(a, b)
        .ok_or_else(|| type_error(span, format!("cannot {what} {a} with {b}")))
}

/// Casts rejected outright; everything else is checked per value.
pub fn is_legal_cast(from: DataType, to: DataType) -> bool {
    !matches!(
        (from, to),
        (_, DataType::Null)
            | (DataType::Boolean, DataType::Datetime)
            | (DataType::Datetime, DataType::Boolean)
    )
}

impl ExprRef<'_> {
    pub fn dtype(self) -> DiagResult<DataType> {
        match self {
            ExprRef::Bool(b) => b.dtype(),
            ExprRef::Value(v) => v.dtype(),
        }
    }
}

impl BoolExpr {
    /// Always `BOOLEAN`; fails when an operand is ill-typed.
    pub fn dtype(&self) -> DiagResult<DataType> {
        let span = self.span();
        match self {
            BoolExpr::Constant(c) => {
                let dtype = c.value.dtype();
                if !matches!(dtype, DataType::Boolean | DataType::Null) {
                    return Err(type_error(span, format!("{dtype} constant used as a predicate")));
                }
            }
            BoolExpr::Binary(n) => {
                n.left.dtype()?;
                n.right.dtype()?;
            }
            BoolExpr::Not(n) => {
                n.operand.dtype()?;
            }
            BoolExpr::Comparison(n) => {
                let (left, right) = (n.left.dtype()?, n.right.dtype()?);
                let dtype = common(span, "compare", left, right)?;
                if n.op.is_ordering() && (dtype == DataType::Boolean || !dtype.is_orderable()) {
                    return Err(type_error(
                        span,
                        format!("`{}` needs ordered operands, found {dtype}", n.op),
                    ));
                }
            }
            BoolExpr::Bounds(n) => {
                let value = n.value.dtype()?;
                let lower = common(span, "compare", value, n.lower.dtype()?)?;
                let dtype = common(span, "compare", lower, n.upper.dtype()?)?;
                if dtype == DataType::Boolean || !dtype.is_orderable() {
                    return Err(type_error(
                        span,
                        format!("BETWEEN needs ordered operands, found {dtype}"),
                    ));
                }
            }
            BoolExpr::NullTest(n) => {
                n.operand.dtype()?;
            }
            BoolExpr::Membership(n) => {
                let value = n.value.dtype()?;
                match &n.set {
                    MembershipSet::List(candidates) => {
                        for candidate in candidates {
                            common(candidate.span(), "compare", value, candidate.dtype()?)?;
                        }
                    }
                    MembershipSet::Vector(vector) => {
                        let is_vector = vector
                            .as_resolved_path()
                            .is_some_and(|path| path.is_vector());
                        if !is_vector {
                            return Err(type_error(
                                vector.span(),
                                "IN needs a vector field on the right-hand side",
                            ));
                        }
                        common(span, "compare", value, vector.dtype()?)?;
                    }
                }
            }
            BoolExpr::ValueWrapper(n) => {
                let dtype = n.value.dtype()?;
                if !(dtype == DataType::Boolean || dtype == DataType::Null || dtype.is_numeric()) {
                    return Err(type_error(span, format!("{dtype} value used as a predicate")));
                }
            }
            BoolExpr::Boundary(_) | BoolExpr::StepReference(_) => {}
        }
        Ok(DataType::Boolean)
    }
}

impl ValueExpr {
    pub fn dtype(&self) -> DiagResult<DataType> {
        let span = self.span();
        match self {
            ValueExpr::Constant(c) => Ok(c.value.dtype()),
            ValueExpr::Path(n) => {
                let path = n.resolved.as_ref().ok_or_else(|| {
                    Diagnostic::new(DiagnosticKind::UnresolvedReference, span).message(&n.name)
                })?;
                path.dtype().ok_or_else(|| {
                    type_error(span, format!("relation `{path}` used as a value"))
                })
            }
            ValueExpr::Parameter(n) => n.dtype.ok_or_else(|| {
                Diagnostic::new(DiagnosticKind::UnresolvedReference, span)
                    .message(format!("${}", n.name))
            }),
            ValueExpr::Binary(n) => {
                let (left, right) = (n.left.dtype()?, n.right.dtype()?);
                arithmetic_dtype(n.op, left, right).ok_or_else(|| {
                    type_error(span, format!("cannot apply `{}` to {left} and {right}", n.op))
                })
            }
            ValueExpr::Unary(n) => {
                let dtype = n.operand.dtype()?;
                if dtype.is_numeric() || dtype == DataType::Null {
                    Ok(dtype)
                } else {
                    Err(type_error(
                        span,
                        format!("unary `{}` needs a numeric operand, found {dtype}", n.op.symbol()),
                    ))
                }
            }
            ValueExpr::Cast(n) => {
                let from = n.operand.dtype()?;
                if is_legal_cast(from, n.target) {
                    Ok(n.target)
                } else {
                    Err(type_error(span, format!("cannot cast {from} to {}", n.target)))
                }
            }
            ValueExpr::DateTimeConversion(n) => {
                let dtype = n.operand.dtype()?;
                let (accepted, result) = match n.conversion {
                    ConversionKind::ToMillis => (dtype == DataType::Datetime, DataType::Long),
                    ConversionKind::ToDatetime => (dtype.is_integral(), DataType::Datetime),
                    _ => (dtype.is_integral(), DataType::Long),
                };
                if accepted || dtype == DataType::Null {
                    Ok(result)
                } else {
                    Err(type_error(
                        span,
                        format!("{} does not accept {dtype}", n.conversion.keyword()),
                    ))
                }
            }
            ValueExpr::DateTimeQuantum(n) => {
                let dtype = n.operand.dtype()?;
                if !matches!(dtype, DataType::Datetime | DataType::Null) {
                    return Err(type_error(
                        span,
                        format!("{} needs a DATETIME, found {dtype}", n.quantum.keyword()),
                    ));
                }
                Ok(match n.quantum {
                    Quantum::Truncate(_) => DataType::Datetime,
                    Quantum::Extract(_) => DataType::Integer,
                })
            }
            ValueExpr::FunctionCall(call) => match &call.context {
                Some(context) => context.function.dtype(call),
                None => Err(Diagnostic::new(DiagnosticKind::UnresolvedReference, span)
                    .message(&call.name)),
            },
            ValueExpr::Aggregation(n) => aggregation_dtype(n),
            ValueExpr::Now(_) => Ok(DataType::Datetime),
        }
    }
}

fn aggregation_dtype(node: &Aggregation) -> DiagResult<DataType> {
    let span = node.span;
    if let Some(condition) = &node.condition {
        condition.dtype()?;
    }
    for constant in [&node.count, &node.quanta].into_iter().flatten() {
        let dtype = constant.dtype()?;
        if !dtype.is_integral() {
            return Err(type_error(
                constant.span(),
                format!("{} needs an integral count, found {dtype}", node.op.keyword()),
            ));
        }
    }

    // COUNT and UNIQUE accept whole relations as their target.
    let relation_target = node
        .target
        .as_resolved_path()
        .is_some_and(|path| path.is_relation());
    match node.op {
        AggregationOp::Count | AggregationOp::Unique if relation_target => Ok(DataType::Long),
        AggregationOp::Count | AggregationOp::Unique => {
            node.target.dtype()?;
            Ok(DataType::Long)
        }
        AggregationOp::Sum => match node.target.dtype()? {
            DataType::Double => Ok(DataType::Double),
            dtype if dtype.is_numeric() || dtype == DataType::Null => Ok(DataType::Long),
            dtype => Err(type_error(span, format!("SUM needs a numeric value, found {dtype}"))),
        },
        AggregationOp::Min | AggregationOp::Max | AggregationOp::Top => {
            let dtype = node.target.dtype()?;
            if dtype == DataType::Boolean || !dtype.is_orderable() {
                return Err(type_error(
                    span,
                    format!("{} needs an ordered value, found {dtype}", node.op.keyword()),
                ));
            }
            Ok(dtype)
        }
    }
}
