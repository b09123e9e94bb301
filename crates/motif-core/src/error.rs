use thiserror::Error;

use crate::DataType;

/// Failure while operating on [`Constant`](crate::Constant) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstantError {
    #[error("incompatible types {left} and {right} for `{op}`")]
    TypeMismatch {
        op: String,
        left: DataType,
        right: DataType,
    },

    #[error("cannot cast {from} to {to}")]
    IllegalCast { from: DataType, to: DataType },

    #[error("cannot parse '{text}' as {to}")]
    Malformed { text: String, to: DataType },

    #[error("{0}")]
    ArithmeticFault(String),

    #[error("value out of range for {0}")]
    Overflow(DataType),
}

impl ConstantError {
    pub fn mismatch(op: impl ToString, left: DataType, right: DataType) -> Self {
        Self::TypeMismatch {
            op: op.to_string(),
            left,
            right,
        }
    }

    pub(crate) fn division_by_zero() -> Self {
        Self::ArithmeticFault("division by zero".to_string())
    }

    /// Faults that only show up for particular values (as opposed to type errors).
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::ArithmeticFault(_) | Self::Overflow(_))
    }
}

/// Failure while loading a schema or resolving a name against it.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown path `{0}`")]
    UnknownPath(String),

    #[error("path `{name}` is ambiguous, candidates: {}", candidates.join(", "))]
    AmbiguousPath {
        name: String,
        candidates: Vec<String>,
    },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("malformed schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}
