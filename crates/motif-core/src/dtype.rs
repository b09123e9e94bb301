//! Data types and the numeric widening lattice.
//!
//! Numeric types widen along `BYTE < SHORT < INTEGER < LONG < DOUBLE`.
//! `STRING`, `BOOLEAN`, `DATETIME` and `NULL` are separate lanes: `NULL`
//! unifies with anything, `DATETIME` unifies with integral types.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Double,
    String,
    Null,
    Datetime,
}

impl DataType {
    pub const ALL: [DataType; 9] = [
        DataType::Boolean,
        DataType::Byte,
        DataType::Short,
        DataType::Integer,
        DataType::Long,
        DataType::Double,
        DataType::String,
        DataType::Null,
        DataType::Datetime,
    ];

    /// Position in the numeric widening order, `None` outside the numeric lane.
    pub fn numeric_rank(self) -> Option<u8> {
        match self {
            DataType::Byte => Some(0),
            DataType::Short => Some(1),
            DataType::Integer => Some(2),
            DataType::Long => Some(3),
            DataType::Double => Some(4),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.numeric_rank().is_some()
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            DataType::Byte | DataType::Short | DataType::Integer | DataType::Long
        )
    }

    /// Types supporting `<`, `<=`, `>`, `>=` and `BETWEEN`.
    pub fn is_orderable(self) -> bool {
        self.is_numeric()
            || matches!(self, DataType::String | DataType::Datetime | DataType::Null)
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Byte => "BYTE",
            DataType::Short => "SHORT",
            DataType::Integer => "INTEGER",
            DataType::Long => "LONG",
            DataType::Double => "DOUBLE",
            DataType::String => "STRING",
            DataType::Null => "NULL",
            DataType::Datetime => "DATETIME",
        }
    }

    /// Case-insensitive lookup by type name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|dtype| dtype.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Narrowest type both sides can be compared or combined in.
///
/// Returns `None` when the types are incompatible; callers report that as a
/// type error.
pub fn find_common_dtype(a: DataType, b: DataType) -> Option<DataType> {
    if a == b {
        return Some(a);
    }
    match (a, b) {
        (DataType::Null, other) | (other, DataType::Null) => Some(other),
        (DataType::Datetime, other) | (other, DataType::Datetime) if other.is_integral() => {
            Some(DataType::Datetime)
        }
        _ => {
            let (ra, rb) = (a.numeric_rank()?, b.numeric_rank()?);
            Some(if ra >= rb { a } else { b })
        }
    }
}

pub fn has_common_dtype(a: DataType, b: DataType) -> bool {
    find_common_dtype(a, b).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Modulo => "%",
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Result type of `a <op> b`.
///
/// Integral operands promote to `LONG`, any `DOUBLE` operand yields `DOUBLE`.
/// `DATETIME +/- integral` stays `DATETIME`, `DATETIME - DATETIME` is a `LONG`
/// duration. `NULL` takes the type the other operand would produce.
pub fn arithmetic_dtype(op: ArithmeticOp, a: DataType, b: DataType) -> Option<DataType> {
    match (a, b) {
        (DataType::Null, DataType::Null) => Some(DataType::Null),
        (DataType::Null, other) | (other, DataType::Null) => arithmetic_dtype(op, other, other)
            .or(Some(other).filter(|t| *t == DataType::Datetime)),
        (DataType::Datetime, DataType::Datetime) => {
            (op == ArithmeticOp::Subtract).then_some(DataType::Long)
        }
        (DataType::Datetime, other) if other.is_integral() => {
            matches!(op, ArithmeticOp::Add | ArithmeticOp::Subtract).then_some(DataType::Datetime)
        }
        (other, DataType::Datetime) if other.is_integral() => {
            (op == ArithmeticOp::Add).then_some(DataType::Datetime)
        }
        (DataType::Double, other) | (other, DataType::Double) if other.is_numeric() => {
            Some(DataType::Double)
        }
        _ if a.is_integral() && b.is_integral() => Some(DataType::Long),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Neq => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
        }
    }

    /// Whether this operator needs an ordering, not just equality.
    pub fn is_ordering(self) -> bool {
        !matches!(self, ComparisonOp::Eq | ComparisonOp::Neq)
    }

    /// Apply the operator to a comparison outcome.
    ///
    /// `None` (unordered, e.g. NaN) satisfies only `!=`.
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        let Some(ordering) = ordering else {
            return self == ComparisonOp::Neq;
        };
        match self {
            ComparisonOp::Eq => ordering == Ordering::Equal,
            ComparisonOp::Neq => ordering != Ordering::Equal,
            ComparisonOp::Lt => ordering == Ordering::Less,
            ComparisonOp::Lte => ordering != Ordering::Greater,
            ComparisonOp::Gt => ordering == Ordering::Greater,
            ComparisonOp::Gte => ordering != Ordering::Less,
        }
    }

    /// The operator with its operands swapped (`a < b` == `b > a`).
    pub fn flipped(self) -> Self {
        match self {
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::Lte => ComparisonOp::Gte,
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::Gte => ComparisonOp::Lte,
            other => other,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
