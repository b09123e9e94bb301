//! Typed constant values and their folding operations.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::utils::{quote, unquote};
use crate::{
    ArithmeticOp, ComparisonOp, ConstantError, DataType, arithmetic_dtype, find_common_dtype,
};

type Result<T> = std::result::Result<T, ConstantError>;

/// A literal value. `Datetime` holds epoch milliseconds (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Constant {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Integer(i32),
    Long(i64),
    Double(#[serde(with = "double_lane")] f64),
    String(String),
    Null,
    Datetime(i64),
}

/// Non-finite doubles are written as `"NaN"`, `"Infinity"` or `"-Infinity"`,
/// which plain JSON numbers cannot carry.
mod double_lane {
    use serde::de::{Error, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Named(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Named(name) => match name.as_str() {
                "NaN" => Ok(f64::NAN),
                "Infinity" => Ok(f64::INFINITY),
                "-Infinity" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::invalid_value(
                    Unexpected::Str(other),
                    &"a number, \"NaN\", \"Infinity\" or \"-Infinity\"",
                )),
            },
        }
    }
}

/// Representation both sides of a comparison are widened into.
enum Lane<'a> {
    Int(i64),
    Float(f64),
    Str(&'a str),
    Bool(bool),
}

impl Constant {
    /// String constant from literal source text, see [`unquote`].
    pub fn string_literal(raw: &str) -> Self {
        Constant::String(unquote(raw))
    }

    /// `INTEGER` when the value fits, `LONG` otherwise.
    pub fn integer_literal(value: i64) -> Self {
        i32::try_from(value)
            .map(Constant::Integer)
            .unwrap_or(Constant::Long(value))
    }

    pub fn dtype(&self) -> DataType {
        match self {
            Constant::Boolean(_) => DataType::Boolean,
            Constant::Byte(_) => DataType::Byte,
            Constant::Short(_) => DataType::Short,
            Constant::Integer(_) => DataType::Integer,
            Constant::Long(_) => DataType::Long,
            Constant::Double(_) => DataType::Double,
            Constant::String(_) => DataType::String,
            Constant::Null => DataType::Null,
            Constant::Datetime(_) => DataType::Datetime,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Constant::Null)
    }

    /// Integral payload, including `DATETIME` milliseconds.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Constant::Byte(v) => Some(i64::from(v)),
            Constant::Short(v) => Some(i64::from(v)),
            Constant::Integer(v) => Some(i64::from(v)),
            Constant::Long(v) | Constant::Datetime(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Constant::Double(v) => Some(v),
            Constant::Byte(_) | Constant::Short(_) | Constant::Integer(_) | Constant::Long(_) => {
                self.as_i64().map(|v| v as f64)
            }
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Constant::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(s) => Some(s),
            _ => None,
        }
    }

    /// Truth value when a constant is used as a predicate.
    pub fn is_truthy(&self) -> bool {
        match self {
            Constant::Boolean(b) => *b,
            Constant::Double(v) => *v != 0.0,
            Constant::String(s) => !s.is_empty(),
            Constant::Null => false,
            Constant::Datetime(_) => true,
            other => other.as_i64().is_some_and(|v| v != 0),
        }
    }

    fn lane(&self, common: DataType) -> Option<Lane<'_>> {
        match self {
            Constant::Double(v) => Some(Lane::Float(*v)),
            Constant::String(s) => Some(Lane::Str(s)),
            Constant::Boolean(b) => Some(Lane::Bool(*b)),
            other if common == DataType::Double => other.as_f64().map(Lane::Float),
            other => other.as_i64().map(Lane::Int),
        }
    }

    /// Ordering after widening both sides to their common type.
    ///
    /// `Ok(None)` means unordered (NULL involved, or NaN).
    pub fn ordering(&self, other: &Constant) -> Result<Option<Ordering>> {
        let (left, right) = (self.dtype(), other.dtype());
        let mismatch = || ConstantError::mismatch("compare", left, right);
        let common = find_common_dtype(left, right).ok_or_else(mismatch)?;
        if self.is_null() || other.is_null() {
            return Ok(None);
        }

        let ordering = match (self.lane(common), other.lane(common)) {
            (Some(Lane::Int(a)), Some(Lane::Int(b))) => a.partial_cmp(&b),
            (Some(Lane::Float(a)), Some(Lane::Float(b))) => a.partial_cmp(&b),
            (Some(Lane::Str(a)), Some(Lane::Str(b))) => a.partial_cmp(b),
            (Some(Lane::Bool(a)), Some(Lane::Bool(b))) => a.partial_cmp(&b),
            _ => return Err(mismatch()),
        };
        Ok(ordering)
    }

    /// Evaluate `self <op> other`.
    pub fn compare(&self, op: ComparisonOp, other: &Constant) -> Result<bool> {
        let (left, right) = (self.dtype(), other.dtype());
        let common =
            find_common_dtype(left, right).ok_or_else(|| ConstantError::mismatch(op, left, right))?;
        if common == DataType::Boolean && op.is_ordering() {
            return Err(ConstantError::mismatch(op, left, right));
        }

        if self.is_null() || other.is_null() {
            let both = self.is_null() && other.is_null();
            return Ok(match op {
                ComparisonOp::Eq => both,
                ComparisonOp::Neq => !both,
                _ => false,
            });
        }

        Ok(op.holds(self.ordering(other)?))
    }

    /// Evaluate `self <op> other`, typed by [`arithmetic_dtype`].
    pub fn operate(&self, op: ArithmeticOp, other: &Constant) -> Result<Constant> {
        let (left, right) = (self.dtype(), other.dtype());
        let mismatch = || ConstantError::mismatch(op, left, right);
        let dtype = arithmetic_dtype(op, left, right).ok_or_else(mismatch)?;
        if self.is_null() || other.is_null() {
            return Ok(Constant::Null);
        }

        match dtype {
            DataType::Double => {
                let (a, b) = (
                    self.as_f64().ok_or_else(mismatch)?,
                    other.as_f64().ok_or_else(mismatch)?,
                );
                double_op(op, a, b).map(Constant::Double)
            }
            DataType::Long | DataType::Datetime => {
                let (a, b) = (
                    self.as_i64().ok_or_else(mismatch)?,
                    other.as_i64().ok_or_else(mismatch)?,
                );
                let value = integral_op(op, a, b, dtype)?;
                Ok(if dtype == DataType::Long {
                    Constant::Long(value)
                } else {
                    Constant::Datetime(value)
                })
            }
            _ => Err(mismatch()),
        }
    }

    pub fn negate(&self) -> Result<Constant> {
        match *self {
            Constant::Byte(v) => checked(v.checked_neg(), DataType::Byte).map(Constant::Byte),
            Constant::Short(v) => checked(v.checked_neg(), DataType::Short).map(Constant::Short),
            Constant::Integer(v) => {
                checked(v.checked_neg(), DataType::Integer).map(Constant::Integer)
            }
            Constant::Long(v) => checked(v.checked_neg(), DataType::Long).map(Constant::Long),
            Constant::Double(v) => Ok(Constant::Double(-v)),
            Constant::Null => Ok(Constant::Null),
            _ => Err(ConstantError::mismatch("-", self.dtype(), self.dtype())),
        }
    }

    /// Convert to `target`, see [`DataType`] for the lanes involved.
    pub fn cast(&self, target: DataType) -> Result<Constant> {
        let from = self.dtype();
        let illegal = || ConstantError::IllegalCast { from, to: target };
        if target == DataType::Null {
            return Err(illegal());
        }
        if from == target {
            return Ok(self.clone());
        }

        match self {
            Constant::Null => Ok(Constant::Null),
            Constant::String(text) => parse_as(text, target),
            Constant::Boolean(b) => match target {
                DataType::Datetime => Err(illegal()),
                DataType::String => Ok(Constant::String(b.to_string())),
                _ => integral_into(i64::from(*b), target),
            },
            Constant::Double(v) => match target {
                DataType::Boolean => Ok(Constant::Boolean(*v != 0.0)),
                DataType::String => Ok(Constant::String(v.to_string())),
                _ => integral_into(truncate(*v, target)?, target),
            },
            Constant::Datetime(ms) => match target {
                DataType::Boolean => Err(illegal()),
                DataType::String => format_millis(*ms).map(Constant::String),
                _ => integral_into(*ms, target),
            },
            integral => {
                let value = integral.as_i64().ok_or_else(illegal)?;
                integral_into(value, target)
            }
        }
    }
}

fn checked<T>(value: Option<T>, dtype: DataType) -> Result<T> {
    value.ok_or(ConstantError::Overflow(dtype))
}

fn integral_op(op: ArithmeticOp, a: i64, b: i64, dtype: DataType) -> Result<i64> {
    let value = match op {
        ArithmeticOp::Add => a.checked_add(b),
        ArithmeticOp::Subtract => a.checked_sub(b),
        ArithmeticOp::Multiply => a.checked_mul(b),
        ArithmeticOp::Divide | ArithmeticOp::Modulo if b == 0 => {
            return Err(ConstantError::division_by_zero());
        }
        ArithmeticOp::Divide => a.checked_div(b),
        ArithmeticOp::Modulo => a.checked_rem(b),
    };
    checked(value, dtype)
}

fn double_op(op: ArithmeticOp, a: f64, b: f64) -> Result<f64> {
    Ok(match op {
        ArithmeticOp::Add => a + b,
        ArithmeticOp::Subtract => a - b,
        ArithmeticOp::Multiply => a * b,
        ArithmeticOp::Divide | ArithmeticOp::Modulo if b == 0.0 => {
            return Err(ConstantError::division_by_zero());
        }
        ArithmeticOp::Divide => a / b,
        ArithmeticOp::Modulo => a % b,
    })
}

/// Truncate toward zero into the `i64` range.
fn truncate(value: f64, target: DataType) -> Result<i64> {
    // 2^63 is exactly representable, i64::MAX is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < -LIMIT || truncated >= LIMIT {
        return Err(ConstantError::Overflow(target));
    }
    Ok(truncated as i64)
}

fn integral_into(value: i64, target: DataType) -> Result<Constant> {
    let overflow = || ConstantError::Overflow(target);
    match target {
        DataType::Boolean => Ok(Constant::Boolean(value != 0)),
        DataType::Byte => i8::try_from(value)
            .map(Constant::Byte)
            .map_err(|_| overflow()),
        DataType::Short => i16::try_from(value)
            .map(Constant::Short)
            .map_err(|_| overflow()),
        DataType::Integer => i32::try_from(value)
            .map(Constant::Integer)
            .map_err(|_| overflow()),
        DataType::Long => Ok(Constant::Long(value)),
        DataType::Double => Ok(Constant::Double(value as f64)),
        DataType::String => Ok(Constant::String(value.to_string())),
        DataType::Datetime => Ok(Constant::Datetime(value)),
        DataType::Null => Err(ConstantError::IllegalCast {
            from: DataType::Long,
            to: DataType::Null,
        }),
    }
}

fn parse_as(text: &str, target: DataType) -> Result<Constant> {
    let trimmed = text.trim();
    let malformed = || ConstantError::Malformed {
        text: text.to_string(),
        to: target,
    };

    match target {
        DataType::Boolean if trimmed.eq_ignore_ascii_case("true") => Ok(Constant::Boolean(true)),
        DataType::Boolean if trimmed.eq_ignore_ascii_case("false") => {
            Ok(Constant::Boolean(false))
        }
        DataType::Boolean => Err(malformed()),
        DataType::Double => trimmed
            .parse::<f64>()
            .map(Constant::Double)
            .map_err(|_| malformed()),
        DataType::Datetime => parse_datetime_millis(trimmed)
            .map(Constant::Datetime)
            .ok_or_else(malformed),
        DataType::String => Ok(Constant::String(text.to_string())),
        DataType::Null => Err(ConstantError::IllegalCast {
            from: DataType::String,
            to: target,
        }),
        _ => {
            let value: i64 = trimmed.parse().map_err(|_| malformed())?;
            integral_into(value, target)
        }
    }
}

/// Parse a timestamp into epoch milliseconds.
///
/// Accepts RFC 3339 (`2024-03-01T12:00:00+02:00`), naive date-times taken as
/// UTC (`2024-03-01T12:00:00.250`, `2024-03-01 12:00:00`) and plain dates
/// (`2024-03-01`).
pub fn parse_datetime_millis(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// RFC 3339 UTC rendering with millisecond precision.
pub fn format_millis(ms: i64) -> Result<String> {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or(ConstantError::Overflow(DataType::Datetime))
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Boolean(b) => write!(f, "{b}"),
            Constant::Byte(v) => write!(f, "{v}"),
            Constant::Short(v) => write!(f, "{v}"),
            Constant::Integer(v) => write!(f, "{v}"),
            Constant::Long(v) => write!(f, "{v}"),
            Constant::Double(v) => write!(f, "{v:?}"),
            Constant::String(s) => f.write_str(&quote(s)),
            Constant::Null => f.write_str("NULL"),
            Constant::Datetime(ms) => match format_millis(*ms) {
                Ok(text) => f.write_str(&text),
                Err(_) => write!(f, "{ms}ms"),
            },
        }
    }
}

impl From<bool> for Constant {
    fn from(value: bool) -> Self {
        Constant::Boolean(value)
    }
}

impl From<i32> for Constant {
    fn from(value: i32) -> Self {
        Constant::Integer(value)
    }
}

impl From<i64> for Constant {
    fn from(value: i64) -> Self {
        Constant::Long(value)
    }
}

impl From<f64> for Constant {
    fn from(value: f64) -> Self {
        Constant::Double(value)
    }
}

impl From<&str> for Constant {
    fn from(value: &str) -> Self {
        Constant::String(value.to_string())
    }
}
