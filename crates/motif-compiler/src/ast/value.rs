use chrono_tz::Tz;
use motif_core::{ArithmeticOp, Constant, DataType, Path};
use serde::{Deserialize, Serialize};

use super::{Aggregation, ConstantNode, FunctionCall};
use crate::diagnostics::Span;

/// Value-producing expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueExpr {
    Constant(ConstantNode),
    Path(PathAccessor),
    Parameter(ParameterAccessor),
    Binary(ValueBinary),
    Unary(ValueUnary),
    Cast(Cast),
    DateTimeConversion(DateTimeConversion),
    DateTimeQuantum(DateTimeQuantum),
    FunctionCall(FunctionCall),
    Aggregation(Aggregation),
    Now(Now),
}

/// A dotted schema name, resolved to a [`Path`] at bind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathAccessor {
    #[serde(skip)]
    pub span: Span,
    pub name: String,
    #[serde(skip)]
    pub resolved: Option<Path>,
}

/// `$name`, typed from its declaration at bind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAccessor {
    #[serde(skip)]
    pub span: Span,
    pub name: String,
    #[serde(skip)]
    pub dtype: Option<DataType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueBinary {
    #[serde(skip)]
    pub span: Span,
    pub op: ArithmeticOp,
    pub left: Box<ValueExpr>,
    pub right: Box<ValueExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnaryOp {
    Negate,
    Normal,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Normal => "+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueUnary {
    #[serde(skip)]
    pub span: Span,
    pub op: UnaryOp,
    pub operand: Box<ValueExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cast {
    #[serde(skip)]
    pub span: Span,
    pub target: DataType,
    pub operand: Box<ValueExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionKind {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    ToDatetime,
    ToMillis,
}

impl ConversionKind {
    pub const ALL: [ConversionKind; 7] = [
        ConversionKind::Seconds,
        ConversionKind::Minutes,
        ConversionKind::Hours,
        ConversionKind::Days,
        ConversionKind::Weeks,
        ConversionKind::ToDatetime,
        ConversionKind::ToMillis,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            ConversionKind::Seconds => "SECONDS",
            ConversionKind::Minutes => "MINUTES",
            ConversionKind::Hours => "HOURS",
            ConversionKind::Days => "DAYS",
            ConversionKind::Weeks => "WEEKS",
            ConversionKind::ToDatetime => "TO_DATETIME",
            ConversionKind::ToMillis => "TO_MILLIS",
        }
    }

    /// Milliseconds per unit for the duration conversions.
    pub fn millis(self) -> Option<i64> {
        match self {
            ConversionKind::Seconds => Some(motif_core::MILLIS_PER_SECOND),
            ConversionKind::Minutes => Some(motif_core::MILLIS_PER_MINUTE),
            ConversionKind::Hours => Some(motif_core::MILLIS_PER_HOUR),
            ConversionKind::Days => Some(motif_core::MILLIS_PER_DAY),
            ConversionKind::Weeks => Some(motif_core::MILLIS_PER_WEEK),
            ConversionKind::ToDatetime | ConversionKind::ToMillis => None,
        }
    }
}

/// Duration and epoch conversions: `WEEKS(2)`, `TO_DATETIME(ms)`, `TO_MILLIS(ts)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeConversion {
    #[serde(skip)]
    pub span: Span,
    pub conversion: ConversionKind,
    pub operand: Box<ValueExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 8] = [
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
        TimeUnit::Week,
        TimeUnit::Month,
        TimeUnit::Quarter,
        TimeUnit::Year,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            TimeUnit::Second => "SECOND",
            TimeUnit::Minute => "MINUTE",
            TimeUnit::Hour => "HOUR",
            TimeUnit::Day => "DAY",
            TimeUnit::Week => "WEEK",
            TimeUnit::Month => "MONTH",
            TimeUnit::Quarter => "QUARTER",
            TimeUnit::Year => "YEAR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOrdinal {
    SecondOfMinute,
    MinuteOfHour,
    HourOfDay,
    DayOfWeek,
    DayOfMonth,
    DayOfYear,
    WeekOfYear,
    MonthOfYear,
    Year,
}

impl TimeOrdinal {
    pub const ALL: [TimeOrdinal; 9] = [
        TimeOrdinal::SecondOfMinute,
        TimeOrdinal::MinuteOfHour,
        TimeOrdinal::HourOfDay,
        TimeOrdinal::DayOfWeek,
        TimeOrdinal::DayOfMonth,
        TimeOrdinal::DayOfYear,
        TimeOrdinal::WeekOfYear,
        TimeOrdinal::MonthOfYear,
        TimeOrdinal::Year,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            TimeOrdinal::SecondOfMinute => "SECOND_OF_MINUTE",
            TimeOrdinal::MinuteOfHour => "MINUTE_OF_HOUR",
            TimeOrdinal::HourOfDay => "HOUR_OF_DAY",
            TimeOrdinal::DayOfWeek => "DAY_OF_WEEK",
            TimeOrdinal::DayOfMonth => "DAY_OF_MONTH",
            TimeOrdinal::DayOfYear => "DAY_OF_YEAR",
            TimeOrdinal::WeekOfYear => "WEEK_OF_YEAR",
            TimeOrdinal::MonthOfYear => "MONTH_OF_YEAR",
            TimeOrdinal::Year => "YEAR",
        }
    }
}

/// Bucketing of a timestamp: truncation keeps a `DATETIME`, extraction yields
/// an `INTEGER` calendar component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "unit", rename_all = "snake_case")]
pub enum Quantum {
    Truncate(TimeUnit),
    Extract(TimeOrdinal),
}

impl Quantum {
    pub fn keyword(self) -> &'static str {
        match self {
            Quantum::Truncate(_) => "TRUNCATE",
            Quantum::Extract(_) => "EXTRACT",
        }
    }

    pub fn unit_keyword(self) -> &'static str {
        match self {
            Quantum::Truncate(unit) => unit.keyword(),
            Quantum::Extract(ordinal) => ordinal.keyword(),
        }
    }
}

/// Time-zone aware bucketing; without a zone the session default applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeQuantum {
    #[serde(skip)]
    pub span: Span,
    pub quantum: Quantum,
    pub operand: Box<ValueExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip)]
    pub tz: Option<Tz>,
}

/// Evaluation time, unknown at compile time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Now {
    #[serde(skip)]
    pub span: Span,
}

impl ValueExpr {
    pub fn constant(value: impl Into<Constant>) -> Self {
        ValueExpr::Constant(ConstantNode::new(value.into()))
    }

    pub fn null() -> Self {
        ValueExpr::Constant(ConstantNode::new(Constant::Null))
    }

    pub fn path(name: impl Into<String>) -> Self {
        ValueExpr::Path(PathAccessor {
            span: Span::default(),
            name: name.into(),
            resolved: None,
        })
    }

    pub fn param(name: impl Into<String>) -> Self {
        ValueExpr::Parameter(ParameterAccessor {
            span: Span::default(),
            name: name.into(),
            dtype: None,
        })
    }

    pub fn binary(op: ArithmeticOp, left: ValueExpr, right: ValueExpr) -> Self {
        ValueExpr::Binary(ValueBinary {
            span: left.span().cover(right.span()),
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(op: UnaryOp, operand: ValueExpr) -> Self {
        ValueExpr::Unary(ValueUnary {
            span: operand.span(),
            op,
            operand: Box::new(operand),
        })
    }

    pub fn cast(operand: ValueExpr, target: DataType) -> Self {
        ValueExpr::Cast(Cast {
            span: operand.span(),
            target,
            operand: Box::new(operand),
        })
    }

    pub fn convert(conversion: ConversionKind, operand: ValueExpr) -> Self {
        ValueExpr::DateTimeConversion(DateTimeConversion {
            span: operand.span(),
            conversion,
            operand: Box::new(operand),
        })
    }

    pub fn quantum(quantum: Quantum, operand: ValueExpr, zone: Option<String>) -> Self {
        ValueExpr::DateTimeQuantum(DateTimeQuantum {
            span: operand.span(),
            quantum,
            operand: Box::new(operand),
            zone,
            tz: None,
        })
    }

    pub fn call(name: impl Into<String>, args: Vec<ValueExpr>) -> Self {
        ValueExpr::FunctionCall(FunctionCall::new(name, args))
    }

    pub fn now() -> Self {
        ValueExpr::Now(Now::default())
    }

    pub fn span(&self) -> Span {
        match self {
            ValueExpr::Constant(n) => n.span,
            ValueExpr::Path(n) => n.span,
            ValueExpr::Parameter(n) => n.span,
            ValueExpr::Binary(n) => n.span,
            ValueExpr::Unary(n) => n.span,
            ValueExpr::Cast(n) => n.span,
            ValueExpr::DateTimeConversion(n) => n.span,
            ValueExpr::DateTimeQuantum(n) => n.span,
            ValueExpr::FunctionCall(n) => n.span,
            ValueExpr::Aggregation(n) => n.span,
            ValueExpr::Now(n) => n.span,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        let slot = match &mut self {
            ValueExpr::Constant(n) => &mut n.span,
            ValueExpr::Path(n) => &mut n.span,
            ValueExpr::Parameter(n) => &mut n.span,
            ValueExpr::Binary(n) => &mut n.span,
            ValueExpr::Unary(n) => &mut n.span,
            ValueExpr::Cast(n) => &mut n.span,
            ValueExpr::DateTimeConversion(n) => &mut n.span,
            ValueExpr::DateTimeQuantum(n) => &mut n.span,
            ValueExpr::FunctionCall(n) => &mut n.span,
            ValueExpr::Aggregation(n) => &mut n.span,
            ValueExpr::Now(n) => &mut n.span,
        };
        *slot = span;
        self
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            ValueExpr::Constant(c) => Some(&c.value),
            _ => None,
        }
    }

    /// The resolved path, if this is a bound path accessor.
    pub fn as_resolved_path(&self) -> Option<&Path> {
        match self {
            ValueExpr::Path(p) => p.resolved.as_ref(),
            _ => None,
        }
    }
}

impl From<Aggregation> for ValueExpr {
    fn from(aggregation: Aggregation) -> Self {
        ValueExpr::Aggregation(aggregation)
    }
}
