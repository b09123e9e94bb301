//! Constant folding.
//!
//! A node is reducible when its value is known at compile time: literals and
//! operators over literals. Paths, parameters, `NOW()`, aggregations,
//! boundaries and step references never are.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;
use motif_core::{ComparisonOp, Constant, ConstantError, DataType};

use crate::ast::{
    BoolExpr, BoolOp, BoundsOp, ConversionKind, DateTimeConversion, DateTimeQuantum, ExprRef,
    MembershipSet, NullTestOp, Quantum, TimeOrdinal, TimeUnit, UnaryOp, ValueExpr,
};
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind, Span};
use crate::functions::FunctionDef as _;

/// Report a folding failure at `span`.
pub(crate) fn fault(err: ConstantError, span: Span) -> Diagnostic {
    let kind = if err.is_arithmetic() {
        DiagnosticKind::ArithmeticFault
    } else {
        DiagnosticKind::TypeError
    };
    Diagnostic::new(kind, span).message(err.to_string())
}

fn not_reducible(span: Span) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::ConstantRequiredError, span)
        .message("expression depends on runtime data")
}

impl BoolExpr {
    pub fn can_reduce_to_constant(&self) -> bool {
        match self {
            BoolExpr::Constant(_) => true,
            BoolExpr::Boundary(_) | BoolExpr::StepReference(_) => false,
            _ => self
                .slots()
                .into_iter()
                .all(|child| child.can_reduce_to_constant()),
        }
    }

    /// Fold to a `BOOLEAN` constant.
    pub fn reduce_to_constant(&self) -> DiagResult<Constant> {
        self.reduce_to_bool().map(Constant::Boolean)
    }

    fn reduce_to_bool(&self) -> DiagResult<bool> {
        let span = self.span();
        let compare = |op: ComparisonOp, left: &Constant, right: &Constant| {
            left.compare(op, right).map_err(|err| fault(err, span))
        };

        match self {
            BoolExpr::Constant(c) => Ok(c.value.is_truthy()),
            BoolExpr::Binary(n) => {
                let left = n.left.reduce_to_bool()?;
                let right = n.right.reduce_to_bool()?;
                Ok(match n.op {
                    BoolOp::And => left && right,
                    BoolOp::Or => left || right,
                })
            }
            BoolExpr::Not(n) => Ok(!n.operand.reduce_to_bool()?),
            BoolExpr::Comparison(n) => compare(
                n.op,
                &n.left.reduce_to_constant()?,
                &n.right.reduce_to_constant()?,
            ),
            BoolExpr::Bounds(n) => {
                let value = n.value.reduce_to_constant()?;
                let inside = compare(ComparisonOp::Gte, &value, &n.lower.reduce_to_constant()?)?
                    && compare(ComparisonOp::Lte, &value, &n.upper.reduce_to_constant()?)?;
                Ok(match n.op {
                    BoundsOp::Between => inside,
                    BoundsOp::NotBetween => !inside,
                })
            }
            BoolExpr::NullTest(n) => {
                let null = n.operand.reduce_to_constant()?.is_null();
                Ok(match n.op {
                    NullTestOp::IsNull => null,
                    NullTestOp::IsNotNull => !null,
                })
            }
            BoolExpr::Membership(n) => {
                let MembershipSet::List(candidates) = &n.set else {
                    return Err(not_reducible(span));
                };
                let value = n.value.reduce_to_constant()?;
                for candidate in candidates {
                    if compare(ComparisonOp::Eq, &value, &candidate.reduce_to_constant()?)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            BoolExpr::ValueWrapper(n) => Ok(n.value.reduce_to_constant()?.is_truthy()),
            BoolExpr::Boundary(_) | BoolExpr::StepReference(_) => Err(not_reducible(span)),
        }
    }
}

impl ExprRef<'_> {
    pub fn can_reduce_to_constant(self) -> bool {
        match self {
            ExprRef::Bool(b) => b.can_reduce_to_constant(),
            ExprRef::Value(v) => v.can_reduce_to_constant(),
        }
    }
}

impl ValueExpr {
    pub fn can_reduce_to_constant(&self) -> bool {
        match self {
            ValueExpr::Constant(_) => true,
            ValueExpr::Path(_)
            | ValueExpr::Parameter(_)
            | ValueExpr::Now(_)
            | ValueExpr::Aggregation(_) => false,
            ValueExpr::FunctionCall(call) => call
                .context
                .as_ref()
                .is_some_and(|context| context.function.can_reduce_to_constant(call)),
            _ => self
                .slots()
                .into_iter()
                .all(|child| child.can_reduce_to_constant()),
        }
    }

    pub fn reduce_to_constant(&self) -> DiagResult<Constant> {
        let span = self.span();
        match self {
            ValueExpr::Constant(c) => Ok(c.value.clone()),
            ValueExpr::Binary(n) => n
                .left
                .reduce_to_constant()?
                .operate(n.op, &n.right.reduce_to_constant()?)
                .map_err(|err| fault(err, span)),
            ValueExpr::Unary(n) => {
                let operand = n.operand.reduce_to_constant()?;
                match n.op {
                    UnaryOp::Negate => operand.negate().map_err(|err| fault(err, span)),
                    UnaryOp::Normal => Ok(operand),
                }
            }
            ValueExpr::Cast(n) => n
                .operand
                .reduce_to_constant()?
                .cast(n.target)
                .map_err(|err| fault(err, span)),
            ValueExpr::DateTimeConversion(n) => reduce_conversion(n),
            ValueExpr::DateTimeQuantum(n) => reduce_quantum(n),
            ValueExpr::FunctionCall(call) => match &call.context {
                Some(context) => context.function.reduce_to_constant(call),
                None => Err(not_reducible(span)),
            },
            ValueExpr::Path(_)
            | ValueExpr::Parameter(_)
            | ValueExpr::Now(_)
            | ValueExpr::Aggregation(_) => Err(not_reducible(span)),
        }
    }
}

fn reduce_conversion(node: &DateTimeConversion) -> DiagResult<Constant> {
    let span = node.span;
    let operand = node.operand.reduce_to_constant()?;
    if operand.is_null() {
        return Ok(Constant::Null);
    }

    if let Some(millis) = node.conversion.millis() {
        let value = operand
            .cast(DataType::Long)
            .map_err(|err| fault(err, span))?
            .as_i64()
            .unwrap_or_default();
        return value
            .checked_mul(millis)
            .map(Constant::Long)
            .ok_or_else(|| fault(ConstantError::Overflow(DataType::Long), span));
    }

    let target = match node.conversion {
        ConversionKind::ToDatetime => DataType::Datetime,
        _ => DataType::Long,
    };
    operand.cast(target).map_err(|err| fault(err, span))
}

fn reduce_quantum(node: &DateTimeQuantum) -> DiagResult<Constant> {
    let span = node.span;
    let operand = node.operand.reduce_to_constant()?;
    if operand.is_null() {
        return Ok(Constant::Null);
    }
    let Constant::Datetime(ms) = operand else {
        return Err(fault(
            ConstantError::mismatch(node.quantum.keyword(), operand.dtype(), DataType::Datetime),
            span,
        ));
    };

    let tz = node.tz.unwrap_or(Tz::UTC);
    let outside = || {
        fault(
            ConstantError::ArithmeticFault(format!(
                "{ms} has no local time in {}",
                tz.name()
            )),
            span,
        )
    };
    let local = tz
        .timestamp_millis_opt(ms)
        .single()
        .ok_or_else(outside)?
        .naive_local();

    match node.quantum {
        Quantum::Truncate(unit) => {
            let truncated = truncate(local, unit).ok_or_else(outside)?;
            let instant = tz
                .from_local_datetime(&truncated)
                .earliest()
                .ok_or_else(outside)?;
            Ok(Constant::Datetime(instant.timestamp_millis()))
        }
        Quantum::Extract(ordinal) => Ok(Constant::Integer(extract(local, ordinal))),
    }
}

/// Start of the calendar bucket containing `local`. Weeks start on Monday.
pub(crate) fn truncate(local: NaiveDateTime, unit: TimeUnit) -> Option<NaiveDateTime> {
    let date = local.date();
    let midnight = |date: NaiveDate| date.and_hms_opt(0, 0, 0);
    match unit {
        TimeUnit::Second => local.with_nanosecond(0),
        TimeUnit::Minute => local.with_nanosecond(0)?.with_second(0),
        TimeUnit::Hour => local.with_nanosecond(0)?.with_second(0)?.with_minute(0),
        TimeUnit::Day => midnight(date),
        TimeUnit::Week => {
            let offset = u64::from(date.weekday().num_days_from_monday());
            midnight(date.checked_sub_days(Days::new(offset))?)
        }
        TimeUnit::Month => midnight(NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?),
        TimeUnit::Quarter => {
            let month = (date.month0() / 3) * 3 + 1;
            midnight(NaiveDate::from_ymd_opt(date.year(), month, 1)?)
        }
        TimeUnit::Year => midnight(NaiveDate::from_ymd_opt(date.year(), 1, 1)?),
    }
}

/// Calendar component of `local`. Day of week counts Monday as 1, weeks
/// follow ISO 8601.
pub(crate) fn extract(local: NaiveDateTime, ordinal: TimeOrdinal) -> i32 {
    let field = |value: u32| i32::try_from(value).unwrap_or(i32::MAX);
    match ordinal {
        TimeOrdinal::SecondOfMinute => field(local.second()),
        TimeOrdinal::MinuteOfHour => field(local.minute()),
        TimeOrdinal::HourOfDay => field(local.hour()),
        TimeOrdinal::DayOfWeek => field(local.weekday().number_from_monday()),
        TimeOrdinal::DayOfMonth => field(local.day()),
        TimeOrdinal::DayOfYear => field(local.ordinal()),
        TimeOrdinal::WeekOfYear => field(local.iso_week().week()),
        TimeOrdinal::MonthOfYear => field(local.month()),
        TimeOrdinal::Year => local.year(),
    }
}
