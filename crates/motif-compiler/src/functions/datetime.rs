use std::fmt::Write as _;

use chrono::DateTime;
use chrono_tz::Tz;
use motif_core::{Constant, DataType};

use super::{
    Arity, CallState, FunctionDef, call_state, constant_arg, expect_arg, not_constant,
};
use crate::analyze::AnalysisCx;
use crate::analyze::fold::fault;
use crate::ast::FunctionCall;
use crate::config::parse_time_zone;
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind};

/// `parse_datetime(text)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseDatetimeFn;

impl FunctionDef for ParseDatetimeFn {
    fn name(&self) -> &'static str {
        "parse_datetime"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn dtype(&self, call: &FunctionCall) -> DiagResult<DataType> {
        expect_arg(call, 0, "a STRING", |t| t == DataType::String)?;
        Ok(DataType::Datetime)
    }

    fn can_reduce_to_constant(&self, call: &FunctionCall) -> bool {
        call.args[0].can_reduce_to_constant()
    }

    fn reduce_to_constant(&self, call: &FunctionCall) -> DiagResult<Constant> {
        constant_arg(call, 0)?
            .cast(DataType::Datetime)
            .map_err(|err| fault(err, call.span))
    }
}

/// `format_datetime(ts, format[, zone])` with strftime-style formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatDatetimeFn;

impl FormatDatetimeFn {
    fn zone(call: &FunctionCall) -> Tz {
        match call_state(call) {
            Some(CallState::Zone(tz)) => *tz,
            _ => Tz::UTC,
        }
    }
}

impl FunctionDef for FormatDatetimeFn {
    fn name(&self) -> &'static str {
        "format_datetime"
    }

    fn arity(&self) -> Arity {
        Arity::Between(2, 3)
    }

    fn bind(&self, cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<CallState> {
        for arg in &mut call.args {
            arg.bind(cx)?;
        }
        Ok(CallState::Zone(cx.global().time_zone()))
    }

    fn validate(&self, cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<()> {
        for arg in &mut call.args {
            arg.validate(cx)?;
        }

        if call.args.len() == 3 {
            let zone = constant_arg(call, 2)?;
            let span = call.args[2].span();
            let Some(name) = zone.as_str() else {
                return Err(Diagnostic::new(DiagnosticKind::TypeError, span)
                    .message("time zone must be a STRING"));
            };
            let tz = parse_time_zone(name, span)?;
            if let Some(context) = &mut call.context {
                context.state = CallState::Zone(tz);
            }
        }

        let pattern = &call.args[1];
        if pattern.can_reduce_to_constant()
            && let Some(text) = pattern.reduce_to_constant()?.as_str()
            && format_in_zone(0, text, Tz::UTC).is_none()
        {
            return Err(Diagnostic::new(DiagnosticKind::TypeError, pattern.span())
                .message(format!("invalid datetime format `{text}`")));
        }
        Ok(())
    }

    fn dtype(&self, call: &FunctionCall) -> DiagResult<DataType> {
        expect_arg(call, 0, "a DATETIME", |t| t == DataType::Datetime)?;
        for index in 1..call.args.len() {
            expect_arg(call, index, "a STRING", |t| t == DataType::String)?;
        }
        Ok(DataType::String)
    }

    fn can_reduce_to_constant(&self, call: &FunctionCall) -> bool {
        call.args.iter().all(|arg| arg.can_reduce_to_constant())
    }

    fn reduce_to_constant(&self, call: &FunctionCall) -> DiagResult<Constant> {
        let (timestamp, pattern) = (constant_arg(call, 0)?, constant_arg(call, 1)?);
        if timestamp.is_null() || pattern.is_null() {
            return Ok(Constant::Null);
        }
        let (Some(ms), Some(text)) = (timestamp.as_i64(), pattern.as_str()) else {
            return Err(not_constant(call));
        };
        format_in_zone(ms, text, Self::zone(call))
            .map(Constant::String)
            .ok_or_else(|| {
                Diagnostic::new(DiagnosticKind::TypeError, call.span)
                    .message(format!("cannot format {ms} with `{text}`"))
            })
    }
}

/// Render epoch `ms` in `tz`. Invalid format strings yield `None`.
fn format_in_zone(ms: i64, pattern: &str, tz: Tz) -> Option<String> {
    let local = DateTime::from_timestamp_millis(ms)?.with_timezone(&tz);
    let mut out = String::new();
    write!(out, "{}", local.format(pattern)).ok()?;
    Some(out)
}

/// `epoch_millis(ts)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpochMillisFn;

impl FunctionDef for EpochMillisFn {
    fn name(&self) -> &'static str {
        "epoch_millis"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn dtype(&self, call: &FunctionCall) -> DiagResult<DataType> {
        expect_arg(call, 0, "a DATETIME", |t| t == DataType::Datetime)?;
        Ok(DataType::Long)
    }

    fn can_reduce_to_constant(&self, call: &FunctionCall) -> bool {
        call.args[0].can_reduce_to_constant()
    }

    fn reduce_to_constant(&self, call: &FunctionCall) -> DiagResult<Constant> {
        constant_arg(call, 0)?
            .cast(DataType::Long)
            .map_err(|err| fault(err, call.span))
    }
}
