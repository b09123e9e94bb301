use motif_core::{ComparisonOp, Constant, DataType, find_common_dtype};

use super::{Arity, FunctionDef, constant_arg, expect_arg};
use crate::analyze::AnalysisCx;
use crate::analyze::fold::fault;
use crate::ast::FunctionCall;
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind};

/// Every argument after the first must unify with the first.
fn check_candidates(call: &FunctionCall) -> DiagResult<DataType> {
    let value = call.args[0].dtype()?;
    for candidate in &call.args[1..] {
        let dtype = candidate.dtype()?;
        if find_common_dtype(value, dtype).is_none() {
            return Err(
                Diagnostic::new(DiagnosticKind::TypeError, candidate.span()).message(format!(
                    "`{}` cannot compare {value} with {dtype}",
                    call.name
                )),
            );
        }
    }
    Ok(value)
}

fn constant_tail(call: &FunctionCall) -> DiagResult<Vec<Constant>> {
    (1..call.args.len())
        .map(|index| constant_arg(call, index))
        .collect()
}

/// `enum(x, v1, ..., vn)`: zero-based index of the first `vi` equal to `x`,
/// `-1` when none is.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumFn;

impl FunctionDef for EnumFn {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn arity(&self) -> Arity {
        Arity::AtLeast(2)
    }

    fn validate(&self, cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<()> {
        for arg in &mut call.args {
            arg.validate(cx)?;
        }
        constant_tail(call)?;
        Ok(())
    }

    fn dtype(&self, call: &FunctionCall) -> DiagResult<DataType> {
        check_candidates(call)?;
        Ok(DataType::Integer)
    }

    fn can_reduce_to_constant(&self, call: &FunctionCall) -> bool {
        call.args.iter().all(|arg| arg.can_reduce_to_constant())
    }

    fn reduce_to_constant(&self, call: &FunctionCall) -> DiagResult<Constant> {
        let value = constant_arg(call, 0)?;
        for (index, candidate) in constant_tail(call)?.iter().enumerate() {
            let equal = value
                .compare(ComparisonOp::Eq, candidate)
                .map_err(|err| fault(err, call.span))?;
            if equal {
                return Ok(Constant::integer_literal(index as i64));
            }
        }
        Ok(Constant::Integer(-1))
    }
}

/// `split(x, b1, ..., bn)`: number of boundaries `<= x`, so values below
/// `b1` land in bucket 0 and values at or above `bn` in bucket `n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitFn;

impl FunctionDef for SplitFn {
    fn name(&self) -> &'static str {
        "split"
    }

    fn arity(&self) -> Arity {
        Arity::AtLeast(2)
    }

    fn validate(&self, cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<()> {
        for arg in &mut call.args {
            arg.validate(cx)?;
        }
        let boundaries = constant_tail(call)?;
        for (index, pair) in boundaries.windows(2).enumerate() {
            let ascending = pair[0]
                .compare(ComparisonOp::Lt, &pair[1])
                .map_err(|err| fault(err, call.span))?;
            if !ascending {
                return Err(
                    Diagnostic::new(DiagnosticKind::TypeError, call.args[index + 2].span())
                        .message("boundaries of `split` must be strictly ascending"),
                );
            }
        }
        Ok(())
    }

    fn dtype(&self, call: &FunctionCall) -> DiagResult<DataType> {
        expect_arg(call, 0, "numeric or DATETIME", |t| {
            t.is_numeric() || t == DataType::Datetime
        })?;
        check_candidates(call)?;
        Ok(DataType::Integer)
    }

    fn can_reduce_to_constant(&self, call: &FunctionCall) -> bool {
        call.args.iter().all(|arg| arg.can_reduce_to_constant())
    }

    fn reduce_to_constant(&self, call: &FunctionCall) -> DiagResult<Constant> {
        let value = constant_arg(call, 0)?;
        if value.is_null() {
            return Ok(Constant::Null);
        }
        let mut bucket = 0;
        for boundary in constant_tail(call)? {
            if boundary
                .compare(ComparisonOp::Lte, &value)
                .map_err(|err| fault(err, call.span))?
            {
                bucket += 1;
            }
        }
        Ok(Constant::Integer(bucket))
    }
}
