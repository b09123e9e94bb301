use motif_core::{DataType, Path};

use super::{Arity, CallState, FunctionDef, call_state, unbound};
use crate::analyze::AnalysisCx;
use crate::ast::FunctionCall;
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind};

fn bind_target(cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<Path> {
    call.args[0].bind(cx)?;
    let arg = &call.args[0];
    arg.as_resolved_path().cloned().ok_or_else(|| {
        Diagnostic::new(DiagnosticKind::TypeError, arg.span())
            .message(format!("`{}` expects a schema path", call.name))
    })
}

fn target(call: &FunctionCall) -> DiagResult<&Path> {
    match call_state(call) {
        Some(CallState::Target(path)) => Ok(path),
        _ => Err(unbound(call)),
    }
}

/// `frequency(path)`: how often the value at `path` occurs in its relation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyFn;

impl FunctionDef for FrequencyFn {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn bind(&self, cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<CallState> {
        bind_target(cx, call).map(CallState::Target)
    }

    fn dtype(&self, call: &FunctionCall) -> DiagResult<DataType> {
        target(call)?;
        Ok(DataType::Long)
    }

    fn lowest_evaluation_point(&self, call: &FunctionCall) -> DiagResult<Option<Path>> {
        Ok(Some(target(call)?.structure()))
    }
}

/// `size(path)`: element count of a relation or vector field, known one
/// level above it.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeFn;

impl FunctionDef for SizeFn {
    fn name(&self) -> &'static str {
        "size"
    }

    fn arity(&self) -> Arity {
        Arity::Exact(1)
    }

    fn bind(&self, cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<CallState> {
        let path = bind_target(cx, call)?;
        if !path.is_relation() && !path.is_vector() {
            return Err(
                Diagnostic::new(DiagnosticKind::TypeError, call.args[0].span()).message(format!(
                    "`size` needs a relation or vector field, `{path}` is a scalar"
                )),
            );
        }
        Ok(CallState::Target(path))
    }

    fn dtype(&self, call: &FunctionCall) -> DiagResult<DataType> {
        target(call)?;
        Ok(DataType::Integer)
    }

    fn lowest_evaluation_point(&self, call: &FunctionCall) -> DiagResult<Option<Path>> {
        let path = target(call)?;
        match path.parent_structure() {
            Some(parent) => Ok(Some(parent)),
            None => Err(Diagnostic::new(DiagnosticKind::ScopeAxisError, call.span)
                .message(format!("the size of root relation `{path}` has no evaluation point"))),
        }
    }
}
