//! Function extension registry.
//!
//! A function is a shared, stateless [`FunctionDef`]. Everything learned
//! about one particular call (a resolved zone, a target path, a referenced
//! statement) is kept in the call's [`CallContext`], never on the definition.

mod bucket;
mod datetime;
mod reference;
mod structure;

#[cfg(test)]
mod functions_tests;

use std::fmt;
use std::sync::Arc;

use chrono_tz::Tz;
use indexmap::IndexMap;
use motif_core::{Constant, DataType, Path};

use crate::analyze::AnalysisCx;
use crate::analyze::axis;
use crate::ast::{FunctionCall, ValueExpr};
use crate::diagnostics::{DiagResult, Diagnostic, DiagnosticKind};

pub use bucket::{EnumFn, SplitFn};
pub use datetime::{EpochMillisFn, FormatDatetimeFn, ParseDatetimeFn};
pub use reference::{ReferenceFn, ReferenceKind};
pub use structure::{FrequencyFn, SizeFn};

/// Accepted argument counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Between(usize, usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::Between(min, max) => (min..=max).contains(&count),
            Arity::AtLeast(min) => count >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        match *self {
            Arity::Exact(n) => write!(f, "{n} argument{}", plural(n)),
            Arity::Between(min, max) => write!(f, "{min} to {max} arguments"),
            Arity::AtLeast(n) => write!(f, "at least {n} argument{}", plural(n)),
        }
    }
}

/// What bind learned about one call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallState {
    Plain,
    /// Zone used to render or bucket timestamps.
    Zone(Tz),
    /// Schema path the call describes.
    Target(Path),
    /// Statement the call introspects; such calls evaluate at `root`.
    Referent { name: String, root: Path },
}

/// Binding of a call site to its definition.
#[derive(Clone)]
pub struct CallContext {
    pub function: Arc<dyn FunctionDef>,
    pub state: CallState,
}

impl fmt::Debug for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("function", &self.function.name())
            .field("state", &self.state)
            .finish()
    }
}

impl PartialEq for CallContext {
    fn eq(&self, other: &Self) -> bool {
        self.function.name() == other.function.name() && self.state == other.state
    }
}

/// A callable known to the compiler.
///
/// Every hook receives the call node; per-call state is in `call.context`.
/// Defaults treat the function as an opaque runtime computation over its
/// arguments.
pub trait FunctionDef: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn arity(&self) -> Arity;

    fn bind(&self, cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<CallState> {
        for arg in &mut call.args {
            arg.bind(cx)?;
        }
        Ok(CallState::Plain)
    }

    fn validate(&self, cx: &mut AnalysisCx<'_>, call: &mut FunctionCall) -> DiagResult<()> {
        for arg in &mut call.args {
            arg.validate(cx)?;
        }
        Ok(())
    }

    fn dtype(&self, call: &FunctionCall) -> DiagResult<DataType>;

    fn lowest_evaluation_point(&self, call: &FunctionCall) -> DiagResult<Option<Path>> {
        axis::combine(
            call.args.iter().map(ValueExpr::lowest_evaluation_point),
            call.span,
        )
    }

    fn can_reduce_to_constant(&self, _call: &FunctionCall) -> bool {
        false
    }

    fn reduce_to_constant(&self, call: &FunctionCall) -> DiagResult<Constant> {
        Err(not_constant(call))
    }

    fn optimize(&self, cx: &mut AnalysisCx<'_>, mut call: FunctionCall) -> DiagResult<ValueExpr> {
        call.args = call
            .args
            .into_iter()
            .map(|arg| arg.optimize(cx))
            .collect::<DiagResult<_>>()?;
        Ok(ValueExpr::FunctionCall(call))
    }
}

/// Name-keyed table of function definitions.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<&'static str, Arc<dyn FunctionDef>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in function.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(ParseDatetimeFn)
            .register(FormatDatetimeFn)
            .register(EpochMillisFn)
            .register(EnumFn)
            .register(SplitFn)
            .register(FrequencyFn)
            .register(SizeFn);
        for kind in ReferenceKind::ALL {
            registry.register(ReferenceFn::new(kind));
        }
        registry
    }

    /// Add `function`, replacing any definition with the same name.
    pub fn register(&mut self, function: impl FunctionDef + 'static) -> &mut Self {
        self.functions.insert(function.name(), Arc::new(function));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FunctionDef>> {
        self.functions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn FunctionDef>> {
        self.functions.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

pub(crate) fn call_state(call: &FunctionCall) -> Option<&CallState> {
    call.context.as_ref().map(|context| &context.state)
}

/// Type of argument `index`, checked against `accepts`.
pub(crate) fn expect_arg(
    call: &FunctionCall,
    index: usize,
    expected: &str,
    accepts: impl Fn(DataType) -> bool,
) -> DiagResult<DataType> {
    let arg = &call.args[index];
    let dtype = arg.dtype()?;
    if dtype == DataType::Null || accepts(dtype) {
        return Ok(dtype);
    }
    Err(Diagnostic::new(DiagnosticKind::TypeError, arg.span()).message(format!(
        "argument {} of `{}` must be {expected}, found {dtype}",
        index + 1,
        call.name
    )))
}

/// Fold argument `index` or fail with `ConstantRequiredError`.
pub(crate) fn constant_arg(call: &FunctionCall, index: usize) -> DiagResult<Constant> {
    let arg = &call.args[index];
    if !arg.can_reduce_to_constant() {
        return Err(
            Diagnostic::new(DiagnosticKind::ConstantRequiredError, arg.span()).message(format!(
                "argument {} of `{}` must be a constant",
                index + 1,
                call.name
            )),
        );
    }
    arg.reduce_to_constant()
}

pub(crate) fn not_constant(call: &FunctionCall) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::ConstantRequiredError, call.span)
        .message(format!("`{}` cannot be evaluated before runtime", call.name))
}

pub(crate) fn unbound(call: &FunctionCall) -> Diagnostic {
    Diagnostic::new(DiagnosticKind::UnresolvedReference, call.span).message(&call.name)
}
