use serde::{Deserialize, Serialize};

use super::ValueExpr;
use crate::diagnostics::Span;
use crate::functions::CallContext;

/// Call of a registered function, e.g. `size(sessions)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(skip)]
    pub span: Span,
    pub name: String,
    pub args: Vec<ValueExpr>,
    /// Per-call binding state, filled at bind.
    #[serde(skip)]
    pub context: Option<CallContext>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Vec<ValueExpr>) -> Self {
        Self {
            span: args
                .iter()
                .fold(Span::default(), |span, arg| span.cover(arg.span())),
            name: name.into(),
            args,
            context: None,
        }
    }
}
