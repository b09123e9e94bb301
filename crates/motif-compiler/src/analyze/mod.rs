//! Semantic passes over a read or hand-built tree.
//!
//! `bind` resolves names and fills defaults, `validate` type-checks, checks
//! evaluation axes and folds the values that must be literal, `optimize`
//! folds constants. Each pass stops at the first [`Diagnostic`].
//!
//! [`Diagnostic`]: crate::diagnostics::Diagnostic

pub mod axis;
mod bind;
mod context;
pub mod fold;
mod invariants;
mod limits;
mod optimize;
pub mod symbols;
mod typing;
pub mod utils;
mod validate;

#[cfg(test)]
mod symbols_tests;

pub use bind::bind_program;
pub use context::{AnalysisCx, Frame};
pub use limits::{check_depth, check_expr_depth};
pub use optimize::optimize_program;
pub use symbols::{Definition, ReferenceCycle, Symbols};
pub use typing::is_legal_cast;
pub use validate::validate_program;
