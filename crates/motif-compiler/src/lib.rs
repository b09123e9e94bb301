//! Motif compiler front end.
//!
//! Trees come from the builder API on [`ast`], from JSON, or from canonical
//! text through [`reader`]. A [`Session`] runs them through bind, validate
//! and optimize against a [`motif_core::Schema`].
//!
//! # Example
//!
//! ```ignore
//! use motif_compiler::{Session, reader};
//!
//! let expr = reader::read_expr("(5999 % 34) == 0")?;
//! let folded = Session::new(schema).compile_expr(expr)?;
//! assert_eq!(folded.generate_motif(0), "FALSE");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod functions;
pub mod pattern;
pub mod reader;
pub mod render;
pub mod session;

#[cfg(test)]
pub mod test_utils;

pub use config::{CompileConfig, GlobalContext};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticPrinter, Span};
pub use functions::{FunctionDef, FunctionRegistry};
pub use reader::ReadError;
pub use render::{Explain, Motif};
pub use session::{Bound, Optimized, Session, Validated};

/// Compilation failure, tagged with the stage that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("bind failed: {0}")]
    Bind(Diagnostic),

    #[error("validation failed: {0}")]
    Validate(Diagnostic),

    #[error("optimization failed: {0}")]
    Optimize(Diagnostic),

    /// Input nested deeper than the configured limit.
    #[error("recursion limit exceeded: {0}")]
    RecursionLimitExceeded(Diagnostic),

    #[error("read failed: {0}")]
    Read(#[from] ReadError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] motif_core::SchemaError),
}

impl Error {
    /// The diagnostic behind a compile failure, if any.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Error::Bind(d)
            | Error::Validate(d)
            | Error::Optimize(d)
            | Error::RecursionLimitExceeded(d) => Some(d.clone()),
            Error::Read(err) => Some(err.diagnostic()),
            Error::Json(_) | Error::Schema(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
