pub mod check;
pub mod explain;
pub mod fold;
pub mod loader;
pub mod pattern;
pub mod render;

use motif_compiler::{Diagnostic, DiagnosticPrinter, ReadError};
use motif_core::SchemaError;

/// Output form of `render` and `fold`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Motif,
    Json,
}

/// Anything a command can fail with before or during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Compile(#[from] motif_compiler::Error),

    #[error("{0}")]
    Pattern(Diagnostic),
}

impl From<ReadError> for CommandError {
    fn from(err: ReadError) -> Self {
        CommandError::Compile(err.into())
    }
}

impl CommandError {
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            CommandError::Compile(err) => err.diagnostic(),
            CommandError::Pattern(diagnostic) => Some(diagnostic.clone()),
            CommandError::Read { .. } | CommandError::Schema(_) => None,
        }
    }

    /// Report text: an annotated snippet when `source` is the text the
    /// diagnostic points into, a single line otherwise.
    pub fn render(&self, source: Option<&str>, color: bool) -> String {
        let Some(diagnostic) = self.diagnostic() else {
            return format!("error: {self}\n");
        };
        let printer = DiagnosticPrinter::new(&diagnostic).colored(color);
        let mut out = match source {
            Some(text) => printer.source(text).render(),
            None => printer.render(),
        };
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Print `result` to stdout, or the failure to stderr and exit with status 1.
pub fn finish(result: Result<String, CommandError>, source: Option<&str>, color: bool) {
    match result {
        Ok(out) => print!("{out}"),
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprint!("{}", err.render(source, color));
            std::process::exit(1);
        }
    }
}

/// Text followed by exactly one newline.
fn line(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
