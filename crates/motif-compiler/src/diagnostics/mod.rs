//! Compile diagnostics.
//!
//! Passes stop at the first failure, so a diagnostic is a single value
//! carried inside [`crate::Error`]. It is built fluently at the failure site:
//!
//! ```ignore
//! return Err(Diagnostic::new(DiagnosticKind::UnresolvedReference, span)
//!     .message(name)
//!     .hint(format!("did you mean `{suggestion}`?")));
//! ```

mod message;
mod printer;

#[cfg(test)]
mod tests;

use std::fmt;

pub use message::DiagnosticKind;
pub use printer::DiagnosticPrinter;

/// Byte range in the text a node was read from. Synthesized nodes use `0..0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both.
    pub fn cover(self, other: Span) -> Span {
        if self.is_synthetic() {
            return other;
        }
        if other.is_synthetic() {
            return self;
        }
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn is_synthetic(&self) -> bool {
        self.start == 0 && self.end == 0
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub span: Span,
    pub message: String,
}

/// A terminal compile failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub message: String,
    pub hints: Vec<String>,
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Diagnostic with the kind's default message.
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        Self {
            kind,
            span,
            message: kind.fallback_message().to_string(),
            hints: kind.default_hint().map(str::to_string).into_iter().collect(),
            related: Vec::new(),
        }
    }

    /// Provide custom detail, rendered using the kind's template.
    pub fn message(mut self, detail: impl AsRef<str>) -> Self {
        self.message = self.kind.message(Some(detail.as_ref()));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn related_to(mut self, message: impl Into<String>, span: Span) -> Self {
        self.related.push(RelatedInfo {
            span,
            message: message.into(),
        });
        self
    }

    /// Attach a span when the failure was raised without one.
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_synthetic() {
            self.span = span;
        }
        self
    }

    pub fn printer<'d, 's>(&'d self) -> DiagnosticPrinter<'d, 's> {
        DiagnosticPrinter::new(self)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error at {}..{}: {}",
            self.span.start, self.span.end, self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message, related.span.start, related.span.end
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

pub type DiagResult<T> = std::result::Result<T, Diagnostic>;
