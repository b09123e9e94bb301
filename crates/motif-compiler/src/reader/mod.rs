//! Canonical reader.
//!
//! Reads the text the Motif renderer writes back into trees: expressions
//! through [`read_expr`] and its typed variants, match patterns through
//! [`read_pattern`]. Statements are not read; they travel as JSON.
//!
//! Only canonical syntax is accepted. Keywords are uppercase, binary
//! operators come fully parenthesized by the renderer but the usual
//! precedence applies to hand-written text:
//!
//! ```text
//! or       := and (OR and)*
//! and      := not (AND not)*
//! not      := NOT not | cmp
//! cmp      := additive [cmpop additive | [NOT] BETWEEN additive AND additive
//!                      | IS [NOT] NULL | IN '(' list ')' | IN path]
//! additive := mult (('+' | '-') mult)*
//! mult     := unary (('*' | '/' | '%') unary)*
//! unary    := '-' unary | '+' unary | primary
//! ```

mod expr;
mod lexer;
mod pattern;


pub use expr::{read_bool, read_expr, read_value};
pub use pattern::read_pattern;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Span};

/// Nesting accepted by the reader before it gives up.
const MAX_NESTING: u32 = 256;

/// Text that is not canonical Motif.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {}..{}", .span.start, .span.end)]
pub struct ReadError {
    pub span: Span,
    pub message: String,
}

impl ReadError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::SyntaxDefect, self.span).message(&self.message)
    }
}

/// Token stream shared by the expression and pattern parsers.
struct Cursor<T> {
    tokens: Vec<(T, Span)>,
    pos: usize,
    len: usize,
    depth: u32,
}

impl<T: Copy + PartialEq> Cursor<T> {
    fn new(tokens: Vec<(T, Span)>, len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            len,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<T> {
        self.tokens.get(self.pos).map(|(token, _)| *token)
    }

    fn peek_at(&self, offset: usize) -> Option<T> {
        self.tokens.get(self.pos + offset).map(|(token, _)| *token)
    }

    fn advance(&mut self) -> Option<T> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the next token if it equals `token`.
    fn eat(&mut self, token: T) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map_or(Span::new(self.len, self.len), |(_, span)| *span)
    }

    fn start(&self) -> usize {
        self.current_span().start
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        let end = self
            .pos
            .checked_sub(1)
            .and_then(|last| self.tokens.get(last))
            .map_or(start, |(_, span)| span.end);
        Span::new(start, end.max(start))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn enter(&mut self) -> Result<(), ReadError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(ReadError::new(
                self.current_span(),
                format!("nesting deeper than {MAX_NESTING}"),
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}
