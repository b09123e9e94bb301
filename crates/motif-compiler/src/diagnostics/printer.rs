//! Builder-pattern printer for rendering a diagnostic against its source.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::{Diagnostic, Span};

/// Builder for rendering a diagnostic with various options.
pub struct DiagnosticPrinter<'d, 's> {
    diagnostic: &'d Diagnostic,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticPrinter<'d, 's> {
    pub fn new(diagnostic: &'d Diagnostic) -> Self {
        Self {
            diagnostic,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.format(&mut out);
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let diag = self.diagnostic;
        let Some(source) = self.source.filter(|s| diag.span.end <= s.len()) else {
            return write!(w, "{diag}");
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        let mut snippet = Snippet::source(source).line_start(1).annotation(
            AnnotationKind::Primary
                .span(adjust_range(diag.span, source.len()))
                .label(&diag.message),
        );
        if let Some(p) = self.path {
            snippet = snippet.path(p);
        }
        for related in &diag.related {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(adjust_range(related.span, source.len()))
                    .label(&related.message),
            );
        }

        let mut group = Level::ERROR.primary_title(&diag.message).element(snippet);
        for hint in &diag.hints {
            group = group.element(Level::HELP.message(hint));
        }

        let report: Vec<Group> = vec![group];
        write!(w, "{}", renderer.render(&report))
    }
}

fn adjust_range(span: Span, limit: usize) -> std::ops::Range<usize> {
    if span.start == span.end {
        return span.start..(span.start + 1).min(limit);
    }
    span.range()
}
