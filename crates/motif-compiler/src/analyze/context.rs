//! Pass context: schema, global settings, symbols and the ancestor stack.

use motif_core::{Path, Schema};

use super::symbols::{Definition, Symbols};
use crate::config::GlobalContext;
use crate::functions::FunctionRegistry;

/// Enclosing construct of the node being analyzed.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Statement { name: Option<String> },
    Funnel { steps: Vec<i64>, sources: Vec<Path> },
    Step { id: i64 },
}

pub struct AnalysisCx<'a> {
    schema: &'a dyn Schema,
    global: &'a GlobalContext,
    symbols: Symbols,
    frames: Vec<Frame>,
}

impl<'a> AnalysisCx<'a> {
    /// Fresh context with every function of `registry` in the global scope.
    pub fn new(
        schema: &'a dyn Schema,
        global: &'a GlobalContext,
        registry: &FunctionRegistry,
    ) -> Self {
        let mut symbols = Symbols::new(schema.root());
        for function in registry.iter() {
            symbols.add_current_scope_definition(
                function.name(),
                Definition::Function(function.clone()),
            );
        }
        Self {
            schema,
            global,
            symbols,
            frames: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'a dyn Schema {
        self.schema
    }

    pub fn global(&self) -> &'a GlobalContext {
        self.global
    }

    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut Symbols {
        &mut self.symbols
    }

    /// Run `f` with `frame` pushed; the frame is popped before returning.
    pub fn with_frame<R>(&mut self, frame: Frame, f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.frames.len();
        self.frames.push(frame);
        let result = f(self);
        self.frames.truncate(depth);
        result
    }

    /// Run `f` inside a fresh symbol scope rooted at `root` (or the current root).
    pub fn with_scope<R>(&mut self, root: Option<Path>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.symbols.push_scope(root);
        let result = f(self);
        self.symbols.pop_scope();
        result
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn current_statement(&self) -> Option<&str> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Statement { name } => name.as_deref(),
            _ => None,
        })
    }

    /// Step ids and sources of the innermost funnel.
    pub fn enclosing_funnel(&self) -> Option<(&[i64], &[Path])> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Funnel { steps, sources } => Some((steps.as_slice(), sources.as_slice())),
            _ => None,
        })
    }

    pub fn current_step(&self) -> Option<i64> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Step { id } => Some(*id),
            _ => None,
        })
    }
}
