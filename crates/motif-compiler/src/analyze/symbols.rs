//! Scoped name table.
//!
//! The bottom scope holds registered functions and every statement name of
//! the program. Each statement binds inside its own scope holding its
//! parameters. Lookups search innermost first.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use motif_core::{Constant, DataType, Path};

use super::invariants::{ensure_scope_poppable, ensure_scope_stack};
use crate::diagnostics::Span;
use crate::functions::FunctionDef;

#[derive(Debug, Clone)]
pub enum Definition {
    Parameter {
        dtype: DataType,
        default: Option<Constant>,
    },
    Function(Arc<dyn FunctionDef>),
    Funnel {
        steps: Vec<i64>,
    },
    Segment {
        names: Vec<String>,
    },
    View,
    Query,
}

impl Definition {
    pub fn describe(&self) -> &'static str {
        match self {
            Definition::Parameter { .. } => "parameter",
            Definition::Function(_) => "function",
            Definition::Funnel { .. } => "funnel",
            Definition::Segment { .. } => "segment",
            Definition::View => "view",
            Definition::Query => "query",
        }
    }
}

#[derive(Debug)]
struct Scope {
    root: Path,
    definitions: IndexMap<String, Definition>,
}

impl Scope {
    fn new(root: Path) -> Self {
        Self {
            root,
            definitions: IndexMap::new(),
        }
    }
}

/// A reference cycle between statements: the names along it, ending where
/// it started, and the span of the reference closing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCycle {
    pub names: Vec<String>,
    pub span: Span,
}

#[derive(Debug)]
pub struct Symbols {
    scopes: Vec<Scope>,
    /// Statement name to the statements it refers to.
    references: IndexMap<String, IndexMap<String, Span>>,
}

impl Symbols {
    pub fn new(root: Path) -> Self {
        Self {
            scopes: vec![Scope::new(root)],
            references: IndexMap::new(),
        }
    }

    fn current(&self) -> &Scope {
        self.ensure_bottom_scope();
        &self.scopes[self.scopes.len() - 1]
    }

    /// Relation unqualified aggregation scopes default to.
    pub fn current_root_path(&self) -> &Path {
        &self.current().root
    }

    pub fn get_definition(&self, name: &str) -> Option<&Definition> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.definitions.get(name))
    }

    /// Define `name` in the innermost scope.
    ///
    /// Returns `false` and leaves the table untouched when that scope
    /// already defines the name.
    pub fn add_current_scope_definition(
        &mut self,
        name: impl Into<String>,
        definition: Definition,
    ) -> bool {
        let index = self.scopes.len() - 1;
        self.define_at(index, name.into(), definition)
    }

    /// Define `name` one scope below the innermost, so it outlives the
    /// current scope. With a single scope this is the current scope.
    pub fn add_parent_scope_definition(
        &mut self,
        name: impl Into<String>,
        definition: Definition,
    ) -> bool {
        let index = self.scopes.len().saturating_sub(2);
        self.define_at(index, name.into(), definition)
    }

    fn define_at(&mut self, index: usize, name: String, definition: Definition) -> bool {
        let scope = &mut self.scopes[index];
        if scope.definitions.contains_key(&name) {
            return false;
        }
        scope.definitions.insert(name, definition);
        true
    }

    /// Open a scope. `root` defaults to the enclosing scope's root.
    pub fn push_scope(&mut self, root: Option<Path>) {
        let root = root.unwrap_or_else(|| self.current_root_path().clone());
        self.scopes.push(Scope::new(root));
    }

    pub fn pop_scope(&mut self) {
        ensure_scope_poppable(self.scopes.len());
        self.scopes.pop();
    }

    pub fn with_scope<R>(&mut self, root: Option<Path>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.push_scope(root);
        let result = f(self);
        self.pop_scope();
        result
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Every visible name, innermost scope first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.definitions.keys().map(String::as_str))
    }

    /// Visible names whose definition satisfies `filter`.
    pub fn names_where(&self, filter: impl Fn(&Definition) -> bool) -> Vec<&str> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.definitions.iter())
            .filter(|(_, definition)| filter(definition))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Record that statement `from` refers to statement `to` at `span`.
    /// The first span recorded for an edge is kept.
    pub fn add_reference(&mut self, from: impl Into<String>, to: impl Into<String>, span: Span) {
        self.references
            .entry(from.into())
            .or_default()
            .entry(to.into())
            .or_insert(span);
    }

    /// First cycle among recorded references, searched in recording order.
    pub fn reference_cycle(&self) -> Option<ReferenceCycle> {
        let mut done = IndexSet::new();
        let mut trail = Vec::new();
        self.references
            .keys()
            .find_map(|name| self.visit_references(name, &mut trail, &mut done))
    }

    fn visit_references<'a>(
        &'a self,
        name: &'a str,
        trail: &mut Vec<&'a str>,
        done: &mut IndexSet<&'a str>,
    ) -> Option<ReferenceCycle> {
        if done.contains(name) {
            return None;
        }
        trail.push(name);
        for (target, span) in self.references.get(name).into_iter().flatten() {
            if let Some(start) = trail.iter().position(|seen| *seen == target.as_str()) {
                let mut names: Vec<String> = trail[start..].iter().map(|n| n.to_string()).collect();
                names.push(target.clone());
                return Some(ReferenceCycle { names, span: *span });
            }
            if let Some(cycle) = self.visit_references(target, trail, done) {
                return Some(cycle);
            }
        }
        trail.pop();
        done.insert(name);
        None
    }

    fn ensure_bottom_scope(&self) {
        ensure_scope_stack(self.scopes.len());
    }
}
