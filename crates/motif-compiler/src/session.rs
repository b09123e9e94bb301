//! Staged compilation facade.
//!
//! ```ignore
//! let optimized = Session::new(schema)
//!     .with_time_zone("Europe/Berlin")
//!     .bind(program)?
//!     .validate()?
//!     .optimize()?;
//! println!("{}", optimized.render());
//! ```
//!
//! Each stage consumes the previous one, so a tree that failed a pass cannot
//! be carried forward.

use std::sync::Arc;

use motif_core::Schema;

use crate::analyze::{
    AnalysisCx, bind_program, check_depth, check_expr_depth, optimize_program, validate_program,
};
use crate::ast::{Expr, Program};
use crate::config::{CompileConfig, GlobalContext};
use crate::functions::FunctionRegistry;
use crate::render::{Explain, Motif, to_json};
use crate::{Error, Result};

/// Compilation settings bound to one schema. Cheap to share between threads;
/// every compilation builds its own symbol table.
#[derive(Debug, Clone)]
pub struct Session {
    schema: Arc<dyn Schema>,
    config: CompileConfig,
    registry: Arc<FunctionRegistry>,
}

impl Session {
    pub fn new(schema: Arc<dyn Schema>) -> Self {
        Self {
            schema,
            config: CompileConfig::default(),
            registry: Arc::new(FunctionRegistry::builtin()),
        }
    }

    pub fn with_config(mut self, config: CompileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.config.default_time_zone = zone.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn with_fold_constants(mut self, fold: bool) -> Self {
        self.config.fold_constants = fold;
        self
    }

    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    pub fn schema(&self) -> &dyn Schema {
        self.schema.as_ref()
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    fn global(&self) -> Result<Arc<GlobalContext>> {
        GlobalContext::new(&self.config).map_err(Error::Bind)
    }

    fn cx<'a>(&'a self, global: &'a GlobalContext) -> AnalysisCx<'a> {
        AnalysisCx::new(self.schema.as_ref(), global, &self.registry)
    }

    #[tracing::instrument(skip_all, fields(statements = program.statements.len()))]
    pub fn bind(&self, mut program: Program) -> Result<Bound<'_>> {
        check_depth(&program, self.config.max_depth).map_err(Error::RecursionLimitExceeded)?;
        let global = self.global()?;
        bind_program(&mut program, &mut self.cx(&global)).map_err(Error::Bind)?;
        Ok(Bound {
            session: self,
            global,
            program,
        })
    }

    /// Bind, validate and optimize in one go.
    pub fn compile(&self, program: Program) -> Result<Optimized> {
        self.bind(program)?.validate()?.optimize()
    }

    /// Compile a single expression against the root relation.
    #[tracing::instrument(skip_all)]
    pub fn compile_expr(&self, mut expr: Expr) -> Result<Expr> {
        check_expr_depth(expr.as_ref(), self.config.max_depth)
            .map_err(Error::RecursionLimitExceeded)?;
        let global = self.global()?;
        expr.bind(&mut self.cx(&global)).map_err(Error::Bind)?;
        expr.validate(&mut self.cx(&global))
            .map_err(Error::Validate)?;
        expr.optimize(&mut self.cx(&global))
            .map_err(Error::Optimize)
    }
}

/// Names resolved, defaults filled.
#[derive(Debug)]
pub struct Bound<'s> {
    session: &'s Session,
    global: Arc<GlobalContext>,
    program: Program,
}

impl<'s> Bound<'s> {
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn validate(mut self) -> Result<Validated<'s>> {
        validate_program(&mut self.program, &mut self.session.cx(&self.global))
            .map_err(Error::Validate)?;
        Ok(Validated {
            session: self.session,
            global: self.global,
            program: self.program,
        })
    }
}

/// Types, axes and patterns checked; compile-time values folded.
#[derive(Debug)]
pub struct Validated<'s> {
    session: &'s Session,
    global: Arc<GlobalContext>,
    program: Program,
}

impl Validated<'_> {
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn optimize(self) -> Result<Optimized> {
        let program = optimize_program(self.program, &mut self.session.cx(&self.global))
            .map_err(Error::Optimize)?;
        Ok(Optimized { program })
    }
}

/// Final tree, read-only from here on.
#[derive(Debug, Clone, PartialEq)]
pub struct Optimized {
    pub program: Program,
}

impl Optimized {
    pub fn render(&self) -> String {
        self.program.generate_motif(0)
    }

    pub fn explain(&self) -> String {
        self.program.explain(0)
    }

    pub fn to_json(&self) -> Result<String> {
        to_json(&self.program)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
