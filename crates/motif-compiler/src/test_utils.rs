//! Shared fixtures: a `user -> sessions -> events` / `user -> segments`
//! schema and helpers compiling expression text against it.

use std::sync::Arc;

use indoc::indoc;
use motif_core::{DynamicSchema, Schema};

use crate::ast::{BoolExpr, Expr, Program};
use crate::diagnostics::Diagnostic;
use crate::reader::{read_bool, read_expr};
use crate::render::Motif;
use crate::session::{Optimized, Session};

pub const SCHEMA: &str = indoc! {r#"
    {
      "name": "user",
      "fields": [
        { "name": "userId", "type": "LONG" },
        { "name": "country", "type": "STRING" },
        { "name": "signup", "type": "DATETIME" }
      ],
      "relations": [
        {
          "name": "sessions",
          "fields": [
            { "name": "start", "type": "DATETIME", "ordinal": true },
            { "name": "duration", "type": "LONG" },
            { "name": "device", "type": "STRING" }
          ],
          "relations": [
            {
              "name": "events",
              "fields": [
                { "name": "ts", "type": "DATETIME", "ordinal": true },
                { "name": "eventId", "type": "LONG" },
                { "name": "name", "type": "STRING" },
                { "name": "price", "type": "DOUBLE" },
                { "name": "tags", "type": "STRING", "vector": true }
              ]
            }
          ]
        },
        {
          "name": "segments",
          "fields": [
            { "name": "segmentId", "type": "LONG" },
            { "name": "joined", "type": "DATETIME", "ordinal": true }
          ]
        }
      ]
    }
"#};

pub fn schema() -> Arc<dyn Schema> {
    Arc::new(DynamicSchema::from_json(SCHEMA).unwrap())
}

pub fn session() -> Session {
    Session::new(schema())
}

/// Read and compile one expression.
pub fn compile(text: &str) -> crate::Result<Expr> {
    session().compile_expr(read_expr(text)?)
}

/// Read and compile one predicate.
pub fn compile_bool(text: &str) -> crate::Result<BoolExpr> {
    match session().compile_expr(Expr::Bool(read_bool(text)?))? {
        Expr::Bool(predicate) => Ok(predicate),
        Expr::Value(value) => panic!("predicate compiled to a value: {value:?}"),
    }
}

/// Canonical text of the compiled expression.
pub fn folded(text: &str) -> String {
    compile(text).unwrap().generate_motif(0)
}

/// The diagnostic `text` fails with.
pub fn compile_error(text: &str) -> Diagnostic {
    let err = compile(text).unwrap_err();
    err.diagnostic()
        .unwrap_or_else(|| panic!("no diagnostic in {err}"))
}

pub fn compile_program(program: Program) -> crate::Result<Optimized> {
    session().compile(program)
}

pub fn program_error(program: Program) -> Diagnostic {
    let err = compile_program(program).unwrap_err();
    err.diagnostic()
        .unwrap_or_else(|| panic!("no diagnostic in {err}"))
}
