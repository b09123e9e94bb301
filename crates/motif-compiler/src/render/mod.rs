//! Output forms of a tree.
//!
//! - Motif text ([`Motif`]): canonical and readable back through
//!   [`crate::reader`] for expressions and patterns
//! - explain dump ([`Explain`]): indented debug tree, not readable back
//! - JSON ([`to_json`] / [`from_json`]): the structured form, binding
//!   results excluded

mod explain;
mod json;
mod motif;

#[cfg(test)]
mod render_tests;

pub use explain::Explain;
pub use json::{from_json, to_json};
pub use motif::{Motif, constant_text};

/// Two spaces per level.
fn indent(level: usize) -> String {
    "  ".repeat(level)
}
