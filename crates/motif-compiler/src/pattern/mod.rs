//! Funnel match patterns: a regular language over step ids.
//!
//! The tree lives in [`crate::ast::MatchDef`], text is read by
//! [`crate::reader::read_pattern`] and written by the Motif renderer. This
//! module settles capture flags and checks structure.

mod validate;

#[cfg(test)]
mod pattern_tests;

pub use validate::validate_pattern;

/// Upper bound of `*`, `+` and `{m,*}`.
pub const UNLIMITED: Option<i64> = None;
