#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core value model for the Motif query language.
//!
//! Three layers:
//! - **Type lattice**: [`DataType`] with widening rules ([`find_common_dtype`])
//! - **Constants**: [`Constant`] values with typed comparison, arithmetic and casts
//! - **Schema collaborator**: the [`Schema`] trait and [`Path`] handles used by the
//!   compiler to resolve dotted names against nested relations, plus a
//!   JSON-backed implementation ([`DynamicSchema`])

mod constant;
mod dtype;
mod error;
mod invariants;
pub mod schema;
pub mod utils;

#[cfg(test)]
mod constant_tests;
#[cfg(test)]
mod utils_tests;

pub use constant::{Constant, format_millis, parse_datetime_millis};
pub use dtype::{
    ArithmeticOp, ComparisonOp, DataType, arithmetic_dtype, find_common_dtype, has_common_dtype,
};
pub use error::{ConstantError, SchemaError};
pub use schema::{DynamicSchema, FieldInfo, Path, PathTarget, Schema};

/// Milliseconds in one second.
pub const MILLIS_PER_SECOND: i64 = 1_000;
/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
/// Milliseconds in one hour.
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;
/// Milliseconds in one week.
pub const MILLIS_PER_WEEK: i64 = 7 * MILLIS_PER_DAY;
