//! Schema collaborator: resolves dotted names to [`Path`] handles.
//!
//! The compiler only talks to the [`Schema`] trait. [`DynamicSchema`] is the
//! bundled implementation, loaded from a nested JSON relation description.

mod dynamic;
mod path;

#[cfg(test)]
mod dynamic_tests;

use std::fmt;

pub use dynamic::{DynamicSchema, FieldDef, RelationDef};
pub use path::{FieldInfo, Path, PathTarget};

use crate::SchemaError;

/// Read-only view of the nested data model a program runs against.
///
/// Relations nest: the root relation (e.g. `user`) contains child relations
/// (`user.sessions`), which contain their own (`user.sessions.events`).
pub trait Schema: fmt::Debug + Send + Sync {
    /// The outermost relation.
    fn root(&self) -> Path;

    /// Resolve an absolute (`user.sessions.events.eventId`) or relation-prefixed
    /// (`events.eventId`) name.
    fn resolve(&self, name: &str) -> Result<Path, SchemaError>;

    /// The field ordering rows of `structure` in time, if it has one.
    fn ordinal_field(&self, structure: &Path) -> Option<Path>;

    /// Every absolute dotted name, used for "did you mean" hints.
    fn known_paths(&self) -> Vec<String>;
}
