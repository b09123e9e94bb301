//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::Path;

pub(crate) fn ensure_field_has_relation(segments: &[String]) {
    assert!(
        segments.len() >= 2,
        "Path: field `{}` must live inside a relation",
        segments.join(".")
    );
}

impl Path {
    pub(crate) fn ensure_structure(&self) -> Path {
        self.structure_or_none()
            .unwrap_or_else(|| panic!("Path: `{self}` has no enclosing relation"))
    }
}
