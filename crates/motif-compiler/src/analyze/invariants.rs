//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

pub(super) fn ensure_scope_poppable(depth: usize) {
    assert!(depth > 1, "symbols: the global scope cannot be popped");
}

pub(super) fn ensure_scope_stack(depth: usize) {
    assert!(depth > 0, "symbols: scope stack is empty");
}
