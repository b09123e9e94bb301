use motif_core::{DataType, Path};

use super::symbols::{Definition, Symbols};
use crate::diagnostics::Span;

fn parameter(dtype: DataType) -> Definition {
    Definition::Parameter {
        dtype,
        default: None,
    }
}

#[test]
fn inner_scope_shadows_outer() {
    let mut symbols = Symbols::new(Path::relation(["user"]));
    assert!(symbols.add_current_scope_definition("x", Definition::View));

    symbols.with_scope(None, |symbols| {
        assert!(symbols.add_current_scope_definition("x", parameter(DataType::Long)));
        assert!(matches!(
            symbols.get_definition("x"),
            Some(Definition::Parameter { .. })
        ));
    });

    assert!(matches!(symbols.get_definition("x"), Some(Definition::View)));
}

#[test]
fn duplicate_in_same_scope_rejected() {
    let mut symbols = Symbols::new(Path::relation(["user"]));
    assert!(symbols.add_current_scope_definition("f", Definition::Query));
    assert!(!symbols.add_current_scope_definition("f", Definition::View));
    assert!(matches!(symbols.get_definition("f"), Some(Definition::Query)));
}

#[test]
fn parent_scope_definition_outlives_scope() {
    let mut symbols = Symbols::new(Path::relation(["user"]));
    symbols.with_scope(None, |symbols| {
        assert!(symbols.add_parent_scope_definition("kept", Definition::View));
        assert!(symbols.add_current_scope_definition("dropped", Definition::View));
    });
    assert!(symbols.get_definition("kept").is_some());
    assert!(symbols.get_definition("dropped").is_none());
}

#[test]
fn scope_root_defaults_to_enclosing() {
    let mut symbols = Symbols::new(Path::relation(["user"]));
    symbols.with_scope(Some(Path::relation(["user", "sessions"])), |symbols| {
        assert_eq!(symbols.current_root_path().dotted(), "user.sessions");
        symbols.with_scope(None, |symbols| {
            assert_eq!(symbols.depth(), 3);
            assert_eq!(symbols.current_root_path().dotted(), "user.sessions");
        });
    });
    assert_eq!(symbols.current_root_path().dotted(), "user");
}

#[test]
fn names_innermost_first() {
    let mut symbols = Symbols::new(Path::relation(["user"]));
    symbols.add_current_scope_definition("outer", Definition::View);
    symbols.push_scope(None);
    symbols.add_current_scope_definition("inner", parameter(DataType::String));

    let names: Vec<_> = symbols.names().collect();
    assert_eq!(names, vec!["inner", "outer"]);

    let parameters = symbols.names_where(|d| matches!(d, Definition::Parameter { .. }));
    assert_eq!(parameters, vec!["inner"]);
    symbols.pop_scope();
}

#[test]
#[should_panic(expected = "the global scope cannot be popped")]
fn global_scope_cannot_be_popped() {
    let mut symbols = Symbols::new(Path::relation(["user"]));
    symbols.pop_scope();
}

#[test]
fn reference_cycle_found_through_chain() {
    let mut symbols = Symbols::new(Path::relation(["user"]));
    symbols.add_reference("a", "b", Span::new(1, 2));
    symbols.add_reference("b", "c", Span::new(3, 4));
    assert!(symbols.reference_cycle().is_none());

    symbols.add_reference("c", "b", Span::new(5, 6));
    let cycle = symbols.reference_cycle().unwrap();
    assert_eq!(cycle.names, vec!["b", "c", "b"]);
    assert_eq!(cycle.span, Span::new(5, 6));
}
