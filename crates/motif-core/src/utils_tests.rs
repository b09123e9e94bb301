use crate::utils::{quote, unquote};

#[test]
fn unquote_strips_matching_quotes() {
    assert_eq!(unquote("'abc'"), "abc");
    assert_eq!(unquote("\"abc\""), "abc");
    assert_eq!(unquote("''"), "");
}

#[test]
fn unquote_collapses_doubled_quote() {
    assert_eq!(unquote("'a''b'"), "a'b");
    assert_eq!(unquote("'''a'''"), "'a'");
    assert_eq!(unquote("\"say \"\"hi\"\"\""), "say \"hi\"");
}

#[test]
fn unquote_keeps_other_quote_kind() {
    assert_eq!(unquote("'a\"\"b'"), "a\"\"b");
}

#[test]
fn unquote_leaves_unbalanced_input() {
    assert_eq!(unquote("'abc"), "'abc");
    assert_eq!(unquote("'abc\""), "'abc\"");
    assert_eq!(unquote("x"), "x");
    assert_eq!(unquote(""), "");
}

#[test]
fn quote_doubles_single_quotes() {
    assert_eq!(quote("abc"), "'abc'");
    assert_eq!(quote("it's"), "'it''s'");
    assert_eq!(quote(""), "''");
}

#[test]
fn quote_then_unquote_is_identity() {
    for s in ["", "plain", "it's", "''", "mixed \"quotes\" 'here'"] {
        assert_eq!(unquote(&quote(s)), s);
    }
}
