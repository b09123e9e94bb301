use crate::ast::MatchDef;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::reader::read_pattern;
use crate::render::Motif;

use super::validate_pattern;

const STEPS: &[i64] = &[1, 2, 3, 4];

fn settle(text: &str) -> Result<MatchDef, Diagnostic> {
    let mut pattern = read_pattern(text).unwrap();
    validate_pattern(&mut pattern, STEPS)?;
    Ok(pattern)
}

fn error(text: &str) -> Diagnostic {
    let err = settle(text).unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::PatternStructureError, "{err}");
    err
}

#[test]
fn plain_sequence_captures() {
    let pattern = settle("1:2:3").unwrap();
    assert!(pattern.capturing());
}

#[test]
fn non_capturing_middle_is_accepted() {
    let pattern = settle("1 : ((?:1:2) | (?:1:2)) : 2").unwrap();
    let MatchDef::List(sequence) = &pattern else {
        panic!("expected a sequence, got {pattern:?}");
    };
    assert!(sequence.capturing);
    assert!(!sequence.items[1].capturing());
    assert!(sequence.items[0].capturing());
    assert!(sequence.items[2].capturing());
}

#[test]
fn mixed_alternatives_rejected() {
    let err = error("(1 | (?:2:3))");
    assert_eq!(
        err.message,
        "invalid match pattern: alternatives mix capturing and non-capturing patterns"
    );
    assert_eq!(err.hints, vec!["mark every alternative `(?: ...)` or none"]);
}

#[test]
fn non_capturing_top_level_rejected() {
    let err = error("(?:1:2)");
    assert_eq!(
        err.message,
        "invalid match pattern: the top level of a match must capture"
    );
}

#[test]
fn non_capturing_edges_rejected() {
    let err = error("(?:1):2");
    assert_eq!(
        err.message,
        "invalid match pattern: a capturing sequence cannot start or end with a non-capturing pattern"
    );
    error("1:(?:2)");
}

#[test]
fn unknown_step_lists_defined_ones() {
    let err = error("1:7");
    assert_eq!(err.message, "invalid match pattern: step 7 is not defined");
    assert_eq!(err.hints, vec!["defined steps: 1, 2, 3, 4"]);
}

#[test]
fn bracket_members_must_exist() {
    settle("1:^[2 3]:4").unwrap();
    let err = error("1:[2 9]");
    assert_eq!(err.message, "invalid match pattern: step 9 is not defined");
}

#[test]
fn repeat_bounds_checked() {
    let err = error("1{3,2}");
    assert_eq!(
        err.message,
        "invalid match pattern: repeat maximum 2 is below minimum 3"
    );
    let err = error("1{-1,2}");
    assert_eq!(err.message, "invalid match pattern: repeat minimum -1 is negative");
}

#[test]
fn repeat_takes_child_capture() {
    let pattern = settle("1:(?:2)*:3").unwrap();
    let MatchDef::List(sequence) = &pattern else {
        panic!("expected a sequence, got {pattern:?}");
    };
    assert!(matches!(&sequence.items[1], MatchDef::Repeat(r) if !r.capturing));
}

#[test]
fn builder_non_capturing_repeat_over_capturing_child() {
    let mut repeat = MatchDef::repeat(MatchDef::step(2), 0, None);
    repeat.set_capturing(false);
    let mut pattern = MatchDef::seq(vec![MatchDef::step(1), repeat, MatchDef::step(3)]);
    let err = validate_pattern(&mut pattern, STEPS).unwrap_err();
    assert_eq!(
        err.message,
        "invalid match pattern: non-capturing repeat around a capturing pattern"
    );
}

#[test]
fn builder_empty_list_rejected() {
    let mut pattern = MatchDef::alt(vec![]);
    let err = validate_pattern(&mut pattern, STEPS).unwrap_err();
    assert_eq!(err.message, "invalid match pattern: empty pattern list");
}

#[test]
fn builder_empty_bracket_rejected() {
    let mut pattern = MatchDef::bracket(false, vec![]);
    let err = validate_pattern(&mut pattern, STEPS).unwrap_err();
    assert_eq!(err.message, "invalid match pattern: bracket set lists no steps");
}

#[test]
fn rendered_patterns_read_back() {
    let texts = [
        "1:2:3",
        "1:(2 | 3)*:4",
        "1:(?:(1:2) | (1:2)):2",
        "1:^[2 3]{2,*}:4",
        "(1 | 2):3?",
        "1:2{3}:4",
        "1:(?:2)+:3",
    ];
    for text in texts {
        let pattern = settle(text).unwrap();
        let rendered = pattern.generate_motif(0);
        assert_eq!(rendered, text);
        let again = settle(&rendered).unwrap();
        assert_eq!(again.generate_motif(0), rendered);
    }
}

#[test]
fn non_capturing_alternatives_render_inside_one_group() {
    let pattern = settle("1 : ((?:1:2) | (?:1:2)) : 2").unwrap();
    assert_eq!(pattern.generate_motif(0), "1:(?:(1:2) | (1:2)):2");
}
