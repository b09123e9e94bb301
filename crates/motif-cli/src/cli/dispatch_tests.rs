//! Tests for CLI dispatch logic.
//!
//! These tests verify:
//! 1. Session flags reach every program command
//! 2. Positional text may start with a hyphen
//! 3. Params extraction: correct fields are extracted from ArgMatches

use std::path::PathBuf;

use super::*;
use crate::cli::commands::{
    check_command, explain_command, fold_command, pattern_command, render_command,
};
use crate::commands::OutputFormat;

#[test]
fn check_extracts_session_flags() {
    let m = check_command()
        .try_get_matches_from([
            "check",
            "program.json",
            "--schema",
            "schema.json",
            "--config",
            "motif.json",
            "--time-zone",
            "Europe/Berlin",
            "--max-depth",
            "64",
            "--no-fold",
        ])
        .unwrap();
    let params = CheckParams::from_matches(&m);

    assert_eq!(params.program_path, PathBuf::from("program.json"));
    assert_eq!(params.session.schema, Some(PathBuf::from("schema.json")));
    assert_eq!(params.session.config, Some(PathBuf::from("motif.json")));
    assert_eq!(params.session.time_zone.as_deref(), Some("Europe/Berlin"));
    assert_eq!(params.session.max_depth, Some(64));
    assert!(params.session.no_fold);
}

#[test]
fn check_defaults() {
    let m = check_command()
        .try_get_matches_from(["check", "-"])
        .unwrap();
    let params = CheckParams::from_matches(&m);

    assert_eq!(params.program_path, PathBuf::from("-"));
    assert_eq!(params.session.schema, None);
    assert_eq!(params.session.max_depth, None);
    assert!(!params.session.no_fold);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn check_requires_program() {
    let result = check_command().try_get_matches_from(["check"]);
    assert!(result.is_err());
}

#[test]
fn max_depth_must_be_number() {
    let result =
        check_command().try_get_matches_from(["check", "p.json", "--max-depth", "deep"]);
    assert!(result.is_err());
}

#[test]
fn render_format_and_raw() {
    let m = render_command()
        .try_get_matches_from(["render", "p.json", "--format", "json", "--raw"])
        .unwrap();
    let params = RenderParams::from_matches(&m);
    assert_eq!(params.format, OutputFormat::Json);
    assert!(params.raw);

    let m = render_command()
        .try_get_matches_from(["render", "p.json"])
        .unwrap();
    let params = RenderParams::from_matches(&m);
    assert_eq!(params.format, OutputFormat::Motif);
    assert!(!params.raw);
}

#[test]
fn render_rejects_unknown_format() {
    let result = render_command().try_get_matches_from(["render", "p.json", "--format", "xml"]);
    assert!(result.is_err());
}

#[test]
fn explain_accepts_color() {
    let m = explain_command()
        .try_get_matches_from(["explain", "p.json", "--color", "never"])
        .unwrap();
    let params = ExplainParams::from_matches(&m);
    assert_eq!(params.color, ColorChoice::Never);
    assert!(!params.raw);
}

#[test]
fn fold_accepts_leading_hyphen() {
    let m = fold_command()
        .try_get_matches_from(["fold", "-5 + 1", "--explain"])
        .unwrap();
    let params = FoldParams::from_matches(&m);
    assert_eq!(params.expr, "-5 + 1");
    assert!(params.explain);
}

#[test]
fn pattern_steps_split_on_commas() {
    let m = pattern_command()
        .try_get_matches_from(["pattern", "1:(2|3)*", "--steps", "1,2,3"])
        .unwrap();
    let params = PatternParams::from_matches(&m);
    assert_eq!(params.pattern, "1:(2|3)*");
    assert_eq!(params.steps, Some(vec![1, 2, 3]));
}

#[test]
fn pattern_steps_may_be_negative() {
    let m = pattern_command()
        .try_get_matches_from(["pattern", "-1:1", "--steps", "-1,1"])
        .unwrap();
    let params = PatternParams::from_matches(&m);
    assert_eq!(params.pattern, "-1:1");
    assert_eq!(params.steps, Some(vec![-1, 1]));
}

#[test]
fn pattern_steps_optional() {
    let m = pattern_command()
        .try_get_matches_from(["pattern", "1"])
        .unwrap();
    assert_eq!(PatternParams::from_matches(&m).steps, None);
}

#[test]
fn pattern_has_no_session_flags() {
    let result = pattern_command().try_get_matches_from(["pattern", "1", "--schema", "s.json"]);
    assert!(result.is_err());
}

#[test]
fn verbose_is_global() {
    let m = build_cli()
        .try_get_matches_from(["motif", "fold", "1", "-vv"])
        .unwrap();
    assert_eq!(m.get_count("verbose"), 2);
}

#[test]
fn subcommand_required() {
    assert!(build_cli().try_get_matches_from(["motif"]).is_err());
}
