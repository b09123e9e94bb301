//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so the program commands can share one
//! definition of the session flags.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Program JSON file (positional, "-" for stdin).
pub fn program_path_arg() -> Arg {
    Arg::new("program_path")
        .value_name("PROGRAM")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Program JSON file (use \"-\" for stdin)")
}

/// Expression text (positional).
pub fn expr_arg() -> Arg {
    Arg::new("expr")
        .value_name("EXPR")
        .required(true)
        .allow_hyphen_values(true)
        .help("Expression in canonical Motif text")
}

/// Match pattern text (positional).
pub fn pattern_arg() -> Arg {
    Arg::new("pattern")
        .value_name("PATTERN")
        .required(true)
        .allow_hyphen_values(true)
        .help("Funnel match pattern, e.g. '1:(2|3)*:4'")
}

/// Schema description (--schema).
pub fn schema_arg() -> Arg {
    Arg::new("schema")
        .long("schema")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Schema JSON file (default: an empty `root` relation)")
}

/// Compile settings file (--config).
pub fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Compile settings JSON file")
}

/// Default time zone override (--time-zone).
pub fn time_zone_arg() -> Arg {
    Arg::new("time_zone")
        .long("time-zone")
        .value_name("ZONE")
        .help("IANA time zone for date-time functions without an explicit zone")
}

/// Nesting limit override (--max-depth).
pub fn max_depth_arg() -> Arg {
    Arg::new("max_depth")
        .long("max-depth")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Deepest expression nesting accepted")
}

/// Keep foldable subtrees (--no-fold).
pub fn no_fold_arg() -> Arg {
    Arg::new("no_fold")
        .long("no-fold")
        .action(ArgAction::SetTrue)
        .help("Check constant positions but keep foldable subtrees")
}

/// Skip compilation (--raw).
pub fn raw_arg() -> Arg {
    Arg::new("raw")
        .long("raw")
        .action(ArgAction::SetTrue)
        .help("Show the program as read, without compiling it")
}

/// Output format (--format).
pub fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_name("FORMAT")
        .default_value("motif")
        .value_parser(["motif", "json"])
        .help("Output format")
}

/// Defined step ids (--steps).
pub fn steps_arg() -> Arg {
    Arg::new("steps")
        .long("steps")
        .value_name("IDS")
        .value_delimiter(',')
        .allow_hyphen_values(true)
        .value_parser(value_parser!(i64))
        .help("Comma-separated step ids the pattern may use (default: the ids it names)")
}

/// Explain dump instead of canonical text (--explain).
pub fn explain_arg() -> Arg {
    Arg::new("explain")
        .long("explain")
        .action(ArgAction::SetTrue)
        .help("Print the explain tree instead of canonical text")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .global(true)
        .action(ArgAction::Count)
        .help("Log compiler passes (-v for debug, -vv for trace)")
}
