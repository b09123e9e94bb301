//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! `*Params` structs mirror the command `*Args` but keep the raw color choice;
//! the `Into<*Args>` impls resolve it against the terminal.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::OutputFormat;
use crate::commands::check::CheckArgs;
use crate::commands::explain::ExplainArgs;
use crate::commands::fold::FoldArgs;
use crate::commands::loader::SessionArgs;
use crate::commands::pattern::PatternArgs;
use crate::commands::render::RenderArgs;

pub struct CheckParams {
    pub program_path: PathBuf,
    pub session: SessionArgs,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program_path: parse_program_path(m),
            session: parse_session(m),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            program_path: p.program_path,
            session: p.session,
            color: p.color.should_colorize(),
        }
    }
}

pub struct RenderParams {
    pub program_path: PathBuf,
    pub session: SessionArgs,
    pub format: OutputFormat,
    pub raw: bool,
    pub color: ColorChoice,
}

impl RenderParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program_path: parse_program_path(m),
            session: parse_session(m),
            format: parse_format(m),
            raw: m.get_flag("raw"),
            color: parse_color(m),
        }
    }
}

impl From<RenderParams> for RenderArgs {
    fn from(p: RenderParams) -> Self {
        Self {
            program_path: p.program_path,
            session: p.session,
            format: p.format,
            raw: p.raw,
            color: p.color.should_colorize(),
        }
    }
}

pub struct ExplainParams {
    pub program_path: PathBuf,
    pub session: SessionArgs,
    pub raw: bool,
    pub color: ColorChoice,
}

impl ExplainParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program_path: parse_program_path(m),
            session: parse_session(m),
            raw: m.get_flag("raw"),
            color: parse_color(m),
        }
    }
}

impl From<ExplainParams> for ExplainArgs {
    fn from(p: ExplainParams) -> Self {
        Self {
            program_path: p.program_path,
            session: p.session,
            raw: p.raw,
            color: p.color.should_colorize(),
        }
    }
}

pub struct FoldParams {
    pub expr: String,
    pub session: SessionArgs,
    pub format: OutputFormat,
    pub explain: bool,
    pub color: ColorChoice,
}

impl FoldParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            expr: m.get_one::<String>("expr").cloned().unwrap_or_default(),
            session: parse_session(m),
            format: parse_format(m),
            explain: m.get_flag("explain"),
            color: parse_color(m),
        }
    }
}

impl From<FoldParams> for FoldArgs {
    fn from(p: FoldParams) -> Self {
        Self {
            expr: p.expr,
            session: p.session,
            format: p.format,
            explain: p.explain,
            color: p.color.should_colorize(),
        }
    }
}

pub struct PatternParams {
    pub pattern: String,
    pub steps: Option<Vec<i64>>,
    pub explain: bool,
    pub color: ColorChoice,
}

impl PatternParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            pattern: m.get_one::<String>("pattern").cloned().unwrap_or_default(),
            steps: m
                .get_many::<i64>("steps")
                .map(|ids| ids.copied().collect()),
            explain: m.get_flag("explain"),
            color: parse_color(m),
        }
    }
}

impl From<PatternParams> for PatternArgs {
    fn from(p: PatternParams) -> Self {
        Self {
            pattern: p.pattern,
            steps: p.steps,
            explain: p.explain,
            color: p.color.should_colorize(),
        }
    }
}

fn parse_program_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("program_path")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("-"))
}

fn parse_session(m: &ArgMatches) -> SessionArgs {
    SessionArgs {
        schema: m.get_one::<PathBuf>("schema").cloned(),
        config: m.get_one::<PathBuf>("config").cloned(),
        time_zone: m.get_one::<String>("time_zone").cloned(),
        max_depth: m.get_one::<u32>("max_depth").copied(),
        no_fold: m.get_flag("no_fold"),
    }
}

/// Parse --format flag into OutputFormat.
fn parse_format(m: &ArgMatches) -> OutputFormat {
    match m.get_one::<String>("format").map(|s| s.as_str()) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Motif,
    }
}

/// Parse --color flag into ColorChoice.
fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
