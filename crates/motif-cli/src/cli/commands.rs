//! Command builders for the CLI.
//!
//! Program commands (`check`, `render`, `explain`) share the session flags;
//! `fold` takes them too since folding may resolve paths and zones.

use clap::Command;

use super::args::*;

/// Schema, config and per-flag overrides used to build a session.
fn with_session_args(cmd: Command) -> Command {
    cmd.arg(schema_arg())
        .arg(config_arg())
        .arg(time_zone_arg())
        .arg(max_depth_arg())
        .arg(no_fold_arg())
        .arg(color_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("motif")
        .about("Compiler front end for the Motif query language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(check_command())
        .subcommand(render_command())
        .subcommand(explain_command())
        .subcommand(fold_command())
        .subcommand(pattern_command())
}

/// Compile a program and report the first failure.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Validate a program")
        .after_help(
            r#"EXAMPLES:
  motif check program.json --schema schema.json
  motif check - --schema schema.json < program.json
  motif check program.json --time-zone Europe/Berlin"#,
        )
        .arg(program_path_arg());
    with_session_args(cmd)
}

/// Print the compiled program as canonical text or JSON.
pub fn render_command() -> Command {
    let cmd = Command::new("render")
        .about("Print a compiled program")
        .after_help(
            r#"EXAMPLES:
  motif render program.json --schema schema.json
  motif render program.json --schema schema.json --format json
  motif render program.json --raw             # as read, not compiled"#,
        )
        .arg(program_path_arg())
        .arg(format_arg())
        .arg(raw_arg());
    with_session_args(cmd)
}

/// Print the explain tree of a program.
pub fn explain_command() -> Command {
    let cmd = Command::new("explain")
        .about("Show the node tree of a program")
        .after_help(
            r#"EXAMPLES:
  motif explain program.json --schema schema.json
  motif explain program.json --raw            # before binding"#,
        )
        .arg(program_path_arg())
        .arg(raw_arg());
    with_session_args(cmd)
}

/// Compile one expression.
pub fn fold_command() -> Command {
    let cmd = Command::new("fold")
        .about("Compile and fold one expression")
        .after_help(
            r#"EXAMPLES:
  motif fold '(5999 % 34) == 0'
  motif fold 'size(sessions) > 2' --schema schema.json
  motif fold "EXTRACT(HOUR_OF_DAY, NOW())" --time-zone Asia/Tokyo --explain"#,
        )
        .arg(expr_arg())
        .arg(format_arg())
        .arg(explain_arg());
    with_session_args(cmd)
}

/// Read and validate a match pattern.
pub fn pattern_command() -> Command {
    Command::new("pattern")
        .about("Check a funnel match pattern")
        .after_help(
            r#"EXAMPLES:
  motif pattern '1:(2|3)*:4'
  motif pattern '1:(?:2)*:3' --steps 1,2,3 --explain
  motif pattern '-1:1' --steps=-1,1"#,
        )
        .arg(pattern_arg())
        .arg(steps_arg())
        .arg(explain_arg())
        .arg(color_arg())
}
