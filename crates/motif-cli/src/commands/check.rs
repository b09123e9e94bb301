use std::path::PathBuf;

use super::loader::{SessionArgs, load_program};
use super::{CommandError, finish};

pub struct CheckArgs {
    pub program_path: PathBuf,
    pub session: SessionArgs,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    finish(check(&args), None, args.color);
}

/// Silent on success (like cargo check).
pub fn check(args: &CheckArgs) -> Result<String, CommandError> {
    let program = load_program(&args.program_path)?;
    let statements = program.statements.len();
    args.session.session()?.compile(program)?;
    tracing::info!(statements, "program is valid");
    Ok(String::new())
}
