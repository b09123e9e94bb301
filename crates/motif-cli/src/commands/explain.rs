use std::path::PathBuf;

use motif_compiler::Explain;

use super::loader::{SessionArgs, load_program};
use super::{CommandError, finish};

pub struct ExplainArgs {
    pub program_path: PathBuf,
    pub session: SessionArgs,
    pub raw: bool,
    pub color: bool,
}

pub fn run(args: ExplainArgs) {
    finish(explain(&args), None, args.color);
}

pub fn explain(args: &ExplainArgs) -> Result<String, CommandError> {
    let program = load_program(&args.program_path)?;
    if args.raw {
        return Ok(program.explain(0));
    }
    Ok(args.session.session()?.compile(program)?.explain())
}
