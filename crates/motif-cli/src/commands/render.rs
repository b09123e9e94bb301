use std::path::PathBuf;

use motif_compiler::Motif;
use motif_compiler::render::to_json;

use super::loader::{SessionArgs, load_program};
use super::{CommandError, OutputFormat, finish, line};

pub struct RenderArgs {
    pub program_path: PathBuf,
    pub session: SessionArgs,
    pub format: OutputFormat,
    pub raw: bool,
    pub color: bool,
}

pub fn run(args: RenderArgs) {
    finish(render(&args), None, args.color);
}

pub fn render(args: &RenderArgs) -> Result<String, CommandError> {
    let mut program = load_program(&args.program_path)?;
    if !args.raw {
        program = args.session.session()?.compile(program)?.program;
    }
    Ok(match args.format {
        OutputFormat::Motif => program.generate_motif(0),
        OutputFormat::Json => line(to_json(&program)?),
    })
}
