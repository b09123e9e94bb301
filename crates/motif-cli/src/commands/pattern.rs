use motif_compiler::pattern::validate_pattern;
use motif_compiler::reader::read_pattern;
use motif_compiler::{Explain, Motif};

use super::{CommandError, finish, line};

pub struct PatternArgs {
    pub pattern: String,
    /// Defined step ids; the pattern's own ids when absent.
    pub steps: Option<Vec<i64>>,
    pub explain: bool,
    pub color: bool,
}

pub fn run(args: PatternArgs) {
    finish(check_pattern(&args), Some(&args.pattern), args.color);
}

pub fn check_pattern(args: &PatternArgs) -> Result<String, CommandError> {
    let mut pattern = read_pattern(&args.pattern)?;
    let known = match &args.steps {
        Some(steps) => steps.clone(),
        None => pattern.step_ids(),
    };
    validate_pattern(&mut pattern, &known).map_err(CommandError::Pattern)?;
    if args.explain {
        return Ok(line(pattern.explain(0)));
    }
    Ok(line(pattern.generate_motif(0)))
}
