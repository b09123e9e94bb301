use motif_compiler::reader::read_expr;
use motif_compiler::{Explain, Motif};

use super::loader::SessionArgs;
use super::{CommandError, OutputFormat, finish, line};

pub struct FoldArgs {
    pub expr: String,
    pub session: SessionArgs,
    pub format: OutputFormat,
    pub explain: bool,
    pub color: bool,
}

pub fn run(args: FoldArgs) {
    finish(fold(&args), Some(&args.expr), args.color);
}

pub fn fold(args: &FoldArgs) -> Result<String, CommandError> {
    let expr = read_expr(&args.expr)?;
    let compiled = args.session.session()?.compile_expr(expr)?;
    if args.explain {
        return Ok(line(compiled.explain(0)));
    }
    Ok(match args.format {
        OutputFormat::Motif => line(compiled.generate_motif(0)),
        OutputFormat::Json => line(
            serde_json::to_string_pretty(&compiled)
                .map_err(motif_compiler::Error::from)?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(expr: &str) -> FoldArgs {
        FoldArgs {
            expr: expr.to_string(),
            session: SessionArgs::default(),
            format: OutputFormat::Motif,
            explain: false,
            color: false,
        }
    }

    #[test]
    fn folds_constant_predicate() {
        assert_eq!(fold(&args("(5999 % 34) == 0")).unwrap(), "FALSE\n");
        assert_eq!(fold(&args("2 * 21")).unwrap(), "CAST(42 AS LONG)\n");
    }

    #[test]
    fn no_fold_keeps_tree() {
        let mut args = args("1 + 1");
        args.session.no_fold = true;
        assert_eq!(fold(&args).unwrap(), "(1 + 1)\n");
    }

    #[test]
    fn json_output_is_tagged() {
        let mut args = args("2 * 21");
        args.format = OutputFormat::Json;
        let value: serde_json::Value = serde_json::from_str(&fold(&args).unwrap()).unwrap();
        assert_eq!(value["value"]["kind"], "constant");
        assert_eq!(value["value"]["value"]["value"], 42);
    }

    #[test]
    fn unknown_path_reports_against_source() {
        let args = args("userId > 1");
        let err = fold(&args).unwrap_err();
        let diagnostic = err.diagnostic().unwrap();
        assert_eq!(diagnostic.message, "`userId` is not defined");
        let report = err.render(Some(&args.expr), false);
        assert!(report.contains("userId > 1"), "{report}");
    }

    #[test]
    fn syntax_error_is_diagnostic() {
        let err = fold(&args("1 +")).unwrap_err();
        assert_eq!(
            err.diagnostic().unwrap().message,
            "syntax error: expected an expression, found end of input"
        );
    }
}
