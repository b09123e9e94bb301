mod cli;
mod commands;

use cli::{CheckParams, ExplainParams, FoldParams, PatternParams, RenderParams, build_cli};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "MOTIF_LOG";

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("render", m)) => {
            let params = RenderParams::from_matches(m);
            commands::render::run(params.into());
        }
        Some(("explain", m)) => {
            let params = ExplainParams::from_matches(m);
            commands::explain::run(params.into());
        }
        Some(("fold", m)) => {
            let params = FoldParams::from_matches(m);
            commands::fold::run(params.into());
        }
        Some(("pattern", m)) => {
            let params = PatternParams::from_matches(m);
            commands::pattern::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// Logs go to stderr; `MOTIF_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
