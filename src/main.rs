mod cli;

use caseflow::errors::{to_exit_code, WorkflowError};
use caseflow::fs::WorkDir;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{dispatch, Cli};

/// `RUST_LOG` wins, then `logging.level` from the work directory config.
fn log_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let configured = WorkDir::discover()
        .ok()
        .filter(WorkDir::exists)
        .and_then(|dir| dir.load().ok())
        .map(|config| config.logging.level);
    configured
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn main() {
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli.command) {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<WorkflowError>().map(to_exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}
