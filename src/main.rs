use anyhow::Result;
use clap::Parser;
use spur::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Route mode is a one-shot tool whose stdout is the response body; keep
    // log noise down unless asked for.
    let default_filter = if cli.verbose {
        "debug"
    } else if cli.route.is_some() {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    run(cli)
}
