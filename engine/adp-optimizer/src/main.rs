use std::process::ExitCode;

use adp_optimizer::Cli;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose wins over RUST_LOG
    let env_filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Ok(converged and the final ranking passed its checks)
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let settings = cli.settings()?;
    info!("Starting optimal-adp {} on {}", adp_optimizer::VERSION, cli.data_file.display());
    let summary = adp_optimizer::run(&settings, &cli.data_file, cli.output.as_deref())?;
    Ok(summary.passed())
}
