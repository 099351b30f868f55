mod cli;
mod application;
mod domain;
mod data;
mod ml;
mod infra;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use domain::error::PipelineError;

fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("disaster_response=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = match err.downcast_ref::<PipelineError>() {
                Some(e) => {
                    tracing::debug!("Failed at stage '{}' ({:?})", e.stage(), e.kind());
                    e.kind().exit_code()
                }
                None => 1,
            };
            ExitCode::from(code)
        }
    }
}
