use std::process::ExitCode;

use clap::Parser;
use herald::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let settings = load_and_merge_config(cli)?;
    init_logger_from_settings(&settings)?;

    tracing::debug!(
        version = herald::pkg_version(),
        app_id = %settings.application.app_id,
        "Configuration loaded"
    );

    Ok(execute_command(cli, settings).await?)
}
