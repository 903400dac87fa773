//! sheetctl CLI entry point.

use std::io;
use std::process::ExitCode;

use clap::Parser;

use sheetctl_core::{TracingConfig, init_tracing};

use sheetctl_cli::cli::Cli;
use sheetctl_cli::commands::dispatch;
use sheetctl_cli::config::ClientConfig;
use sheetctl_cli::error::{ClientError, ClientResult};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path).map_err(ClientError::Config)?,
        None => ClientConfig::load().map_err(ClientError::Config)?,
    };

    // Flags and env vars win over the config file
    if cli.credentials.is_some() {
        config.credentials_path = cli.credentials;
    }
    if cli.token.is_some() {
        config.token_path = cli.token;
    }
    if cli.timeout.is_some() {
        config.timeout_secs = cli.timeout;
    }

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    dispatch(cli.command, &config, &mut input, &mut output).await
}
