//! maya-exec: run Python in a live Maya session
//!
//! Sends one fragment through the command-port bridge and prints the bridge
//! response as JSON on stdout. Logs go to stderr so stdout stays parseable.
//!
//! Exit status: 0 on a result envelope, 1 on an error response, 2 when the
//! code could not be read.

mod args;

use anyhow::Result;
use args::Cli;
use clap::Parser;
use maya_bridge::BridgeClient;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let code = cli.read_code()?;
    let client = BridgeClient::new(cli.config());
    info!("Sending {} bytes of Python to {}", code.len(), client.target());

    let response = client.execute(&code).await;
    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&response.to_value())?);
    } else {
        println!("{}", response);
    }

    Ok(if response.is_error() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("maya-exec: {:#}", e);
            ExitCode::from(2)
        }
    }
}
