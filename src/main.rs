//! AutoWeb - LLM-directed browser automation
//!
//! Main entry point for the AutoWeb CLI and server.

mod cli;
mod register;
mod server;

use clap::Parser;
use tracing::warn;

use autoweb_config::{ConfigLoader, ConfigValidator};

use cli::{Cli, Commands};
use server::{init_tracing, open_request, run_once, run_server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)?;
    for warning in ConfigValidator::validate(&config).into_result()? {
        warn!("Config: {} - {}", warning.path, warning.message);
    }

    match cli.command {
        None => run_server(config, None, None).await,
        Some(Commands::Serve { host, port }) => run_server(config, host, port).await,
        Some(Commands::Run {
            url,
            task,
            model,
            aria,
            no_repair,
        }) => run_once(config, cli::run_request(url, task, model, aria, no_repair)).await,
        Some(Commands::Open { url }) => run_once(config, open_request(url)).await,
    }
}
