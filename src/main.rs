use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use travelai::cli::Cli;
use travelai::config::TravelAiConfig;
use travelai::{VERSION, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        TravelAiConfig::load_from_path(cli.config.clone()).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
        config.validate()?;
    }

    logging::init(&config.logging, cli.verbose)?;
    info!("Starting TravelAI {VERSION}");

    web::run(config).await
}
