//! cfapi CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use cloudflare_api::cli::{handle_error, Cli, Commands};
use cloudflare_api::infrastructure::api::ClientBuilder;
use cloudflare_api::infrastructure::config::ConfigLoader;
use cloudflare_api::infrastructure::logging::{LogConfig, LoggerImpl, TracingLogger};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref())?;

    let log_config = LogConfig::try_from(&config.logging)?;
    let _logger = LoggerImpl::init(&log_config)?;

    let client = ClientBuilder::from_config(&config)?
        .logger(Arc::new(TracingLogger))
        .build()
        .context("Failed to build API client")?;

    // Ctrl-C aborts the in-flight call at its next suspension point
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Zone(args) => {
            cloudflare_api::cli::commands::zone::execute(args, &client, &cancel, cli.json).await
        }
        Commands::Call(args) => {
            cloudflare_api::cli::commands::call::execute(args, &client, &cancel, cli.json).await
        }
    }
}
