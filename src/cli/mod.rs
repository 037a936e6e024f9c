//! Command-line interface for the Cloudflare API client.

pub mod commands;
pub mod display;
pub mod output;

use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

use crate::infrastructure::api::ApiError;

#[derive(Parser, Debug)]
#[command(name = "cfapi")]
#[command(about = "Cloudflare v4 API client", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./cfapi.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Zone management commands
    Zone(commands::zone::ZoneArgs),

    /// Send a raw request and print the response body
    Call(commands::call::CallArgs),
}

/// Exit code used when the user interrupted the command
pub const EXIT_CANCELLED: i32 = 130;

/// Report a command failure on stderr and exit.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let cancelled = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ApiError>())
        .any(ApiError::is_cancelled);

    if json_mode {
        let mut report = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        if let Some(api_err) = err.chain().find_map(|cause| cause.downcast_ref::<ApiError>()) {
            if let Some(status) = api_err.status() {
                report["status"] = status.into();
            }
            if let Some(request_err) = api_err.as_request_error() {
                report["codes"] = request_err.error_codes().into();
                report["ray_id"] = request_err.ray_id().into();
            }
        }
        eprintln!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else if cancelled {
        eprintln!("{}", style("Cancelled").yellow());
    } else {
        eprintln!("{} {err:#}", style("Error:").red().bold());
    }

    std::process::exit(if cancelled { EXIT_CANCELLED } else { 1 });
}
