//! Zone CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::cli::display::{colorize_status, list_table, render_list};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{Zone, ZoneParams};
use crate::infrastructure::api::Client;

#[derive(Args, Debug)]
pub struct ZoneArgs {
    #[command(subcommand)]
    pub command: ZoneCommands,
}

#[derive(Subcommand, Debug)]
pub enum ZoneCommands {
    /// List zones
    List {
        /// Filter by domain name
        #[arg(short, long)]
        name: Option<String>,
        /// Filter by status (active, pending, initializing, moved, deleted, deactivated)
        #[arg(short, long)]
        status: Option<String>,
        /// Filter by account ID
        #[arg(long)]
        account_id: Option<String>,
        /// Filter by account name
        #[arg(long)]
        account_name: Option<String>,
        /// Whether all filters must match (all) or any of them (any)
        #[arg(long = "match")]
        match_type: Option<String>,
        /// Sort direction (asc, desc)
        #[arg(long)]
        direction: Option<String>,
        /// Page number
        #[arg(long)]
        page: Option<u32>,
        /// Zones per page
        #[arg(long)]
        per_page: Option<u32>,
        /// Follow pagination and list every zone
        #[arg(long)]
        all: bool,
    },
    /// Show zone details
    Get {
        /// Zone ID
        zone_id: String,
    },
    /// Delete a zone
    Delete {
        /// Zone ID
        zone_id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ZoneOutput {
    pub id: String,
    pub name: String,
    pub status: String,
    pub plan: String,
    pub zone_type: String,
    pub paused: bool,
    pub name_servers: Vec<String>,
    pub account: String,
    pub created_on: Option<String>,
}

impl From<&Zone> for ZoneOutput {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id.clone(),
            name: zone.name.clone(),
            status: zone.status.clone(),
            plan: zone.plan.common.name.clone(),
            zone_type: zone.zone_type.clone(),
            paused: zone.paused,
            name_servers: zone.name_servers.clone(),
            account: zone.account.name.clone(),
            created_on: zone.created_on.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ZoneListOutput {
    pub zones: Vec<ZoneOutput>,
    pub total: usize,
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
}

impl CommandOutput for ZoneListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "status", "plan", "type"]);
        for zone in &self.zones {
            table.add_row(vec![
                zone.id.clone(),
                truncate(&zone.name, 40),
                colorize_status(&zone.status),
                zone.plan.clone(),
                zone.zone_type.clone(),
            ]);
        }

        let mut rendered = render_list("zone", &table, self.total);
        if let (Some(page), Some(total_pages)) = (self.page, self.total_pages) {
            if total_pages > 1 {
                rendered.push_str(&format!("\n\nPage {page} of {total_pages}"));
            }
        }
        rendered
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ZoneDetailOutput {
    pub zone: ZoneOutput,
}

impl CommandOutput for ZoneDetailOutput {
    fn to_human(&self) -> String {
        let zone = &self.zone;
        let mut lines = vec![
            format!("Zone: {}", zone.name),
            format!("ID: {}", zone.id),
            format!("Status: {}", colorize_status(&zone.status)),
            format!("Plan: {}", zone.plan),
            format!("Type: {}", zone.zone_type),
            format!("Paused: {}", zone.paused),
        ];

        if !zone.account.is_empty() {
            lines.push(format!("Account: {}", zone.account));
        }
        if let Some(created_on) = &zone.created_on {
            lines.push(format!("Created: {created_on}"));
        }

        if !zone.name_servers.is_empty() {
            lines.push("\nName servers:".to_string());
            for ns in &zone.name_servers {
                lines.push(format!("  - {ns}"));
            }
        }

        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ZoneActionOutput {
    pub success: bool,
    pub message: String,
    pub id: String,
}

impl CommandOutput for ZoneActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute(
    args: ZoneArgs,
    client: &Client,
    cancel: &CancellationToken,
    json_mode: bool,
) -> Result<()> {
    let zones = client.zones();

    match args.command {
        ZoneCommands::List {
            name,
            status,
            account_id,
            account_name,
            match_type,
            direction,
            page,
            per_page,
            all,
        } => {
            let params = ZoneParams {
                match_type,
                name,
                account_name,
                status,
                account_id,
                direction,
                page,
                per_page,
            };

            let out = if all {
                let found = zones
                    .list_all(cancel, &params)
                    .await
                    .context("Failed to list zones")?;
                ZoneListOutput {
                    total: found.len(),
                    zones: found.iter().map(ZoneOutput::from).collect(),
                    page: None,
                    total_pages: None,
                }
            } else {
                let response = zones
                    .list(cancel, &params)
                    .await
                    .context("Failed to list zones")?;
                ZoneListOutput {
                    total: response.result.len(),
                    zones: response.result.iter().map(ZoneOutput::from).collect(),
                    page: Some(response.result_info.page),
                    total_pages: Some(response.result_info.total_pages),
                }
            };
            output(&out, json_mode);
        }

        ZoneCommands::Get { zone_id } => {
            let zone = zones
                .get(cancel, &zone_id)
                .await
                .with_context(|| format!("Failed to get zone {zone_id}"))?;
            let out = ZoneDetailOutput {
                zone: ZoneOutput::from(&zone),
            };
            output(&out, json_mode);
        }

        ZoneCommands::Delete { zone_id } => {
            let deleted = zones
                .delete(cancel, &zone_id)
                .await
                .with_context(|| format!("Failed to delete zone {zone_id}"))?;
            let out = ZoneActionOutput {
                success: true,
                message: format!("Zone deleted: {}", deleted.id),
                id: deleted.id,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
