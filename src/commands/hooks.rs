//! Hook bus CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use numz_core::config::AppConfig;
use numz_core::error::AppError;
use numz_plugin::{CommonHook, HookBus};

use super::{Cli, parse_params};
use crate::output;

/// Arguments for hook commands
#[derive(Debug, Args)]
pub struct HooksArgs {
    /// Hook subcommand
    #[command(subcommand)]
    pub command: HooksCommand,
}

/// Hook subcommands
#[derive(Debug, Subcommand)]
pub enum HooksCommand {
    /// List hook points and their listener counts
    List,
    /// Show the listeners of one hook point
    Show {
        /// Hook point
        point: String,
    },
    /// List the well-known hook catalogue
    Catalog,
    /// Fire a hook point and print each listener's result
    Run {
        /// Hook point
        point: String,
        /// Parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct PointRow {
    point: String,
    listeners: usize,
    /// Part of the well-known catalogue rather than a custom point.
    catalogued: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct ListenerRow {
    priority: i32,
    handler: String,
    owner: String,
    registered_at: String,
}

#[derive(Debug, Serialize, Tabled)]
struct CatalogRow {
    group: String,
    point: String,
}

/// Execute hook commands
pub async fn execute(args: &HooksArgs, cli: &Cli, config: AppConfig) -> Result<(), AppError> {
    let format = cli.format;

    match &args.command {
        HooksCommand::Catalog => {
            let rows: Vec<CatalogRow> = CommonHook::ALL
                .iter()
                .map(|hook| CatalogRow {
                    group: hook.group().to_string(),
                    point: hook.as_str().to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        HooksCommand::List => {
            let runtime = cli.runtime(config).await?;
            let bus = runtime.hooks();
            let rows = point_rows(bus).await;
            output::print_list(&rows, format);
            runtime.shutdown().await;
        }
        HooksCommand::Show { point } => {
            let runtime = cli.runtime(config).await?;
            let rows: Vec<ListenerRow> = runtime
                .hooks()
                .get_hooks(point)
                .await
                .into_iter()
                .map(|summary| ListenerRow {
                    priority: summary.priority,
                    handler: summary.handler,
                    owner: summary.owner.unwrap_or_else(|| "-".to_string()),
                    registered_at: summary.registered_at.to_rfc3339(),
                })
                .collect();
            output::print_list(&rows, format);
            runtime.shutdown().await;
        }
        HooksCommand::Run { point, params } => {
            let params = parse_params(params.as_deref())?;
            let runtime = cli.runtime(config).await?;
            let outcomes = runtime.hooks().run(point, &params).await;
            output::print_outcomes(point, &outcomes, format);
            runtime.shutdown().await;
        }
    }

    Ok(())
}

async fn point_rows(bus: &HookBus) -> Vec<PointRow> {
    let mut rows = Vec::new();
    for point in bus.hook_points().await {
        rows.push(PointRow {
            listeners: bus.count_hooks(&point).await,
            catalogued: CommonHook::from_name(&point).is_some(),
            point,
        });
    }
    rows
}
