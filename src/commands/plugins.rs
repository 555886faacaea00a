//! Plugin manager CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use numz_core::config::AppConfig;
use numz_core::error::AppError;
use numz_plugin::AuthPage;

use super::{Cli, parse_params};
use crate::output;

/// Arguments for plugin commands
#[derive(Debug, Args)]
pub struct PluginsArgs {
    /// Plugin subcommand
    #[command(subcommand)]
    pub command: PluginsCommand,
}

/// Plugin subcommands
#[derive(Debug, Subcommand)]
pub enum PluginsCommand {
    /// List loaded plugins
    List,
    /// Fields plugins contribute for a platform
    Fields {
        /// Platform name, e.g. facebook
        platform: String,
        /// Campaign fields, given the platform configuration as JSON
        #[arg(long)]
        campaign: Option<String>,
    },
    /// Sidebar menu entries contributed by plugins
    Menu,
    /// Authentication buttons contributed by plugins
    Auth {
        /// Render for the registration page instead of login
        #[arg(long)]
        register: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    name: String,
    identifier: String,
    version: String,
    capabilities: String,
    hooks: usize,
}

/// Execute plugin commands
pub async fn execute(args: &PluginsArgs, cli: &Cli, config: AppConfig) -> Result<(), AppError> {
    let format = cli.format;
    let runtime = cli.runtime(config).await?;
    let manager = runtime.plugins();

    match &args.command {
        PluginsCommand::List => {
            let rows: Vec<PluginRow> = manager
                .descriptors()
                .await
                .into_iter()
                .map(|d| PluginRow {
                    capabilities: d
                        .capabilities
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    name: d.name,
                    identifier: d.identifier,
                    version: d.version,
                    hooks: d.hook_count,
                })
                .collect();
            output::print_list(&rows, format);
        }
        PluginsCommand::Fields { platform, campaign } => {
            let fields = match campaign {
                Some(raw) => {
                    let platform_config = parse_params(Some(raw))?;
                    manager.campaign_fields_for(platform, &platform_config).await
                }
                None => manager.platform_fields_for(platform).await,
            };
            output::print_json(&fields);
        }
        PluginsCommand::Menu => output::print_json(&manager.sidebar_menu_items().await),
        PluginsCommand::Auth { register } => {
            let page = if *register { AuthPage::Register } else { AuthPage::Login };
            output::print_json(&manager.auth_buttons(page).await);
        }
    }

    runtime.shutdown().await;
    Ok(())
}
