//! Module registry CLI commands.

use std::str::FromStr;
use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use numz_core::config::AppConfig;
use numz_core::error::AppError;
use numz_module::{InvokeOptions, ModuleCategory};

use super::{Cli, parse_params};
use crate::output::{self, OutputFormat};

/// Arguments for module commands
#[derive(Debug, Args)]
pub struct ModulesArgs {
    /// Module subcommand
    #[command(subcommand)]
    pub command: ModulesCommand,
}

/// Module subcommands
#[derive(Debug, Subcommand)]
pub enum ModulesCommand {
    /// List discovered modules
    List {
        /// Restrict to one category (label or directory name)
        #[arg(long)]
        category: Option<String>,
    },
    /// Validate a module against its category contract
    Validate {
        /// Module category
        category: String,
        /// Module name
        name: String,
    },
    /// Show a loaded module's descriptor
    Show {
        /// Module category
        category: String,
        /// Module name
        name: String,
    },
    /// Invoke a module operation
    Invoke {
        /// Module category
        category: String,
        /// Module name
        name: String,
        /// Operation, e.g. CreateAccount
        operation: String,
        /// Parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
        /// Time budget in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List active modules of a category
    Active {
        /// Module category
        category: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ModuleRow {
    category: String,
    name: String,
    loader: String,
    entry: String,
}

#[derive(Debug, Serialize, Tabled)]
struct SkippedRow {
    module: String,
    reason: String,
}

fn category(raw: &str) -> Result<ModuleCategory, AppError> {
    Ok(ModuleCategory::from_str(raw)?)
}

/// Execute module commands
pub async fn execute(args: &ModulesArgs, cli: &Cli, config: AppConfig) -> Result<(), AppError> {
    let format = cli.format;
    let runtime = cli.runtime(config).await?;
    let registry = runtime.modules();

    match &args.command {
        ModulesCommand::List { category: filter } => {
            let filter = filter.as_deref().map(category).transpose()?;
            let report = registry.discover(filter).await?;

            let rows: Vec<ModuleRow> = report
                .modules()
                .map(|entry| ModuleRow {
                    category: entry.category.to_string(),
                    name: entry.name.clone(),
                    loader: entry.manifest.loader.to_string(),
                    entry: entry.entry_file.display().to_string(),
                })
                .collect();
            output::print_list(&rows, format);

            let skipped: Vec<SkippedRow> = report
                .skipped()
                .map(|e| SkippedRow {
                    module: e.module_name().to_string(),
                    reason: e.to_string(),
                })
                .collect();
            if !skipped.is_empty() && format == OutputFormat::Table {
                output::print_warning(&format!("{} module(s) skipped", skipped.len()));
                output::print_list(&skipped, format);
            }
        }
        ModulesCommand::Validate { category: cat, name } => {
            let report = registry.validate(category(cat)?, name).await;
            output::print_validation(name, &report, format);
        }
        ModulesCommand::Show { category: cat, name } => {
            let descriptor = registry.load(category(cat)?, name).await?;
            output::print_item(&descriptor.summary(), format);
        }
        ModulesCommand::Invoke {
            category: cat,
            name,
            operation,
            params,
            timeout,
        } => {
            let params = parse_params(params.as_deref())?;
            let mut options = InvokeOptions::default();
            if let Some(secs) = timeout {
                options = options.with_timeout(Duration::from_secs(*secs));
            }
            let result = registry
                .invoke_with(category(cat)?, name, operation, &params, options)
                .await?;
            output::print_json(&result);
        }
        ModulesCommand::Active { category: cat } => {
            let names = registry.active_modules(category(cat)?).await?;
            output::print_names(&names, "No active modules.", format);
        }
    }

    Ok(())
}
