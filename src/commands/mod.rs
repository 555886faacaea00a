//! CLI command definitions and dispatch.

pub mod api;
pub mod config;
pub mod hooks;
pub mod modules;
pub mod plugins;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use numz_command::MemoryBillingStore;
use numz_core::Params;
use numz_core::config::AppConfig;
use numz_core::error::AppError;
use numz_runtime::{CompatRuntime, RuntimeBuilder};

use crate::output::OutputFormat;

/// Numz: legacy module compatibility runtime
#[derive(Debug, Parser)]
#[command(name = "numz", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// JSON file of clients, products and services to preload
    #[arg(long, global = true)]
    pub seed: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Module discovery, validation and invocation
    Modules(modules::ModulesArgs),
    /// Hook bus inspection and firing
    Hooks(hooks::HooksArgs),
    /// Installed plugins and their capabilities
    Plugins(plugins::PluginsArgs),
    /// Legacy command surface
    Api(api::ApiArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Modules(args) => modules::execute(args, self, config).await,
            Commands::Hooks(args) => hooks::execute(args, self, config).await,
            Commands::Plugins(args) => plugins::execute(args, self, config).await,
            Commands::Api(args) => api::execute(args, self, config).await,
            Commands::Config(args) => config::execute(args, &self.config, config, self.format).await,
        }
    }

    /// Builds and bootstraps the runtime.
    pub async fn runtime(&self, config: AppConfig) -> Result<CompatRuntime, AppError> {
        let mut builder = RuntimeBuilder::new(config);
        if let Some(seed) = &self.seed {
            let store = MemoryBillingStore::load_seed(std::path::Path::new(seed)).await?;
            builder = builder.store(Arc::new(store));
        }
        let runtime = builder.build()?;
        runtime.bootstrap().await?;
        Ok(runtime)
    }
}

/// Helper: parse a `--params` JSON object
pub fn parse_params(raw: Option<&str>) -> Result<Params, AppError> {
    match raw {
        None => Ok(Params::new()),
        Some(text) => match serde_json::from_str(text)? {
            serde_json::Value::Object(map) => Ok(Params::from(map)),
            _ => Err(AppError::validation("--params must be a JSON object")),
        },
    }
}
