//! Configuration CLI commands.

use std::path::Path;

use clap::{Args, Subcommand};

use numz_core::config::AppConfig;
use numz_core::error::AppError;
use numz_module::ModuleCategory;

use crate::output::{self, OutputFormat};

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration (file plus NUMZ_* overrides)
    Show,
    /// Check settings and the module and plugin directories they point at
    Validate,
    /// Write the annotated default configuration
    Generate {
        /// Destination file
        #[arg(short, long, default_value = "config/numz.toml")]
        output: String,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => output::print_item(&config, format),
        ConfigCommand::Validate => validate(config_path, &config).await?,
        ConfigCommand::Generate {
            output: destination,
            force,
        } => generate(destination, *force).await?,
    }
    Ok(())
}

async fn validate(config_path: &str, config: &AppConfig) -> Result<(), AppError> {
    let problems = config.problems();

    let root = Path::new(&config.modules.root);
    let missing: Vec<&str> = if is_dir(root).await {
        let mut missing = Vec::new();
        for category in ModuleCategory::ALL {
            if !is_dir(&root.join(category.directory())).await {
                missing.push(category.directory());
            }
        }
        missing
    } else {
        Vec::new()
    };
    let manifest = Path::new(&config.plugins.directory).join(&config.plugins.manifest);

    output::print_kv("Module root", &config.modules.root);
    output::print_kv("Plugin manifest", &manifest.display().to_string());
    if !is_dir(root).await {
        output::print_warning("Module root does not exist yet; it is created at startup");
    } else if !missing.is_empty() {
        output::print_warning(&format!(
            "Category directories created at startup: {}",
            missing.join(", ")
        ));
    }
    if tokio::fs::metadata(&manifest).await.is_err() {
        output::print_warning("No plugin manifest; no plugins will load");
    }

    if problems.is_empty() {
        output::print_success(&format!("Configuration '{config_path}' is valid"));
        Ok(())
    } else {
        for problem in &problems {
            output::print_error(problem);
        }
        Err(AppError::configuration(format!(
            "Configuration '{config_path}' has {} problem(s)",
            problems.len()
        )))
    }
}

async fn generate(destination: &str, force: bool) -> Result<(), AppError> {
    let path = Path::new(destination);
    if !force && tokio::fs::metadata(path).await.is_ok() {
        return Err(AppError::conflict(format!(
            "'{destination}' already exists; pass --force to replace it"
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, DEFAULT_CONFIG).await?;
    output::print_success(&format!("Default configuration written to '{destination}'"));
    Ok(())
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
