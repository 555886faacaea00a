//! Legacy command surface CLI commands.

use clap::{Args, Subcommand};

use numz_core::config::AppConfig;
use numz_core::error::AppError;

use super::{Cli, parse_params};
use crate::output;

/// Arguments for API commands
#[derive(Debug, Args)]
pub struct ApiArgs {
    /// API subcommand
    #[command(subcommand)]
    pub command: ApiCommand,
}

/// API subcommands
#[derive(Debug, Subcommand)]
pub enum ApiCommand {
    /// Execute a command and print its envelope
    Exec {
        /// Command name, e.g. GetClientsDetails
        name: String,
        /// Parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
        /// Administrator to run the command as
        #[arg(long = "as")]
        acting_user: Option<String>,
    },
    /// List available commands
    Commands,
}

/// Execute API commands
pub async fn execute(args: &ApiArgs, cli: &Cli, config: AppConfig) -> Result<(), AppError> {
    let runtime = cli.runtime(config).await?;
    let dispatcher = runtime.commands();

    match &args.command {
        ApiCommand::Exec {
            name,
            params,
            acting_user,
        } => {
            let params = parse_params(params.as_deref())?;
            let envelope = dispatcher
                .execute(name, &params, acting_user.as_deref())
                .await;
            output::print_envelope(&envelope, cli.format);
        }
        ApiCommand::Commands => {
            output::print_names(&dispatcher.commands(), "No commands registered.", cli.format)
        }
    }

    runtime.shutdown().await;
    Ok(())
}
