//! `numz`: inspect and drive the compatibility runtime from a shell.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use numz_core::config::AppConfig;
use numz_core::config::logging::{LogFormat, LoggingConfig};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    init_logging(&config.logging);
    tracing::debug!(
        config = %cli.config,
        modules = %config.modules.root,
        plugins = %config.plugins.directory,
        "Configuration loaded"
    );

    if let Err(e) = cli.execute(config).await {
        tracing::error!(kind = %e.kind, "Command failed: {}", e.message);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(config.show_targets)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
