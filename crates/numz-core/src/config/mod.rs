//! Runtime configuration.
//!
//! One sub-module per section. Every field has a serde default, so an empty
//! or missing file produces a working runtime.

pub mod cache;
pub mod command;
pub mod hooks;
pub mod logging;
pub mod modules;
pub mod plugin;

use serde::{Deserialize, Serialize};

use self::cache::CacheConfig;
use self::command::CommandConfig;
use self::hooks::HookConfig;
use self::logging::LoggingConfig;
use self::modules::ModuleConfig;
use self::plugin::PluginConfig;

use crate::error::AppError;

/// Prefix of environment overrides, e.g. `NUMZ_MODULES__ROOT`.
pub const ENV_PREFIX: &str = "NUMZ";

/// Every runtime setting, grouped by component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub modules: ModuleConfig,
    #[serde(default)]
    pub hooks: HookConfig,
    #[serde(default)]
    pub plugins: PluginConfig,
    #[serde(default)]
    pub commands: CommandConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads `config/default`, then the `config/{env}` overlay, then
    /// `NUMZ_*` environment variables (sections separated by `__`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::layered(&["config/default".to_string(), format!("config/{env}")])
    }

    /// Loads one file plus environment overrides. A missing file leaves the
    /// defaults in place.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        Self::layered(&[path.to_string()])
    }

    fn layered(files: &[String]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for file in files {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|merged| merged.try_deserialize())
            .map_err(|e| AppError::configuration(format!("Invalid configuration: {e}")))
    }

    /// Settings that parse but cannot work at runtime.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.modules.root.trim().is_empty() {
            problems.push("modules.root must not be empty".to_string());
        }
        let extension = &self.modules.entry_extension;
        if extension.is_empty() || extension.starts_with('.') {
            problems.push(format!(
                "modules.entry_extension '{extension}' must be a bare extension such as 'toml'"
            ));
        }
        if self.modules.invoke_timeout_seconds == Some(0) {
            problems.push("modules.invoke_timeout_seconds must be positive or unset".to_string());
        }
        if self.hooks.handler_timeout_seconds == Some(0) {
            problems.push("hooks.handler_timeout_seconds must be positive or unset".to_string());
        }
        if self.plugins.manifest.trim().is_empty() {
            problems.push("plugins.manifest must name a file".to_string());
        }
        if self.cache.provider != "memory" {
            problems.push(format!("cache.provider '{}' is not available", self.cache.provider));
        }
        problems
    }
}
