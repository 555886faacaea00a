//! Module registry configuration.

use serde::{Deserialize, Serialize};

/// Module registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Root directory holding one sub-directory per module category.
    #[serde(default = "default_root")]
    pub root: String,
    /// File extension of module entry points (`<name>/<name>.<ext>`).
    #[serde(default = "default_entry_extension")]
    pub entry_extension: String,
    /// Descriptor cache TTL in seconds. `None` keeps descriptors for the
    /// process lifetime.
    #[serde(default)]
    pub cache_ttl_seconds: Option<u64>,
    /// TTL of cached active-set queries in seconds.
    #[serde(default = "default_active_set_ttl")]
    pub active_set_ttl_seconds: u64,
    /// Default time budget for a single module invocation. `None` disables it.
    #[serde(default = "default_invoke_timeout")]
    pub invoke_timeout_seconds: Option<u64>,
    /// Add-on modules considered active.
    #[serde(default)]
    pub active_addons: Vec<String>,
    /// Payment gateways considered active.
    #[serde(default)]
    pub active_gateways: Vec<String>,
    /// Module call logging.
    #[serde(default)]
    pub log: ModuleLogConfig,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            entry_extension: default_entry_extension(),
            cache_ttl_seconds: None,
            active_set_ttl_seconds: default_active_set_ttl(),
            invoke_timeout_seconds: default_invoke_timeout(),
            active_addons: Vec::new(),
            active_gateways: Vec::new(),
            log: ModuleLogConfig::default(),
        }
    }
}

/// Module call logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleLogConfig {
    /// Whether module calls are logged at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether request parameters are included in the log.
    #[serde(default = "default_true")]
    pub log_requests: bool,
    /// Whether module responses are included in the log.
    #[serde(default = "default_true")]
    pub log_responses: bool,
}

impl Default for ModuleLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_requests: true,
            log_responses: true,
        }
    }
}

fn default_root() -> String {
    "./modules".to_string()
}

fn default_entry_extension() -> String {
    "toml".to_string()
}

fn default_active_set_ttl() -> u64 {
    600
}

fn default_invoke_timeout() -> Option<u64> {
    Some(60)
}

fn default_true() -> bool {
    true
}
