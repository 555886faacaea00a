//! Plugin manager configuration.

use serde::{Deserialize, Serialize};

/// Plugin manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory containing plugin packages and the manifest.
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
    /// Manifest file name (JSON array of installed plugin names).
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Whether to load plugins on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// TTL of the cached manifest in seconds.
    #[serde(default = "default_manifest_ttl")]
    pub manifest_cache_ttl_seconds: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: default_plugin_directory(),
            manifest: default_manifest(),
            auto_load: true,
            manifest_cache_ttl_seconds: default_manifest_ttl(),
        }
    }
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

fn default_manifest() -> String {
    "installed.json".to_string()
}

fn default_true() -> bool {
    true
}

fn default_manifest_ttl() -> u64 {
    3600
}
