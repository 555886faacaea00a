//! Cache configuration.

use serde::{Deserialize, Serialize};

/// Backing store for short-lived query answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Backend name. `memory` is the only one compiled in.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Upper bound on live entries before the least useful are evicted.
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Lifetime of entries written without an explicit TTL.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            max_entries: default_max_entries(),
            default_ttl_seconds: default_ttl(),
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}

fn default_max_entries() -> u64 {
    10_000
}

fn default_ttl() -> u64 {
    600
}
