//! Hook bus configuration.

use serde::{Deserialize, Serialize};

/// Hook bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Pre-declare the catalogue of well-known hook points at startup.
    #[serde(default = "default_true")]
    pub declare_catalog: bool,
    /// Maximum number of retained execution records. `0` disables history.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Time budget for a single handler. `None` disables it.
    #[serde(default = "default_handler_timeout")]
    pub handler_timeout_seconds: Option<u64>,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            declare_catalog: true,
            history_capacity: default_history_capacity(),
            handler_timeout_seconds: default_handler_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_history_capacity() -> usize {
    1000
}

fn default_handler_timeout() -> Option<u64> {
    Some(30)
}
