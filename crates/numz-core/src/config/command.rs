//! Command dispatcher configuration.

use serde::{Deserialize, Serialize};

/// Command dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Include the parameter bag when logging a failed command.
    #[serde(default = "default_true")]
    pub log_params_on_error: bool,
    /// Time budget for a single command. `None` disables it.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            log_params_on_error: true,
            timeout_seconds: None,
        }
    }
}

fn default_true() -> bool {
    true
}
