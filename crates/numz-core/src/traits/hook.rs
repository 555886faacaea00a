//! Hook listener contract shared by the hook bus, modules and plugins.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::types::params::Params;

/// Failure raised by a hook listener.
///
/// The bus records the message as the listener's `{"error": ...}` result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HookFault {
    /// Human-readable failure message.
    pub message: String,
}

impl HookFault {
    /// Create a fault from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for HookFault {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HookFault {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<AppError> for HookFault {
    fn from(err: AppError) -> Self {
        Self::new(err.message)
    }
}

/// A listener registered against a hook point.
///
/// Listeners receive the firing's parameters by shared reference and return
/// an arbitrary JSON result. Listeners that mutate state outside the bus
/// (stores, caches) are visible to every listener that runs after them in
/// the same firing.
#[async_trait]
pub trait HookHandler: Send + Sync + 'static {
    /// Identity recorded in logs and execution history.
    fn name(&self) -> &str;

    /// Handle one firing.
    async fn handle(&self, params: &Params) -> Result<Value, HookFault>;
}
