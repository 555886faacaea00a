//! Module registry errors.

use std::path::PathBuf;
use std::time::Duration;

use numz_core::error::{AppError, ErrorKind};

use crate::category::ModuleCategory;

/// Failure raised by a module function itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ModuleFault {
    /// Message reported by the module.
    pub message: String,
}

impl ModuleFault {
    /// Create a fault from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for ModuleFault {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ModuleFault {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Errors surfaced by loading and invoking modules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleError {
    /// The category label is not one of the known categories.
    #[error("Unknown module category '{0}'")]
    UnknownCategory(String),

    /// No entry file exists for the module.
    #[error("Module {name} not found")]
    ModuleNotFound {
        /// Module category.
        category: ModuleCategory,
        /// Module name.
        name: String,
    },

    /// The module loaded but does not expose the operation.
    #[error("Function {operation} not found in module {name}")]
    OperationNotFound {
        /// Module category.
        category: ModuleCategory,
        /// Module name.
        name: String,
        /// Requested operation.
        operation: String,
    },

    /// The module function failed or panicked.
    #[error("{message}")]
    ModuleExecutionError {
        /// Module category.
        category: ModuleCategory,
        /// Module name.
        name: String,
        /// Operation being invoked.
        operation: String,
        /// Failure message raised by the module.
        message: String,
    },

    /// The invocation exceeded its time budget.
    #[error("Module {name} operation {operation} timed out after {}s", timeout.as_secs_f64())]
    TimedOut {
        /// Module category.
        category: ModuleCategory,
        /// Module name.
        name: String,
        /// Operation being invoked.
        operation: String,
        /// Budget that was exceeded.
        timeout: Duration,
    },

    /// The invocation was cancelled by the caller.
    #[error("Module {name} operation {operation} was cancelled")]
    Cancelled {
        /// Module category.
        category: ModuleCategory,
        /// Module name.
        name: String,
        /// Operation being invoked.
        operation: String,
    },

    /// The entry file exists but cannot be parsed.
    #[error("Malformed entry for module {name}: {reason}")]
    MalformedEntry {
        /// Module category.
        category: ModuleCategory,
        /// Module name.
        name: String,
        /// Parse failure.
        reason: String,
    },

    /// The loader could not produce an implementation.
    #[error("Failed to load module {name}: {reason}")]
    Load {
        /// Module category.
        category: ModuleCategory,
        /// Module name.
        name: String,
        /// Loader failure.
        reason: String,
    },
}

impl ModuleError {
    /// Whether this is a routine not-found outcome (module or operation).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ModuleNotFound { .. } | Self::OperationNotFound { .. }
        )
    }
}

impl From<ModuleError> for AppError {
    fn from(err: ModuleError) -> Self {
        let kind = match &err {
            ModuleError::UnknownCategory(_) => ErrorKind::Validation,
            ModuleError::ModuleNotFound { .. } | ModuleError::OperationNotFound { .. } => {
                ErrorKind::NotFound
            }
            ModuleError::TimedOut { .. } => ErrorKind::Timeout,
            ModuleError::Cancelled { .. } => ErrorKind::Cancelled,
            ModuleError::ModuleExecutionError { .. }
            | ModuleError::MalformedEntry { .. }
            | ModuleError::Load { .. } => ErrorKind::Module,
        };
        AppError::new(kind, err.to_string())
    }
}

/// A single module skipped during discovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    /// The module directory has no `<name>.<ext>` entry file.
    #[error("Module '{name}' has no entry file at {}", path.display())]
    MissingEntry {
        /// Module category.
        category: ModuleCategory,
        /// Module name (directory name).
        name: String,
        /// Expected entry file path.
        path: PathBuf,
    },

    /// The entry file could not be read or parsed.
    #[error("Module '{name}' has a malformed entry file {}: {reason}", path.display())]
    Malformed {
        /// Module category.
        category: ModuleCategory,
        /// Module name (directory name).
        name: String,
        /// Entry file path.
        path: PathBuf,
        /// Parse failure.
        reason: String,
    },
}

impl DiscoveryError {
    /// Name of the skipped module.
    pub fn module_name(&self) -> &str {
        match self {
            Self::MissingEntry { name, .. } | Self::Malformed { name, .. } => name,
        }
    }
}

impl From<DiscoveryError> for ModuleError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::MissingEntry { category, name, .. } => {
                ModuleError::ModuleNotFound { category, name }
            }
            DiscoveryError::Malformed {
                category,
                name,
                reason,
                ..
            } => ModuleError::MalformedEntry {
                category,
                name,
                reason,
            },
        }
    }
}
