//! Per-category shape validation.

use serde::{Deserialize, Serialize};

use crate::descriptor::ModuleDescriptor;

/// Result of validating a module against its category contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether no errors were found.
    pub valid: bool,
    /// Contract violations.
    pub errors: Vec<String>,
    /// Recommendations that do not invalidate the module.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Report for a module with no entry file.
    pub fn missing() -> Self {
        Self::from_findings(vec!["Module file not found".to_string()], Vec::new())
    }

    /// Report for a module whose entry exists but cannot be loaded.
    pub fn unloadable(reason: &str) -> Self {
        Self::from_findings(vec![format!("Module could not be loaded: {reason}")], Vec::new())
    }

    /// Validates a loaded module.
    ///
    /// Missing required operations are errors. Empty metadata is a warning,
    /// as is a `ConfigOptions` accessor that yields no options.
    pub fn for_descriptor(descriptor: &ModuleDescriptor) -> Self {
        let errors = descriptor
            .category
            .required_operations()
            .iter()
            .filter(|op| !descriptor.has_operation(op))
            .map(|op| format!("Required function '{op}' not found"))
            .collect();

        let mut warnings = Vec::new();
        if descriptor.metadata.is_empty() {
            warnings.push("Module metadata not found (optional but recommended)".to_string());
        }
        if descriptor.has_config_accessor() && descriptor.config_options.is_empty() {
            warnings.push("No configuration options defined".to_string());
        }

        Self::from_findings(errors, warnings)
    }

    fn from_findings(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
