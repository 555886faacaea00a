//! Immutable module descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use serde_json::{Map, Value};

use numz_core::Params;
use numz_core::error::panic_message;

use crate::category::ModuleCategory;
use crate::discovery::ModuleEntry;
use crate::error::ModuleError;
use crate::function::ModuleFunction;
use crate::symbol::{ModuleHook, SymbolTable};

/// Operation name of the metadata accessor.
pub const METADATA_OPERATION: &str = "MetaData";

/// Operation name of the configuration options accessor.
pub const CONFIG_OPTIONS_OPERATION: &str = "ConfigOptions";

/// A loaded module. Never mutated after construction; reloading builds a
/// new descriptor.
pub struct ModuleDescriptor {
    /// Module category.
    pub category: ModuleCategory,
    /// Module name.
    pub name: String,
    /// Entry file the module was loaded from.
    pub file_location: PathBuf,
    /// Output of the `MetaData` accessor, empty when absent.
    pub metadata: Map<String, Value>,
    /// Output of the `ConfigOptions` accessor, empty when absent.
    pub config_options: Map<String, Value>,
    /// Load time.
    pub loaded_at: DateTime<Utc>,
    functions: BTreeMap<String, Arc<dyn ModuleFunction>>,
    hooks: Vec<ModuleHook>,
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("category", &self.category)
            .field("name", &self.name)
            .field("file_location", &self.file_location)
            .field("operations", &self.operations())
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Serializable view of a descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptorSummary {
    /// Module category.
    pub category: ModuleCategory,
    /// Module name.
    pub name: String,
    /// Entry file.
    pub file: String,
    /// Metadata.
    pub metadata: Map<String, Value>,
    /// Discovered operations.
    pub functions: Vec<String>,
    /// Hook points the module registers against.
    pub hooks: Vec<String>,
    /// Load time.
    pub loaded_at: DateTime<Utc>,
}

/// Runs an accessor operation, returning its object output.
///
/// A non-object result yields an empty map.
async fn evaluate_accessor(
    entry: &ModuleEntry,
    operation: &str,
    function: Option<&Arc<dyn ModuleFunction>>,
) -> Result<Map<String, Value>, ModuleError> {
    let Some(function) = function else {
        return Ok(Map::new());
    };

    let outcome = AssertUnwindSafe(function.call(&Params::new()))
        .catch_unwind()
        .await;
    let message = match outcome {
        Ok(Ok(Value::Object(map))) => return Ok(map),
        Ok(Ok(_)) => return Ok(Map::new()),
        Ok(Err(fault)) => fault.message,
        Err(panic) => panic_message(panic.as_ref()),
    };

    Err(ModuleError::Load {
        category: entry.category,
        name: entry.name.clone(),
        reason: format!("{operation} accessor failed: {message}"),
    })
}

impl ModuleDescriptor {
    /// Builds a descriptor from a discovered entry and the loader's symbol
    /// table, evaluating the metadata and config-options accessors.
    pub async fn build(entry: &ModuleEntry, table: SymbolTable) -> Result<Self, ModuleError> {
        let functions = table.operations_for(&entry.name);
        let metadata =
            evaluate_accessor(entry, METADATA_OPERATION, functions.get(METADATA_OPERATION)).await?;
        let config_options = evaluate_accessor(
            entry,
            CONFIG_OPTIONS_OPERATION,
            functions.get(CONFIG_OPTIONS_OPERATION),
        )
        .await?;

        Ok(Self {
            category: entry.category,
            name: entry.name.clone(),
            file_location: entry.entry_file.clone(),
            metadata,
            config_options,
            loaded_at: Utc::now(),
            functions,
            hooks: table.hooks().to_vec(),
        })
    }

    /// Discovered operation names, sorted.
    pub fn operations(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    /// Whether the module exposes `operation`.
    pub fn has_operation(&self, operation: &str) -> bool {
        self.functions.contains_key(operation)
    }

    /// Whether a `ConfigOptions` accessor is exported.
    pub fn has_config_accessor(&self) -> bool {
        self.has_operation(CONFIG_OPTIONS_OPERATION)
    }

    /// The callable behind `operation`.
    pub fn function(&self, operation: &str) -> Option<Arc<dyn ModuleFunction>> {
        self.functions.get(operation).cloned()
    }

    /// Hook registrations shipped with the module.
    pub fn hooks(&self) -> &[ModuleHook] {
        &self.hooks
    }

    /// Serializable summary.
    pub fn summary(&self) -> DescriptorSummary {
        DescriptorSummary {
            category: self.category,
            name: self.name.clone(),
            file: self.file_location.display().to_string(),
            metadata: self.metadata.clone(),
            functions: self.operations().into_iter().map(str::to_string).collect(),
            hooks: self.hooks.iter().map(|h| h.point.clone()).collect(),
            loaded_at: self.loaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleFault;
    use crate::manifest::EntryManifest;
    use serde_json::json;

    fn entry() -> ModuleEntry {
        ModuleEntry {
            category: ModuleCategory::Provisioning,
            name: "acme".to_string(),
            directory: PathBuf::from("servers/acme"),
            entry_file: PathBuf::from("servers/acme/acme.toml"),
            manifest: EntryManifest::default(),
        }
    }

    #[tokio::test]
    async fn test_accessors_are_evaluated_at_build() {
        let table = SymbolTable::new()
            .with_fn("acme_MetaData", |_| Ok(json!({ "DisplayName": "Acme" })))
            .with_fn("acme_ConfigOptions", |_| Ok(json!({ "Plan": { "Type": "text" } })))
            .with_fn("acme_CreateAccount", |_| Ok(json!("success")));

        let descriptor = ModuleDescriptor::build(&entry(), table).await.unwrap();
        assert_eq!(descriptor.metadata["DisplayName"], "Acme");
        assert!(descriptor.config_options.contains_key("Plan"));
        assert_eq!(
            descriptor.operations(),
            vec!["ConfigOptions", "CreateAccount", "MetaData"]
        );
    }

    #[tokio::test]
    async fn test_missing_accessors_default_to_empty() {
        let table = SymbolTable::new().with_fn("acme_CreateAccount", |_| Ok(json!("success")));
        let descriptor = ModuleDescriptor::build(&entry(), table).await.unwrap();
        assert!(descriptor.metadata.is_empty());
        assert!(descriptor.config_options.is_empty());
        assert!(!descriptor.has_config_accessor());
    }

    #[tokio::test]
    async fn test_failing_accessor_fails_the_load() {
        let table = SymbolTable::new()
            .with_fn("acme_MetaData", |_| Err(ModuleFault::new("no metadata today")));
        let err = ModuleDescriptor::build(&entry(), table).await.unwrap_err();
        assert!(matches!(err, ModuleError::Load { .. }));
    }
}
