//! Loader for modules compiled into the host.
//!
//! Instead of resolving `<module>_<Operation>` names at run time, native
//! modules register their symbol table once at startup; loading is a table
//! lookup.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use crate::category::ModuleCategory;
use crate::discovery::ModuleEntry;
use crate::error::ModuleError;
use crate::manifest::LoaderKind;
use crate::symbol::SymbolTable;

use super::ModuleLoader;

/// Registration table of compiled-in modules.
#[derive(Debug, Clone, Default)]
pub struct NativeModuleLoader {
    tables: Arc<DashMap<(ModuleCategory, String), SymbolTable>>,
}

impl NativeModuleLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the symbol table for a module, replacing any previous one.
    pub fn register(&self, category: ModuleCategory, name: &str, table: SymbolTable) {
        info!(
            category = %category,
            module = %name,
            symbols = table.symbols().count(),
            "Native module registered"
        );
        self.tables.insert((category, name.to_string()), table);
    }

    /// Whether a module is registered.
    pub fn contains(&self, category: ModuleCategory, name: &str) -> bool {
        self.tables.contains_key(&(category, name.to_string()))
    }
}

#[async_trait]
impl ModuleLoader for NativeModuleLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Native
    }

    async fn load(&self, entry: &ModuleEntry) -> Result<SymbolTable, ModuleError> {
        self.tables
            .get(&(entry.category, entry.name.clone()))
            .map(|table| table.value().clone())
            .ok_or_else(|| ModuleError::Load {
                category: entry.category,
                name: entry.name.clone(),
                reason: "no native implementation is registered".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::EntryManifest;
    use serde_json::json;
    use std::path::PathBuf;

    fn entry(name: &str) -> ModuleEntry {
        ModuleEntry {
            category: ModuleCategory::Provisioning,
            name: name.to_string(),
            directory: PathBuf::from("servers").join(name),
            entry_file: PathBuf::from("servers").join(name).join(format!("{name}.toml")),
            manifest: EntryManifest::default(),
        }
    }

    #[tokio::test]
    async fn test_registered_table_is_returned() {
        let loader = NativeModuleLoader::new();
        loader.register(
            ModuleCategory::Provisioning,
            "acme",
            SymbolTable::new().with_fn("acme_CreateAccount", |_| Ok(json!("success"))),
        );
        let table = loader.load(&entry("acme")).await.unwrap();
        assert_eq!(table.symbols().collect::<Vec<_>>(), vec!["acme_CreateAccount"]);
    }

    #[tokio::test]
    async fn test_unregistered_module_is_load_error() {
        let loader = NativeModuleLoader::new();
        let err = loader.load(&entry("ghost")).await.unwrap_err();
        assert!(matches!(err, ModuleError::Load { .. }));
    }
}
