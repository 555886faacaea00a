//! Module loaders: turn a discovered entry into a symbol table.

#[cfg(feature = "dynamic")]
pub mod dynamic;
#[cfg(feature = "dynamic")]
pub mod ffi;
pub mod native;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::discovery::ModuleEntry;
use crate::error::ModuleError;
use crate::manifest::LoaderKind;
use crate::symbol::SymbolTable;

/// Produces the exported symbols of a module entry.
#[async_trait]
pub trait ModuleLoader: Send + Sync + 'static {
    /// The entry kind this loader handles.
    fn kind(&self) -> LoaderKind;

    /// Load the module behind `entry`.
    async fn load(&self, entry: &ModuleEntry) -> Result<SymbolTable, ModuleError>;
}

/// Loaders keyed by the entry kind they handle.
#[derive(Clone, Default)]
pub struct LoaderSet {
    loaders: HashMap<LoaderKind, Arc<dyn ModuleLoader>>,
}

impl std::fmt::Debug for LoaderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderSet")
            .field("kinds", &self.loaders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LoaderSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a loader, replacing any loader of the same kind.
    pub fn with(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loaders.insert(loader.kind(), loader);
        self
    }

    /// Loads an entry with the loader matching its declared kind.
    pub async fn load(&self, entry: &ModuleEntry) -> Result<SymbolTable, ModuleError> {
        let kind = entry.manifest.loader;
        let loader = self.loaders.get(&kind).ok_or_else(|| ModuleError::Load {
            category: entry.category,
            name: entry.name.clone(),
            reason: format!("no {kind} loader is configured"),
        })?;
        loader.load(entry).await
    }
}
