//! Registry of loaded plugins, kept in manifest order.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use numz_core::error::AppError;
use numz_core::result::AppResult;

use crate::plugin::{Plugin, PluginDescriptor};

/// A loaded plugin and its descriptor.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    pub descriptor: PluginDescriptor,
    pub instance: Arc<dyn Plugin>,
}

/// Ordered registry of loaded plugins.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: RwLock<Vec<LoadedPlugin>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin. Names are unique, compared case-insensitively.
    pub async fn register(&self, plugin: LoadedPlugin) -> AppResult<()> {
        let mut plugins = self.plugins.write().await;
        if plugins
            .iter()
            .any(|p| p.descriptor.name.eq_ignore_ascii_case(&plugin.descriptor.name))
        {
            return Err(AppError::conflict(format!(
                "Plugin '{}' is already registered",
                plugin.descriptor.name
            )));
        }

        info!(
            plugin = %plugin.descriptor.name,
            identifier = %plugin.descriptor.identifier,
            version = %plugin.descriptor.version,
            "Registering plugin"
        );
        plugins.push(plugin);
        Ok(())
    }

    /// Finds a plugin by manifest name or identifier.
    pub async fn get(&self, name: &str) -> Option<LoadedPlugin> {
        let plugins = self.plugins.read().await;
        plugins
            .iter()
            .find(|p| p.descriptor.name.eq_ignore_ascii_case(name) || p.descriptor.identifier == name)
            .cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.get(name).await.is_some()
    }

    /// All plugins in load order.
    pub async fn all(&self) -> Vec<LoadedPlugin> {
        self.plugins.read().await.clone()
    }

    /// Descriptors in load order.
    pub async fn descriptors(&self) -> Vec<PluginDescriptor> {
        let plugins = self.plugins.read().await;
        plugins.iter().map(|p| p.descriptor.clone()).collect()
    }

    /// Number of loaded plugins.
    pub async fn count(&self) -> usize {
        self.plugins.read().await.len()
    }

    /// Removes every plugin, returning them in reverse load order.
    pub async fn drain_reverse(&self) -> Vec<LoadedPlugin> {
        let mut plugins = self.plugins.write().await;
        let mut drained: Vec<LoadedPlugin> = plugins.drain(..).collect();
        drained.reverse();
        drained
    }
}
