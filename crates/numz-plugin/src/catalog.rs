//! Compiled-in plugin factories, keyed by plugin class name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::locator;
use crate::manifest::PluginManifest;
use crate::plugin::Plugin;

/// Builds a plugin instance from its entry manifest.
pub type PluginFactory = Arc<dyn Fn(&PluginManifest) -> Arc<dyn Plugin> + Send + Sync>;

/// The set of plugin classes this binary can instantiate.
#[derive(Clone, Default)]
pub struct PluginCatalog {
    factories: HashMap<String, PluginFactory>,
}

impl std::fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("classes", &self.classes())
            .finish()
    }
}

impl PluginCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under an explicit class name (`SocialAuthPlugin`).
    pub fn register<F>(&mut self, class: &str, factory: F)
    where
        F: Fn(&PluginManifest) -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        self.factories.insert(class.to_string(), Arc::new(factory));
    }

    /// Registers a factory under the class name derived from a plugin name.
    pub fn with_plugin<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&PluginManifest) -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        self.register(&locator::class_name(name), factory);
        self
    }

    /// Factory for `class`.
    pub fn get(&self, class: &str) -> Option<PluginFactory> {
        self.factories.get(class).cloned()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.factories.contains_key(class)
    }

    /// Registered class names, sorted.
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.factories.keys().cloned().collect();
        classes.sort();
        classes
    }
}
