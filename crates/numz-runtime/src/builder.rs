//! Runtime construction.

use std::sync::Arc;

use tracing::info;

use numz_cache::CacheManager;
use numz_command::{CommandDispatcher, MemoryBillingStore, handlers};
use numz_core::config::AppConfig;
use numz_core::result::AppResult;
use numz_core::traits::store::BillingStore;
use numz_module::{
    ActiveModuleSource, ConfigActiveSource, LoaderSet, ModuleLoader, ModuleRegistry,
    NativeModuleLoader, StoreActiveSource,
};
use numz_plugin::{BusHost, HookBus, PluginCatalog, PluginHost, PluginManager};

use crate::runtime::CompatRuntime;

/// Assembles a [`CompatRuntime`].
///
/// Defaults: an empty native loader, an in-memory billing store, an empty
/// plugin catalog and a host that registers plugin hooks on the bus.
pub struct RuntimeBuilder {
    config: AppConfig,
    store: Option<Arc<dyn BillingStore>>,
    native: NativeModuleLoader,
    extra_loaders: Vec<Arc<dyn ModuleLoader>>,
    catalog: PluginCatalog,
    host: Option<Arc<dyn PluginHost>>,
}

impl RuntimeBuilder {
    /// Starts from `config` with an in-memory store, the native loader and
    /// no plugins.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: None,
            native: NativeModuleLoader::new(),
            extra_loaders: Vec::new(),
            catalog: PluginCatalog::new(),
            host: None,
        }
    }

    /// Uses `store` as the billing data model.
    pub fn store(mut self, store: Arc<dyn BillingStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses `native` for compiled-in modules.
    pub fn native_modules(mut self, native: NativeModuleLoader) -> Self {
        self.native = native;
        self
    }

    /// Adds a loader, replacing the default loader of the same kind.
    pub fn loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.extra_loaders.push(loader);
        self
    }

    /// Plugin classes that may be instantiated from the installed manifest.
    pub fn plugins(mut self, catalog: PluginCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the bus-backed plugin host.
    pub fn plugin_host(mut self, host: Arc<dyn PluginHost>) -> Self {
        self.host = Some(host);
        self
    }

    /// Builds the runtime. No filesystem work happens until
    /// [`CompatRuntime::bootstrap`].
    pub fn build(self) -> AppResult<CompatRuntime> {
        let config = self.config;
        let cache = CacheManager::new(&config.cache)?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryBillingStore::new()));

        let mut loaders = LoaderSet::new().with(Arc::new(self.native.clone()));
        #[cfg(feature = "dynamic")]
        {
            loaders = loaders.with(Arc::new(numz_module::loader::dynamic::DynamicModuleLoader::new()));
        }
        for loader in self.extra_loaders {
            loaders = loaders.with(loader);
        }

        let active: Arc<dyn ActiveModuleSource> = Arc::new(StoreActiveSource::new(
            store.clone(),
            ConfigActiveSource::from_config(&config.modules),
        ));
        let modules = Arc::new(ModuleRegistry::new(&config.modules, loaders, cache.clone(), active));

        let hooks = Arc::new(HookBus::new(&config.hooks));
        let host = self
            .host
            .unwrap_or_else(|| Arc::new(BusHost::new(hooks.clone())));
        let plugins = Arc::new(PluginManager::new(&config.plugins, self.catalog, cache.clone(), host));

        let mut dispatcher = CommandDispatcher::new(&config.commands);
        handlers::register_standard(&mut dispatcher, store.clone(), modules.clone());

        info!(
            module_root = %config.modules.root,
            plugin_dir = %config.plugins.directory,
            commands = dispatcher.commands().len(),
            "Runtime assembled"
        );

        Ok(CompatRuntime {
            config,
            cache,
            store,
            native: self.native,
            modules,
            hooks,
            plugins,
            commands: Arc::new(dispatcher),
        })
    }
}
