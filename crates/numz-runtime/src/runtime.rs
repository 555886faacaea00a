//! The assembled runtime and its startup pass.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use numz_cache::CacheManager;
use numz_command::CommandDispatcher;
use numz_core::config::AppConfig;
use numz_core::result::AppResult;
use numz_core::traits::store::BillingStore;
use numz_module::{ModuleCategory, ModuleRegistry, NativeModuleLoader};
use numz_plugin::{HookBinding, HookBus, LoadReport, PluginManager};

/// What the startup pass did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BootstrapReport {
    /// Modules found on disk.
    pub discovered: usize,
    /// Modules skipped during discovery, with the reason.
    pub skipped_modules: Vec<String>,
    /// Modules loaded into the registry.
    pub loaded: usize,
    /// Hook listeners registered by modules.
    pub module_hooks: usize,
    /// Plugin load outcome; `None` when plugins are not auto-loaded.
    pub plugins: Option<LoadReport>,
}

/// The four runtime components plus the shared collaborators they use.
pub struct CompatRuntime {
    pub(crate) config: AppConfig,
    pub(crate) cache: CacheManager,
    pub(crate) store: Arc<dyn BillingStore>,
    pub(crate) native: NativeModuleLoader,
    pub(crate) modules: Arc<ModuleRegistry>,
    pub(crate) hooks: Arc<HookBus>,
    pub(crate) plugins: Arc<PluginManager>,
    pub(crate) commands: Arc<CommandDispatcher>,
}

impl std::fmt::Debug for CompatRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompatRuntime")
            .field("modules", &self.config.modules.root)
            .field("plugins", &self.config.plugins.directory)
            .finish()
    }
}

impl CompatRuntime {
    /// Runs the startup pass.
    ///
    /// Discovery and loading skip broken modules, and plugin loading skips
    /// broken plugins; only structural failures (unwritable module root,
    /// unreadable plugin manifest) abort.
    pub async fn bootstrap(&self) -> AppResult<BootstrapReport> {
        if self.config.hooks.declare_catalog {
            self.hooks.registry().declare_catalog().await;
        }

        self.modules.ensure_directories().await?;
        let discovery = self.modules.discover(None).await?;
        let mut report = BootstrapReport {
            discovered: discovery.modules().count(),
            skipped_modules: discovery.skipped().map(|e| e.to_string()).collect(),
            ..BootstrapReport::default()
        };

        let descriptors = self.modules.load_discovered(&discovery).await;
        report.loaded = descriptors.len();

        for descriptor in descriptors.iter().filter(|d| d.category.carries_hooks()) {
            let owner = module_owner(descriptor.category, &descriptor.name);
            for hook in descriptor.hooks() {
                self.hooks
                    .add_owned_hook(
                        HookBinding::new(hook.point.clone(), hook.priority, hook.handler.clone()),
                        &owner,
                    )
                    .await;
                report.module_hooks += 1;
            }
        }

        if self.config.plugins.auto_load {
            report.plugins = Some(self.plugins.load_all().await?);
        }

        if !report.skipped_modules.is_empty() {
            warn!(skipped = report.skipped_modules.len(), "Some modules were skipped during discovery");
        }
        info!(
            discovered = report.discovered,
            loaded = report.loaded,
            module_hooks = report.module_hooks,
            plugins = report.plugins.as_ref().map(|p| p.loaded.len()).unwrap_or(0),
            "Runtime bootstrap complete"
        );
        Ok(report)
    }

    /// Removes a module's hooks and its cached descriptor.
    pub async fn unload_module(&self, category: ModuleCategory, name: &str) -> usize {
        let removed = self
            .hooks
            .registry()
            .unregister_owner(&module_owner(category, name))
            .await;
        self.modules.invalidate(category, name).await;
        removed
    }

    /// Shuts plugins down in reverse load order.
    pub async fn shutdown(&self) {
        self.plugins.shutdown().await;
        info!("Runtime shut down");
    }

    /// The configuration the runtime was built from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// The billing data model handlers read and write.
    pub fn store(&self) -> &Arc<dyn BillingStore> {
        &self.store
    }

    /// Loader for compiled-in modules; register symbol tables here.
    pub fn native_modules(&self) -> &NativeModuleLoader {
        &self.native
    }

    /// The module registry.
    pub fn modules(&self) -> &Arc<ModuleRegistry> {
        &self.modules
    }

    /// The hook bus shared by modules and plugins.
    pub fn hooks(&self) -> &Arc<HookBus> {
        &self.hooks
    }

    /// The plugin manager.
    pub fn plugins(&self) -> &Arc<PluginManager> {
        &self.plugins
    }

    /// The legacy command dispatcher.
    pub fn commands(&self) -> &Arc<CommandDispatcher> {
        &self.commands
    }
}

/// Hook owner tag for a module.
fn module_owner(category: ModuleCategory, name: &str) -> String {
    format!("module:{}/{name}", category.directory())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::RuntimeBuilder;
    use numz_core::Params;
    use numz_module::SymbolTable;
    use numz_plugin::ClosureHandler;
    use serde_json::json;
    use tempfile::TempDir;

    fn config(tmp: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.modules.root = tmp.path().join("modules").display().to_string();
        config.plugins.directory = tmp.path().join("plugins").display().to_string();
        config
    }

    async fn install(runtime: &CompatRuntime, category: ModuleCategory, name: &str, table: SymbolTable) {
        let dir = runtime.modules().root().join(category.directory()).join(name);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(format!("{name}.toml")), "").await.unwrap();
        runtime.native_modules().register(category, name, table);
    }

    #[tokio::test]
    async fn test_bootstrap_registers_module_hooks() {
        let tmp = TempDir::new().unwrap();
        let runtime = RuntimeBuilder::new(config(&tmp)).build().unwrap();

        let listener = ClosureHandler::new("licensing.invoice_paid", |_| async { Ok(json!("noted")) });
        let table = SymbolTable::new()
            .with_fn("licensing_config", |_| Ok(json!({ "name": "Licensing" })))
            .with_hook("InvoicePaid", 1, Arc::new(listener));
        install(&runtime, ModuleCategory::Addon, "licensing", table).await;

        let report = runtime.bootstrap().await.unwrap();
        assert_eq!(report.discovered, 1);
        assert_eq!(report.loaded, 1);
        assert_eq!(report.module_hooks, 1);
        assert!(report.plugins.unwrap().loaded.is_empty());

        let outcomes = runtime.hooks().run("InvoicePaid", &Params::new()).await;
        assert_eq!(outcomes.len(), 1);
        assert!(runtime.hooks().is_declared("DailyCronJob").await);

        assert_eq!(runtime.unload_module(ModuleCategory::Addon, "licensing").await, 1);
        assert!(!runtime.hooks().has_hook("InvoicePaid").await);
    }

    #[tokio::test]
    async fn test_bootstrap_on_empty_tree_creates_directories() {
        let tmp = TempDir::new().unwrap();
        let runtime = RuntimeBuilder::new(config(&tmp)).build().unwrap();
        let report = runtime.bootstrap().await.unwrap();

        assert_eq!(report.discovered, 0);
        for category in ModuleCategory::ALL {
            assert!(runtime.modules().root().join(category.directory()).is_dir());
        }
        assert!(runtime.commands().has_command("AddClient"));
        runtime.shutdown().await;
    }
}
