//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tempfile::TempDir;

use numz_core::config::AppConfig;
use numz_core::types::billing::{Product, Service, ServiceStatus};
use numz_module::{
    LoaderKind, ModuleCategory, ModuleEntry, ModuleError, ModuleLoader, NativeModuleLoader,
    SymbolTable,
};
use numz_plugin::PluginCatalog;
use numz_runtime::{CompatRuntime, RuntimeBuilder};

/// Native loader that counts how often an entry is actually loaded.
pub struct CountingLoader {
    inner: NativeModuleLoader,
    loads: Arc<AtomicUsize>,
}

#[async_trait]
impl ModuleLoader for CountingLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Native
    }

    async fn load(&self, entry: &ModuleEntry) -> Result<SymbolTable, ModuleError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(entry).await
    }
}

/// A runtime over a temporary module and plugin tree.
pub struct TestRuntime {
    pub runtime: CompatRuntime,
    loads: Arc<AtomicUsize>,
    _tmp: TempDir,
}

impl TestRuntime {
    /// Default configuration, no plugins.
    pub async fn new() -> Self {
        Self::with(|_| {}, PluginCatalog::new()).await
    }

    /// Customised configuration and plugin catalog. Plugin files must be
    /// written with [`write_plugin_file`] before [`CompatRuntime::bootstrap`].
    pub async fn with(configure: impl FnOnce(&mut AppConfig), catalog: PluginCatalog) -> Self {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let mut config = AppConfig::default();
        config.modules.root = tmp.path().join("modules").display().to_string();
        config.plugins.directory = tmp.path().join("plugins").display().to_string();
        config.logging.level = "debug".to_string();
        configure(&mut config);

        let native = NativeModuleLoader::new();
        let loads = Arc::new(AtomicUsize::new(0));
        let runtime = RuntimeBuilder::new(config)
            .native_modules(native.clone())
            .loader(Arc::new(CountingLoader {
                inner: native,
                loads: Arc::clone(&loads),
            }))
            .plugins(catalog)
            .build()
            .expect("Failed to build runtime");
        runtime
            .modules()
            .ensure_directories()
            .await
            .expect("Failed to create module directories");

        Self {
            runtime,
            loads,
            _tmp: tmp,
        }
    }

    /// Writes a module entry file and registers its symbol table.
    pub async fn install(&self, category: ModuleCategory, name: &str, table: SymbolTable) {
        let dir = self.module_dir(category, name);
        tokio::fs::create_dir_all(&dir).await.expect("Failed to create module dir");
        tokio::fs::write(dir.join(format!("{name}.toml")), "")
            .await
            .expect("Failed to write entry file");
        self.runtime.native_modules().register(category, name, table);
    }

    pub fn module_dir(&self, category: ModuleCategory, name: &str) -> std::path::PathBuf {
        self.runtime
            .modules()
            .root()
            .join(category.directory())
            .join(name)
    }

    /// Number of uncached module loads so far.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Writes a file under the plugin directory.
    pub async fn write_plugin_file(&self, relative: &str, contents: &str) {
        let root = Path::new(&self.runtime.config().plugins.directory);
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.expect("Failed to create plugin dir");
        }
        tokio::fs::write(path, contents).await.expect("Failed to write plugin file");
    }

    /// Inserts a product bound to `module` and a pending service for `client_id`.
    pub async fn create_service(&self, client_id: i64, module: Option<&str>) -> Service {
        let store = self.runtime.store();
        let product = store
            .insert_product(Product {
                id: 0,
                name: "Test VPS".to_string(),
                server_module: module.map(str::to_string),
                server_id: Some(1),
            })
            .await
            .expect("Failed to insert product");
        store
            .insert_service(Service {
                id: 0,
                client_id,
                product_id: product.id,
                domain: Some("example.test".to_string()),
                username: None,
                password: None,
                status: ServiceStatus::Pending,
                custom_fields: Map::new(),
                config_options: Map::from_iter([("ram".to_string(), Value::from("2G"))]),
            })
            .await
            .expect("Failed to insert service")
    }
}
