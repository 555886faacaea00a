//! Module registry: load, invoke, validate and cache modules.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use moka::future::Cache;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use numz_cache::{CacheManager, keys};
use numz_core::Params;
use numz_core::config::modules::{ModuleConfig, ModuleLogConfig};
use numz_core::error::{AppError, panic_message};
use numz_core::result::AppResult;
use numz_core::traits::cache::CacheProvider;

use crate::active::ActiveModuleSource;
use crate::category::ModuleCategory;
use crate::descriptor::ModuleDescriptor;
use crate::discovery::{self, DiscoveryReport};
use crate::error::ModuleError;
use crate::loader::LoaderSet;
use crate::validation::ValidationReport;

type DescriptorKey = (ModuleCategory, String);

/// Per-call invocation options.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Time budget for this call. Falls back to the configured default.
    pub timeout: Option<Duration>,
    /// Token that aborts the call when cancelled.
    pub cancel: Option<CancellationToken>,
}

impl InvokeOptions {
    /// Sets the time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the cancellation token.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Loads modules on demand and caches their descriptors.
///
/// Descriptors stay cached until explicitly invalidated (or until the
/// optional TTL lapses). File changes are never picked up automatically.
pub struct ModuleRegistry {
    root: PathBuf,
    extension: String,
    loaders: LoaderSet,
    descriptors: Cache<DescriptorKey, Arc<ModuleDescriptor>>,
    cache: CacheManager,
    active_source: Arc<dyn ActiveModuleSource>,
    active_ttl: Duration,
    default_timeout: Option<Duration>,
    log: ModuleLogConfig,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("root", &self.root)
            .field("extension", &self.extension)
            .field("loaders", &self.loaders)
            .field("cached_descriptors", &self.descriptors.entry_count())
            .finish()
    }
}

impl ModuleRegistry {
    /// Creates a registry from configuration.
    pub fn new(
        config: &ModuleConfig,
        loaders: LoaderSet,
        cache: CacheManager,
        active_source: Arc<dyn ActiveModuleSource>,
    ) -> Self {
        let mut builder = Cache::builder().support_invalidation_closures();
        if let Some(ttl) = config.cache_ttl_seconds {
            builder = builder.time_to_live(Duration::from_secs(ttl));
        }

        Self {
            root: PathBuf::from(&config.root),
            extension: config.entry_extension.clone(),
            loaders,
            descriptors: builder.build(),
            cache,
            active_source,
            active_ttl: Duration::from_secs(config.active_set_ttl_seconds),
            default_timeout: config.invoke_timeout_seconds.map(Duration::from_secs),
            log: config.log.clone(),
        }
    }

    /// Module root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates every category directory under the module root.
    pub async fn ensure_directories(&self) -> AppResult<()> {
        for category in ModuleCategory::ALL {
            let dir = discovery::category_dir(&self.root, category);
            if !tokio::fs::try_exists(&dir).await? {
                tokio::fs::create_dir_all(&dir).await?;
                info!(category = %category, dir = %dir.display(), "Created module category directory");
            }
        }
        Ok(())
    }

    /// Scans one category, or every category when `None`.
    pub async fn discover(&self, category: Option<ModuleCategory>) -> AppResult<DiscoveryReport> {
        let categories = match category {
            Some(c) => vec![c],
            None => ModuleCategory::ALL.to_vec(),
        };

        let mut report = DiscoveryReport::default();
        for category in categories {
            let results = discovery::scan_category(&self.root, category, &self.extension).await?;
            report.categories.insert(category, results);
        }

        info!(
            discovered = report.modules().count(),
            skipped = report.skipped().count(),
            "Module discovery complete"
        );
        Ok(report)
    }

    /// Loads a module, returning the cached descriptor when present.
    pub async fn load(
        &self,
        category: ModuleCategory,
        name: &str,
    ) -> Result<Arc<ModuleDescriptor>, ModuleError> {
        let key = (category, name.to_string());
        if let Some(descriptor) = self.descriptors.get(&key).await {
            debug!(category = %category, module = %name, "Module descriptor cache hit");
            return Ok(descriptor);
        }

        self.descriptors
            .try_get_with(key, self.load_uncached(category, name))
            .await
            .map_err(|e| e.as_ref().clone())
    }

    async fn load_uncached(
        &self,
        category: ModuleCategory,
        name: &str,
    ) -> Result<Arc<ModuleDescriptor>, ModuleError> {
        let entry = discovery::read_entry(&self.root, category, name, &self.extension)
            .await?
            .ok_or_else(|| ModuleError::ModuleNotFound {
                category,
                name: name.to_string(),
            })?;

        let table = self.loaders.load(&entry).await?;
        let descriptor = ModuleDescriptor::build(&entry, table).await?;

        info!(
            category = %category,
            module = %name,
            operations = descriptor.operations().len(),
            hooks = descriptor.hooks().len(),
            "Module loaded"
        );
        Ok(Arc::new(descriptor))
    }

    /// Loads every discovered module, logging and skipping failures.
    pub async fn load_discovered(&self, report: &DiscoveryReport) -> Vec<Arc<ModuleDescriptor>> {
        let mut loaded = Vec::new();
        for entry in report.modules() {
            match self.load(entry.category, &entry.name).await {
                Ok(descriptor) => loaded.push(descriptor),
                Err(e) => warn!(
                    category = %entry.category,
                    module = %entry.name,
                    error = %e,
                    "Discovered module failed to load"
                ),
            }
        }
        loaded
    }

    /// Invokes an operation with the default options.
    pub async fn invoke(
        &self,
        category: ModuleCategory,
        name: &str,
        operation: &str,
        params: &Params,
    ) -> Result<Value, ModuleError> {
        self.invoke_with(category, name, operation, params, InvokeOptions::default())
            .await
    }

    /// Invokes an operation.
    ///
    /// Module failures, panics, timeouts and cancellation all come back as
    /// [`ModuleError`]s; nothing the module does escapes this call.
    pub async fn invoke_with(
        &self,
        category: ModuleCategory,
        name: &str,
        operation: &str,
        params: &Params,
        options: InvokeOptions,
    ) -> Result<Value, ModuleError> {
        let result = self
            .invoke_inner(category, name, operation, params, options)
            .await;
        self.log_call(category, name, operation, params, &result);
        result
    }

    async fn invoke_inner(
        &self,
        category: ModuleCategory,
        name: &str,
        operation: &str,
        params: &Params,
        options: InvokeOptions,
    ) -> Result<Value, ModuleError> {
        let descriptor = self.load(category, name).await?;
        let function = descriptor
            .function(operation)
            .ok_or_else(|| ModuleError::OperationNotFound {
                category,
                name: name.to_string(),
                operation: operation.to_string(),
            })?;

        let timeout = options.timeout.or(self.default_timeout);
        let call = AssertUnwindSafe(function.call(params)).catch_unwind();
        let bounded = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                    ModuleError::TimedOut {
                        category,
                        name: name.to_string(),
                        operation: operation.to_string(),
                        timeout: limit,
                    }
                }),
                None => Ok(call.await),
            }
        };

        let outcome = match options.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(ModuleError::Cancelled {
                    category,
                    name: name.to_string(),
                    operation: operation.to_string(),
                }),
                outcome = bounded => outcome,
            },
            None => bounded.await,
        }?;

        let message = match outcome {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(fault)) => fault.message,
            Err(panic) => format!("Module panicked: {}", panic_message(panic.as_ref())),
        };

        Err(ModuleError::ModuleExecutionError {
            category,
            name: name.to_string(),
            operation: operation.to_string(),
            message,
        })
    }

    fn log_call(
        &self,
        category: ModuleCategory,
        name: &str,
        operation: &str,
        params: &Params,
        result: &Result<Value, ModuleError>,
    ) {
        if !self.log.enabled {
            return;
        }
        let request = self
            .log
            .log_requests
            .then(|| serde_json::to_string(params).unwrap_or_default());

        match result {
            Ok(response) => {
                let response = self.log.log_responses.then(|| response.to_string());
                info!(
                    category = %category,
                    module = %name,
                    operation = %operation,
                    request = request.as_deref(),
                    response = response.as_deref(),
                    "Module call succeeded"
                );
            }
            Err(e) if e.is_not_found() => {
                warn!(category = %category, module = %name, operation = %operation, error = %e, "Module call not routed");
            }
            Err(e) => {
                error!(
                    category = %category,
                    module = %name,
                    operation = %operation,
                    request = request.as_deref(),
                    error = %e,
                    "Module call failed"
                );
            }
        }
    }

    /// Validates a module against its category contract.
    pub async fn validate(&self, category: ModuleCategory, name: &str) -> ValidationReport {
        match self.load(category, name).await {
            Ok(descriptor) => ValidationReport::for_descriptor(&descriptor),
            Err(ModuleError::ModuleNotFound { .. }) => ValidationReport::missing(),
            Err(e) => ValidationReport::unloadable(&e.to_string()),
        }
    }

    /// Configuration options declared by a module, empty when it has none.
    pub async fn config_options(
        &self,
        category: ModuleCategory,
        name: &str,
    ) -> Result<Map<String, Value>, ModuleError> {
        Ok(self.load(category, name).await?.config_options.clone())
    }

    /// Names of the active modules in a category that load successfully.
    ///
    /// The answer is cached for the configured active-set TTL.
    pub async fn active_modules(&self, category: ModuleCategory) -> AppResult<Vec<String>> {
        let key = keys::active_modules(category.directory());
        if let Some(names) = self.cache.get_json::<Vec<String>>(&key).await? {
            debug!(category = %category, "Active module set cache hit");
            return Ok(names);
        }

        let mut names = Vec::new();
        for name in self.active_source.active_names(category).await? {
            if names.contains(&name) {
                continue;
            }
            match self.load(category, &name).await {
                Ok(_) => names.push(name),
                Err(e) => warn!(category = %category, module = %name, error = %e, "Active module failed to load"),
            }
        }

        self.cache.put_json(&key, &names, Some(self.active_ttl)).await?;
        Ok(names)
    }

    /// Provisioning modules referenced by at least one product.
    pub async fn active_provisioning_modules(&self) -> AppResult<Vec<String>> {
        self.active_modules(ModuleCategory::Provisioning).await
    }

    /// Active add-on modules.
    pub async fn active_addons(&self) -> AppResult<Vec<String>> {
        self.active_modules(ModuleCategory::Addon).await
    }

    /// Active payment gateways.
    pub async fn active_gateways(&self) -> AppResult<Vec<String>> {
        self.active_modules(ModuleCategory::Payment).await
    }

    /// Drops one cached descriptor.
    pub async fn invalidate(&self, category: ModuleCategory, name: &str) {
        self.descriptors.invalidate(&(category, name.to_string())).await;
        info!(category = %category, module = %name, "Module descriptor invalidated");
    }

    /// Drops every cached descriptor of a category and its active set.
    pub async fn invalidate_category(&self, category: ModuleCategory) -> AppResult<()> {
        self.descriptors
            .invalidate_entries_if(move |(c, _), _| *c == category)
            .map_err(|e| AppError::cache(format!("Cannot invalidate {category} modules: {e}")))?;
        self.cache
            .remove(&keys::active_modules(category.directory()))
            .await?;
        info!(category = %category, "Module category invalidated");
        Ok(())
    }

    /// Drops every cached descriptor and active set.
    pub async fn flush(&self) -> AppResult<()> {
        self.descriptors.invalidate_all();
        self.cache.remove_prefix(&keys::active_modules_prefix()).await?;
        info!("Module registry flushed");
        Ok(())
    }
}
