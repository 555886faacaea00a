//! Plugin manager: loads installed plugins and aggregates their capabilities.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use tracing::{error, info, warn};

use numz_cache::CacheManager;
use numz_core::Params;
use numz_core::config::plugin::PluginConfig;
use numz_core::error::panic_message;
use numz_core::result::AppResult;

use crate::capabilities::{AuthPage, Capability, FieldDefinition, MenuItem};
use crate::catalog::PluginCatalog;
use crate::hooks::bus::HookBus;
use crate::locator::{self, PluginLocator};
use crate::manifest::{self, PluginManifest};
use crate::plugin::{Plugin, PluginDescriptor};
use crate::registry::{LoadedPlugin, PluginRegistry};

/// The host application's registration mechanism.
#[async_trait]
pub trait PluginHost: Send + Sync {
    /// Registers a freshly instantiated plugin with the host.
    async fn register(&self, descriptor: &PluginDescriptor, plugin: Arc<dyn Plugin>) -> AppResult<()>;

    /// Removes everything the host registered for a plugin.
    async fn unregister(&self, descriptor: &PluginDescriptor) -> AppResult<()>;
}

/// Host that registers plugin hook listeners on a [`HookBus`].
#[derive(Debug, Clone)]
pub struct BusHost {
    bus: Arc<HookBus>,
}

impl BusHost {
    /// Registers plugin listeners on `bus`, owned by the plugin name.
    pub fn new(bus: Arc<HookBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl PluginHost for BusHost {
    async fn register(&self, descriptor: &PluginDescriptor, plugin: Arc<dyn Plugin>) -> AppResult<()> {
        for binding in plugin.hooks() {
            self.bus.add_owned_hook(binding, &descriptor.name).await;
        }
        Ok(())
    }

    async fn unregister(&self, descriptor: &PluginDescriptor) -> AppResult<()> {
        let removed = self.bus.registry().unregister_owner(&descriptor.name).await;
        info!(plugin = %descriptor.name, removed, "Plugin hooks removed");
        Ok(())
    }
}

/// A plugin that was listed but not loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPlugin {
    pub name: String,
    pub reason: String,
}

/// Outcome of [`PluginManager::load_all`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// Plugins loaded, in manifest order.
    pub loaded: Vec<String>,
    /// Plugins skipped with the reason.
    pub skipped: Vec<SkippedPlugin>,
}

/// Loads plugins listed in the installed manifest and queries them.
pub struct PluginManager {
    manifest_path: PathBuf,
    manifest_ttl: Duration,
    locator: PluginLocator,
    catalog: PluginCatalog,
    registry: Arc<PluginRegistry>,
    cache: CacheManager,
    host: Arc<dyn PluginHost>,
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("manifest_path", &self.manifest_path)
            .field("root", &self.locator.root())
            .field("catalog", &self.catalog)
            .finish()
    }
}

impl PluginManager {
    /// Creates a manager over the configured plugin directory.
    pub fn new(
        config: &PluginConfig,
        catalog: PluginCatalog,
        cache: CacheManager,
        host: Arc<dyn PluginHost>,
    ) -> Self {
        let root = PathBuf::from(&config.directory);
        Self {
            manifest_path: root.join(&config.manifest),
            manifest_ttl: Duration::from_secs(config.manifest_cache_ttl_seconds),
            locator: PluginLocator::new(root),
            catalog,
            registry: Arc::new(PluginRegistry::new()),
            cache,
            host,
        }
    }

    /// Loads every installed plugin.
    ///
    /// A plugin that cannot be located, instantiated, registered or booted is
    /// logged and skipped; the remaining plugins still load.
    pub async fn load_all(&self) -> AppResult<LoadReport> {
        let names =
            manifest::installed_plugins(&self.manifest_path, &self.cache, self.manifest_ttl).await?;
        info!(count = names.len(), manifest = %self.manifest_path.display(), "Loading plugins");

        let mut report = LoadReport::default();
        for name in names {
            match self.load_one(&name).await {
                Ok(()) => report.loaded.push(name),
                Err(reason) => {
                    warn!(plugin = %name, reason = %reason, "Plugin skipped");
                    report.skipped.push(SkippedPlugin { name, reason });
                }
            }
        }

        info!(
            loaded = report.loaded.len(),
            skipped = report.skipped.len(),
            "Plugins loaded"
        );
        Ok(report)
    }

    async fn load_one(&self, name: &str) -> Result<(), String> {
        if self.registry.contains(name).await {
            return Err("Plugin already loaded".to_string());
        }

        let Some(entry_file) = self.locator.locate(name).await else {
            return Err("Plugin file not found".to_string());
        };

        let text = tokio::fs::read_to_string(&entry_file)
            .await
            .map_err(|e| format!("Plugin file unreadable: {e}"))?;
        let manifest =
            PluginManifest::parse(&text).map_err(|e| format!("Plugin file invalid: {e}"))?;

        let class = locator::class_name(name);
        let Some(factory) = self.catalog.get(&class) else {
            return Err(format!("Plugin class {class} not found"));
        };
        // Construction runs plugin code, so a panic here skips the plugin.
        let built = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let instance = factory(&manifest);
            let identifier = instance.identifier().to_string();
            let capabilities = instance.capabilities();
            let hook_count = instance.hooks().len();
            (instance, identifier, capabilities, hook_count)
        }));
        let (instance, identifier, capabilities, hook_count) = built
            .map_err(|panic| format!("Plugin construction panicked: {}", panic_message(panic.as_ref())))?;

        let descriptor = PluginDescriptor {
            name: name.to_string(),
            identifier,
            display_name: manifest.name,
            version: manifest.version,
            description: manifest.description,
            author: manifest.author,
            entry_file,
            capabilities,
            hook_count,
        };

        self.host
            .register(&descriptor, instance.clone())
            .await
            .map_err(|e| format!("Host registration failed: {e}"))?;

        let booted = match AssertUnwindSafe(instance.boot()).catch_unwind().await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("Plugin boot failed: {e}")),
            Err(panic) => Err(format!("Plugin boot panicked: {}", panic_message(panic.as_ref()))),
        };
        if let Err(reason) = booted {
            if let Err(undo) = self.host.unregister(&descriptor).await {
                error!(plugin = %name, error = %undo, "Failed to unregister plugin after boot failure");
            }
            return Err(reason);
        }

        self.registry
            .register(LoadedPlugin {
                descriptor,
                instance,
            })
            .await
            .map_err(|e| e.to_string())
    }

    /// A loaded plugin by manifest name or identifier.
    pub async fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.registry.get(name).await.map(|p| p.instance)
    }

    /// Loaded plugins in manifest order.
    pub async fn plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.registry
            .all()
            .await
            .into_iter()
            .map(|p| p.instance)
            .collect()
    }

    /// Descriptors of loaded plugins in load order.
    pub async fn descriptors(&self) -> Vec<PluginDescriptor> {
        self.registry.descriptors().await
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Shuts plugins down in reverse load order and unregisters them.
    pub async fn shutdown(&self) {
        for plugin in self.registry.drain_reverse().await {
            let name = &plugin.descriptor.name;
            if let Err(e) = plugin.instance.shutdown().await {
                warn!(plugin = %name, error = %e, "Plugin shutdown returned error");
            }
            if let Err(e) = self.host.unregister(&plugin.descriptor).await {
                warn!(plugin = %name, error = %e, "Plugin unregistration failed");
            }
        }
        info!("All plugins shut down");
    }

    // ── Capability aggregation ─────────────────────────────

    /// Fields each plugin contributes for `platform`.
    pub async fn platform_fields_for(&self, platform: &str) -> BTreeMap<String, Vec<FieldDefinition>> {
        self.collect(|plugin| {
            plugin
                .as_platform_fields()
                .map(|p| p.platform_fields(platform))
                .filter(|fields| !fields.is_empty())
        })
        .await
    }

    /// Campaign fields each plugin contributes for `platform`.
    pub async fn campaign_fields_for(
        &self,
        platform: &str,
        platform_config: &Params,
    ) -> BTreeMap<String, Vec<FieldDefinition>> {
        self.collect(|plugin| {
            plugin
                .as_campaign_fields()
                .map(|p| p.campaign_fields(platform, platform_config))
                .filter(|fields| !fields.is_empty())
        })
        .await
    }

    /// Sidebar entries each plugin contributes.
    pub async fn sidebar_menu_items(&self) -> BTreeMap<String, Vec<MenuItem>> {
        self.collect(|plugin| {
            plugin
                .as_navigation()
                .map(|p| p.sidebar_menu_items())
                .filter(|items| !items.is_empty())
        })
        .await
    }

    /// Rendered auth buttons per plugin for `page`.
    pub async fn auth_buttons(&self, page: AuthPage) -> BTreeMap<String, String> {
        self.collect(|plugin| {
            plugin
                .as_auth()
                .map(|p| p.render_auth_buttons(page))
                .filter(|html| !html.trim().is_empty())
        })
        .await
    }

    /// Plugins that provide authentication, in load order.
    pub async fn auth_plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.plugins()
            .await
            .into_iter()
            .filter(|p| p.as_auth().is_some())
            .collect()
    }

    /// Identifiers of the plugins implementing `capability`, in load order.
    pub async fn providers(&self, capability: Capability) -> Vec<String> {
        self.registry
            .descriptors()
            .await
            .into_iter()
            .filter(|d| d.capabilities.contains(&capability))
            .map(|d| d.identifier)
            .collect()
    }

    /// Keyed by identifier. When two plugins share one, the later plugin in
    /// load order wins and the collision is logged.
    async fn collect<T>(&self, ask: impl Fn(&dyn Plugin) -> Option<T>) -> BTreeMap<String, T> {
        let mut answers = BTreeMap::new();
        for plugin in self.plugins().await {
            let Some(value) = ask(plugin.as_ref()) else {
                continue;
            };
            let identifier = plugin.identifier().to_string();
            if answers.insert(identifier.clone(), value).is_some() {
                warn!(identifier = %identifier, "Plugins share an identifier; earlier contribution replaced");
            }
        }
        answers
    }
}
