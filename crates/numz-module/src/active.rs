//! Sources for "which modules are in use" queries.
//!
//! The registry does not decide which modules are active; it asks an
//! [`ActiveModuleSource`] and caches the answer.

use std::sync::Arc;

use async_trait::async_trait;

use numz_core::config::modules::ModuleConfig;
use numz_core::result::AppResult;
use numz_core::traits::store::BillingStore;

use crate::category::ModuleCategory;

/// Names of the modules currently in use, per category.
#[async_trait]
pub trait ActiveModuleSource: Send + Sync + 'static {
    /// Active module names for a category, in the source's order.
    async fn active_names(&self, category: ModuleCategory) -> AppResult<Vec<String>>;
}

/// Active sets taken from configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigActiveSource {
    addons: Vec<String>,
    gateways: Vec<String>,
}

impl ConfigActiveSource {
    /// Reads `modules.active_addons` and `modules.active_gateways`.
    pub fn from_config(config: &ModuleConfig) -> Self {
        Self {
            addons: config.active_addons.clone(),
            gateways: config.active_gateways.clone(),
        }
    }
}

#[async_trait]
impl ActiveModuleSource for ConfigActiveSource {
    async fn active_names(&self, category: ModuleCategory) -> AppResult<Vec<String>> {
        Ok(match category {
            ModuleCategory::Addon => self.addons.clone(),
            ModuleCategory::Payment => self.gateways.clone(),
            _ => Vec::new(),
        })
    }
}

/// Provisioning modules referenced by products in the billing store; other
/// categories fall back to configuration.
pub struct StoreActiveSource {
    store: Arc<dyn BillingStore>,
    fallback: ConfigActiveSource,
}

impl StoreActiveSource {
    /// Creates a source over a billing store.
    pub fn new(store: Arc<dyn BillingStore>, fallback: ConfigActiveSource) -> Self {
        Self { store, fallback }
    }
}

#[async_trait]
impl ActiveModuleSource for StoreActiveSource {
    async fn active_names(&self, category: ModuleCategory) -> AppResult<Vec<String>> {
        match category {
            ModuleCategory::Provisioning => self.store.product_server_modules().await,
            other => self.fallback.active_names(other).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_config_source_serves_addons_and_gateways() {
        let config = ModuleConfig {
            active_addons: vec!["licensing".to_string()],
            active_gateways: vec!["stripe".to_string()],
            ..ModuleConfig::default()
        };
        let source = ConfigActiveSource::from_config(&config);
        assert_eq!(
            source.active_names(ModuleCategory::Addon).await.unwrap(),
            vec!["licensing".to_string()]
        );
        assert_eq!(
            source.active_names(ModuleCategory::Payment).await.unwrap(),
            vec!["stripe".to_string()]
        );
        assert!(source
            .active_names(ModuleCategory::Provisioning)
            .await
            .unwrap()
            .is_empty());
    }
}
