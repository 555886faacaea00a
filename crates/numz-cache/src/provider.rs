//! The cache handle shared by the registry and the plugin manager.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use numz_core::config::cache::CacheConfig;
use numz_core::error::AppError;
use numz_core::result::AppResult;
use numz_core::traits::cache::CacheProvider;

/// Cloneable handle over the configured backend.
#[derive(Debug, Clone)]
pub struct CacheManager {
    backend: Arc<dyn CacheProvider>,
}

impl CacheManager {
    /// Opens the backend named by `config.provider`.
    pub fn new(config: &CacheConfig) -> AppResult<Self> {
        let backend: Arc<dyn CacheProvider> = match config.provider.as_str() {
            #[cfg(feature = "memory")]
            "memory" => {
                info!(
                    max_entries = config.max_entries,
                    default_ttl_secs = config.default_ttl_seconds,
                    "Using in-memory cache"
                );
                Arc::new(crate::memory::MemoryCacheProvider::new(
                    config.max_entries,
                    Duration::from_secs(config.default_ttl_seconds),
                ))
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider '{other}'"
                )));
            }
        };
        Ok(Self { backend })
    }
}

#[async_trait]
impl CacheProvider for CacheManager {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.backend.get(key).await
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> AppResult<()> {
        self.backend.put(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> AppResult<bool> {
        self.backend.remove(key).await
    }

    async fn remove_prefix(&self, prefix: &str) -> AppResult<u64> {
        self.backend.remove_prefix(prefix).await
    }
}
