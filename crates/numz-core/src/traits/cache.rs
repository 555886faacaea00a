//! Cache seam for active-set answers and the installed-plugin list.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::result::AppResult;

/// Expiring string cache.
///
/// Values are JSON text. An entry written with `ttl: None` expires after the
/// provider's default lifetime.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// The live value under `key`.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> AppResult<()>;

    /// Removes `key`. Returns whether a live entry was removed.
    async fn remove(&self, key: &str) -> AppResult<bool>;

    /// Removes every key that starts with `prefix` and returns how many went.
    async fn remove_prefix(&self, prefix: &str) -> AppResult<u64>;

    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn put_json<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        self.put(key, serde_json::to_string(value)?, ttl).await
    }
}
