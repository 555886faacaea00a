//! moka-backed cache where every entry carries its own lifetime.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use numz_core::result::AppResult;
use numz_core::traits::cache::CacheProvider;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process cache honouring a TTL per entry.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    entries: Cache<String, Entry>,
    default_ttl: Duration,
}

impl MemoryCacheProvider {
    /// A cache bounded to `max_entries`; entries stored without a TTL
    /// expire after `default_ttl`.
    pub fn new(max_entries: u64, default_ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .expire_after(EntryTtl)
                .build(),
            default_ttl,
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).await.map(|entry| entry.value))
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> AppResult<()> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(key.to_string(), Entry { value, ttl }).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<bool> {
        Ok(self.entries.remove(key).await.is_some())
    }

    async fn remove_prefix(&self, prefix: &str) -> AppResult<u64> {
        let matching: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        let mut removed = 0;
        for key in matching {
            if self.entries.remove(&key).await.is_some() {
                removed += 1;
            }
        }
        debug!(prefix, removed, "Removed cache entries by prefix");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(100, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_remove_reports_presence() {
        let cache = provider();
        cache.put("numz:active:servers", "[\"acme\"]".into(), None).await.unwrap();
        assert_eq!(
            cache.get("numz:active:servers").await.unwrap().as_deref(),
            Some("[\"acme\"]")
        );
        assert!(cache.remove("numz:active:servers").await.unwrap());
        assert!(!cache.remove("numz:active:servers").await.unwrap());
    }

    #[tokio::test]
    async fn test_short_ttl_expires_independently() {
        let cache = provider();
        cache.put("short", "1".into(), Some(Duration::from_millis(50))).await.unwrap();
        cache.put("long", "1".into(), None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.get("short").await.unwrap(), None);
        assert!(cache.get("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_prefix_leaves_other_keys() {
        let cache = provider();
        for key in ["numz:active:servers", "numz:active:addons", "numz:plugins:manifest:x"] {
            cache.put(key, "[]".into(), None).await.unwrap();
        }
        assert_eq!(cache.remove_prefix("numz:active:").await.unwrap(), 2);
        assert!(cache.get("numz:plugins:manifest:x").await.unwrap().is_some());
    }
}
