//! Plugin manifests: the installed-plugin list and per-plugin entry files.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use numz_cache::{CacheManager, keys};
use numz_core::error::AppError;
use numz_core::result::AppResult;
use numz_core::traits::cache::CacheProvider;

/// Contents of a plugin entry file (`<Studly>Plugin.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Display name.
    pub name: String,
    /// Declared version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Author.
    #[serde(default)]
    pub author: String,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl PluginManifest {
    /// Parses an entry file.
    pub fn parse(text: &str) -> AppResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Reads the ordered list of installed plugin names.
///
/// A missing manifest means no plugins. The list is cached for `ttl`.
pub async fn installed_plugins(
    path: &Path,
    cache: &CacheManager,
    ttl: Duration,
) -> AppResult<Vec<String>> {
    let key = keys::plugin_manifest(&path.display().to_string());
    if let Some(names) = cache.get_json::<Vec<String>>(&key).await? {
        debug!(path = %path.display(), "Installed plugin manifest cache hit");
        return Ok(names);
    }

    let names: Vec<String> = match tokio::fs::read_to_string(path).await {
        Ok(text) => serde_json::from_str(&text).map_err(|e| {
            AppError::plugin(format!(
                "Plugin manifest '{}' is not a JSON array of names: {e}",
                path.display()
            ))
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    cache.put_json(&key, &names, Some(ttl)).await?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use numz_core::config::cache::CacheConfig;
    use tempfile::TempDir;

    #[test]
    fn test_entry_defaults() {
        let manifest = PluginManifest::parse("name = \"Social Auth\"").unwrap();
        assert_eq!(manifest.version, "1.0.0");
        assert!(manifest.author.is_empty());
        assert!(PluginManifest::parse("version = \"2\"").is_err());
    }

    #[tokio::test]
    async fn test_missing_manifest_means_no_plugins() {
        let tmp = TempDir::new().unwrap();
        let cache = CacheManager::new(&CacheConfig::default()).unwrap();
        let names = installed_plugins(&tmp.path().join("installed.json"), &cache, Duration::from_secs(60))
            .await
            .unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_manifest_is_cached() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("installed.json");
        tokio::fs::write(&path, r#"["crm", "social-auth"]"#).await.unwrap();
        let cache = CacheManager::new(&CacheConfig::default()).unwrap();

        let first = installed_plugins(&path, &cache, Duration::from_secs(60)).await.unwrap();
        tokio::fs::write(&path, r#"["other"]"#).await.unwrap();
        let second = installed_plugins(&path, &cache, Duration::from_secs(60)).await.unwrap();
        assert_eq!(first, vec!["crm".to_string(), "social-auth".to_string()]);
        assert_eq!(first, second);
    }
}
