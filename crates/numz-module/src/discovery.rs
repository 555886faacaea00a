//! On-disk discovery of module entry files.
//!
//! Layout: `<root>/<category dir>/<name>/<name>.<ext>`. A single module with
//! a missing or malformed entry is reported and skipped; only the category
//! directory itself is structural, and it is created when absent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use numz_core::result::AppResult;

use crate::category::ModuleCategory;
use crate::error::DiscoveryError;
use crate::manifest::EntryManifest;

/// A module found on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleEntry {
    /// Category the module was found under.
    pub category: ModuleCategory,
    /// Module name (directory name).
    pub name: String,
    /// Module directory.
    pub directory: PathBuf,
    /// Entry file path.
    pub entry_file: PathBuf,
    /// Parsed entry file.
    pub manifest: EntryManifest,
}

/// Outcome of a discovery pass, grouped by category.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Per-category results, in module-name order.
    pub categories: BTreeMap<ModuleCategory, Vec<Result<ModuleEntry, DiscoveryError>>>,
}

impl DiscoveryReport {
    /// Successfully discovered modules.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.categories
            .values()
            .flatten()
            .filter_map(|r| r.as_ref().ok())
    }

    /// Modules skipped during discovery.
    pub fn skipped(&self) -> impl Iterator<Item = &DiscoveryError> {
        self.categories
            .values()
            .flatten()
            .filter_map(|r| r.as_ref().err())
    }

    /// Discovered module names in one category.
    pub fn names(&self, category: ModuleCategory) -> Vec<&str> {
        self.categories
            .get(&category)
            .into_iter()
            .flatten()
            .filter_map(|r| r.as_ref().ok().map(|e| e.name.as_str()))
            .collect()
    }
}

/// Whether `name` can safely be used as a single path component.
pub fn is_valid_module_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && name != ".."
}

/// Directory for a category under the module root.
pub fn category_dir(root: &Path, category: ModuleCategory) -> PathBuf {
    root.join(category.directory())
}

/// Entry file path for a module.
pub fn entry_path(root: &Path, category: ModuleCategory, name: &str, extension: &str) -> PathBuf {
    category_dir(root, category)
        .join(name)
        .join(format!("{name}.{extension}"))
}

/// Reads and parses one module entry.
///
/// Returns `Ok(None)` when the module directory or entry file does not exist.
pub async fn read_entry(
    root: &Path,
    category: ModuleCategory,
    name: &str,
    extension: &str,
) -> Result<Option<ModuleEntry>, DiscoveryError> {
    if !is_valid_module_name(name) {
        return Ok(None);
    }

    let path = entry_path(root, category, name, extension);
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(DiscoveryError::Malformed {
                category,
                name: name.to_string(),
                path,
                reason: e.to_string(),
            });
        }
    };

    let manifest = EntryManifest::parse(&text).map_err(|e| DiscoveryError::Malformed {
        category,
        name: name.to_string(),
        path: path.clone(),
        reason: e.message().to_string(),
    })?;

    if let Some(declared) = manifest.name.as_deref() {
        if declared != name {
            return Err(DiscoveryError::Malformed {
                category,
                name: name.to_string(),
                path,
                reason: format!("entry declares name '{declared}'"),
            });
        }
    }

    let directory = category_dir(root, category).join(name);
    Ok(Some(ModuleEntry {
        category,
        name: name.to_string(),
        directory,
        entry_file: path,
        manifest,
    }))
}

/// Scans one category directory, creating it when absent.
pub async fn scan_category(
    root: &Path,
    category: ModuleCategory,
    extension: &str,
) -> AppResult<Vec<Result<ModuleEntry, DiscoveryError>>> {
    let dir = category_dir(root, category);
    if !tokio::fs::try_exists(&dir).await? {
        tokio::fs::create_dir_all(&dir).await?;
        info!(category = %category, dir = %dir.display(), "Created module category directory");
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    let mut read_dir = tokio::fs::read_dir(&dir).await?;
    while let Some(item) = read_dir.next_entry().await? {
        if !item.file_type().await?.is_dir() {
            continue;
        }
        let Some(name) = item.file_name().to_str().map(str::to_string) else {
            warn!(category = %category, path = %item.path().display(), "Skipping non UTF-8 module directory");
            continue;
        };
        if is_valid_module_name(&name) {
            names.push(name);
        }
    }
    names.sort();

    let mut results = Vec::with_capacity(names.len());
    for name in names {
        let result = match read_entry(root, category, &name, extension).await {
            Ok(Some(entry)) => Ok(entry),
            Ok(None) => Err(DiscoveryError::MissingEntry {
                category,
                path: entry_path(root, category, &name, extension),
                name,
            }),
            Err(e) => Err(e),
        };

        match &result {
            Ok(entry) => debug!(category = %category, module = %entry.name, "Module discovered"),
            Err(e) => warn!(category = %category, module = %e.module_name(), error = %e, "Skipping module"),
        }
        results.push(result);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(path, contents).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_category_dir_is_created() {
        let tmp = TempDir::new().unwrap();
        let results = scan_category(tmp.path(), ModuleCategory::Registrar, "toml")
            .await
            .unwrap();
        assert!(results.is_empty());
        assert!(tmp.path().join("registrars").is_dir());
    }

    #[tokio::test]
    async fn test_bad_entries_are_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "servers/acme/acme.toml", "").await;
        write(tmp.path(), "servers/broken/broken.toml", "loader = [").await;
        write(tmp.path(), "servers/empty/readme.txt", "no entry").await;
        write(tmp.path(), "servers/.git/config", "").await;
        write(tmp.path(), "servers/stray.toml", "").await;

        let results = scan_category(tmp.path(), ModuleCategory::Provisioning, "toml")
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        let ok: Vec<&str> = results
            .iter()
            .filter_map(|r| r.as_ref().ok().map(|e| e.name.as_str()))
            .collect();
        assert_eq!(ok, vec!["acme"]);
        assert!(results.iter().any(|r| matches!(r, Err(DiscoveryError::Malformed { name, .. }) if name == "broken")));
        assert!(results.iter().any(|r| matches!(r, Err(DiscoveryError::MissingEntry { name, .. }) if name == "empty")));
    }

    #[tokio::test]
    async fn test_declared_name_must_match_directory() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "addons/crm/crm.toml", "name = \"other\"").await;
        let err = read_entry(tmp.path(), ModuleCategory::Addon, "crm", "toml")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_path_like_names_are_absent() {
        let tmp = TempDir::new().unwrap();
        assert!(read_entry(tmp.path(), ModuleCategory::Addon, "../etc", "toml")
            .await
            .unwrap()
            .is_none());
    }
}
