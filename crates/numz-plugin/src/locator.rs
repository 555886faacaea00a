//! Locates plugin entry files by conventional path and case variants.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Converts `social-auth`, `social_auth` or `social auth` to `SocialAuth`.
pub fn studly(name: &str) -> String {
    name.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Converts `SocialAuth` or `social_auth` to `social-auth`.
pub fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !out.ends_with('-') && !out.is_empty() {
                out.push('-');
            }
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower {
                out.push('-');
            }
            out.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

/// Name of the plugin class (and entry file stem) for a plugin name.
pub fn class_name(name: &str) -> String {
    format!("{}Plugin", studly(name))
}

/// Finds plugin entry files under a root directory.
#[derive(Debug, Clone)]
pub struct PluginLocator {
    root: PathBuf,
}

impl PluginLocator {
    /// Creates a locator over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Plugin root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate entry paths, in lookup order, excluding the
    /// case-insensitive directory scan.
    pub fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let studly = studly(name);
        let kebab = kebab(name);
        let file = format!("{}.toml", class_name(name));

        let mut dirs = vec![studly];
        if !dirs.contains(&kebab) {
            dirs.push(kebab);
        }

        dirs.iter()
            .flat_map(|dir| {
                let base = self.root.join(dir);
                [base.join(&file), base.join("src").join(&file)]
            })
            .collect()
    }

    /// Locates the entry file for `name`.
    ///
    /// Tries the studly and kebab directory names (each with and without a
    /// `src/` root), then any non-hidden directory whose name matches
    /// case-insensitively.
    pub async fn locate(&self, name: &str) -> Option<PathBuf> {
        for candidate in self.candidates(name) {
            if is_file(&candidate).await {
                return Some(candidate);
            }
        }

        let file = format!("{}.toml", class_name(name));
        let wanted = [name.to_lowercase(), studly(name).to_lowercase(), kebab(name)];
        let mut read_dir = tokio::fs::read_dir(&self.root).await.ok()?;
        let mut matches = Vec::new();
        while let Ok(Some(item)) = read_dir.next_entry().await {
            let Some(dir_name) = item.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if dir_name.starts_with('.') {
                continue;
            }
            if wanted.contains(&dir_name.to_lowercase()) {
                matches.push(item.path());
            }
        }
        matches.sort();

        for dir in matches {
            for candidate in [dir.join(&file), dir.join("src").join(&file)] {
                if is_file(&candidate).await {
                    debug!(plugin = %name, path = %candidate.display(), "Plugin located by case-insensitive match");
                    return Some(candidate);
                }
            }
        }
        None
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
