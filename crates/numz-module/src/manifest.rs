//! Module entry file format.
//!
//! The entry file `<name>/<name>.<ext>` marks a directory as a module and
//! tells the registry how to obtain its implementation. An empty file is a
//! valid native entry.

use serde::{Deserialize, Serialize};

/// How a module's implementation is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    /// Compiled into the host and registered at startup.
    #[default]
    Native,
    /// A shared library next to the entry file.
    Dynamic,
}

impl std::fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// Parsed contents of a module entry file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryManifest {
    /// Declared module name. Must match the directory name when present.
    #[serde(default)]
    pub name: Option<String>,
    /// Loader responsible for this module.
    #[serde(default)]
    pub loader: LoaderKind,
    /// Shared library file name, relative to the module directory.
    #[serde(default)]
    pub library: Option<String>,
    /// Declared version.
    #[serde(default)]
    pub version: Option<String>,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
}

impl EntryManifest {
    /// Parses an entry file.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_entry_is_native() {
        let manifest = EntryManifest::parse("").unwrap();
        assert_eq!(manifest.loader, LoaderKind::Native);
        assert!(manifest.name.is_none());
    }

    #[test]
    fn test_dynamic_entry() {
        let manifest = EntryManifest::parse(
            r#"
            name = "acme"
            loader = "dynamic"
            library = "libacme.so"
            "#,
        )
        .unwrap();
        assert_eq!(manifest.loader, LoaderKind::Dynamic);
        assert_eq!(manifest.library.as_deref(), Some("libacme.so"));
    }

    #[test]
    fn test_unknown_loader_is_rejected() {
        assert!(EntryManifest::parse("loader = \"php\"").is_err());
    }
}
