//! Every cache key the runtime writes.

/// Prefix applied to all Numz cache keys.
const PREFIX: &str = "numz";

// ── Module keys ────────────────────────────────────────────

/// Cache key for the active module names of a category.
pub fn active_modules(category: &str) -> String {
    format!("{PREFIX}:active:{category}")
}

/// Prefix shared by every active-set entry.
pub fn active_modules_prefix() -> String {
    format!("{PREFIX}:active:")
}

// ── Plugin keys ────────────────────────────────────────────

/// Cache key for the installed-plugin manifest read from `path`.
pub fn plugin_manifest(path: &str) -> String {
    format!("{PREFIX}:plugins:manifest:{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_key() {
        assert_eq!(active_modules("servers"), "numz:active:servers");
        assert!(active_modules("addons").starts_with(&active_modules_prefix()));
    }

    #[test]
    fn test_manifest_key() {
        assert_eq!(
            plugin_manifest("./plugins/installed.json"),
            "numz:plugins:manifest:./plugins/installed.json"
        );
    }
}
