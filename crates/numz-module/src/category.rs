//! Module categories and their per-category contracts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModuleError;

/// The closed set of module categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleCategory {
    /// Server / provisioning modules.
    Provisioning,
    /// Add-on modules.
    Addon,
    /// Payment gateway modules.
    Payment,
    /// Domain registrar modules.
    Registrar,
    /// Fraud check modules.
    Fraud,
    /// Notification provider modules.
    Notification,
    /// Dashboard widget modules.
    Widget,
    /// Mail provider modules.
    Mail,
}

impl ModuleCategory {
    /// Every category, in directory scan order.
    pub const ALL: [ModuleCategory; 8] = [
        Self::Provisioning,
        Self::Addon,
        Self::Payment,
        Self::Registrar,
        Self::Fraud,
        Self::Notification,
        Self::Widget,
        Self::Mail,
    ];

    /// Canonical label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Provisioning => "provisioning",
            Self::Addon => "addon",
            Self::Payment => "payment",
            Self::Registrar => "registrar",
            Self::Fraud => "fraud",
            Self::Notification => "notification",
            Self::Widget => "widget",
            Self::Mail => "mail",
        }
    }

    /// Directory name under the module root.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Provisioning => "servers",
            Self::Addon => "addons",
            Self::Payment => "gateways",
            Self::Registrar => "registrars",
            Self::Fraud => "fraud",
            Self::Notification => "notifications",
            Self::Widget => "widgets",
            Self::Mail => "mail",
        }
    }

    /// Operations a module of this category must expose.
    pub fn required_operations(&self) -> &'static [&'static str] {
        match self {
            Self::Provisioning => &[
                "CreateAccount",
                "SuspendAccount",
                "UnsuspendAccount",
                "TerminateAccount",
            ],
            Self::Payment => &["MetaData", "Config"],
            Self::Registrar => &[
                "getConfigArray",
                "RegisterDomain",
                "TransferDomain",
                "RenewDomain",
            ],
            Self::Addon => &["config", "activate", "deactivate", "output"],
            Self::Fraud | Self::Notification | Self::Widget | Self::Mail => &[],
        }
    }

    /// Whether modules of this category may ship hook registrations.
    pub fn carries_hooks(&self) -> bool {
        matches!(
            self,
            Self::Addon | Self::Provisioning | Self::Payment | Self::Registrar
        )
    }
}

impl fmt::Display for ModuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModuleCategory {
    type Err = ModuleError;

    /// Parses either the canonical label or the directory name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == lowered || c.directory() == lowered)
            .ok_or_else(|| ModuleError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_label_and_directory() {
        assert_eq!(
            "provisioning".parse::<ModuleCategory>().unwrap(),
            ModuleCategory::Provisioning
        );
        assert_eq!(
            "servers".parse::<ModuleCategory>().unwrap(),
            ModuleCategory::Provisioning
        );
        assert_eq!(
            "Gateways".parse::<ModuleCategory>().unwrap(),
            ModuleCategory::Payment
        );
        assert!("themes".parse::<ModuleCategory>().is_err());
    }

    #[test]
    fn test_required_operations_table() {
        assert_eq!(ModuleCategory::Provisioning.required_operations().len(), 4);
        assert_eq!(
            ModuleCategory::Payment.required_operations(),
            &["MetaData", "Config"]
        );
        assert!(ModuleCategory::Widget.required_operations().is_empty());
    }
}
