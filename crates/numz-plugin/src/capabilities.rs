//! Capability interfaces plugins may implement.
//!
//! The manager asks each plugin for a capability through the accessors on
//! [`Plugin`](crate::plugin::Plugin); plugins without it are skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use numz_core::Params;

/// Capability interfaces a plugin can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// [`NavigationProvider`].
    Navigation,
    /// [`PlatformFieldProvider`].
    PlatformFields,
    /// [`CampaignFieldProvider`].
    CampaignFields,
    /// [`AuthProvider`].
    Auth,
}

impl Capability {
    /// All capabilities.
    pub const ALL: [Capability; 4] = [
        Capability::Navigation,
        Capability::PlatformFields,
        Capability::CampaignFields,
        Capability::Auth,
    ];

    /// Stable name used in listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::PlatformFields => "platform_fields",
            Self::CampaignFields => "campaign_fields",
            Self::Auth => "auth",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A navigation entry contributed to the client sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Display label.
    pub label: String,
    /// Target URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Icon name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Badge value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<Value>,
    /// Nested entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<MenuItem>,
}

impl MenuItem {
    /// A leaf entry.
    pub fn link(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: Some(url.to_string()),
            icon: None,
            badge: None,
            items: Vec::new(),
        }
    }
}

/// A form field contributed for an external platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field key.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Input type (`text`, `select`, `toggle`...).
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether a value is required.
    #[serde(default)]
    pub required: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl FieldDefinition {
    /// Creates an optional field.
    pub fn new(name: &str, label: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field_type: field_type.to_string(),
            required: false,
            default: None,
            help: None,
        }
    }

    /// Marks the field required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Page an authentication button is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthPage {
    /// Login page.
    Login,
    /// Registration page.
    Register,
}

/// Contributes sidebar navigation entries.
pub trait NavigationProvider: Send + Sync {
    /// Entries to add to the sidebar.
    fn sidebar_menu_items(&self) -> Vec<MenuItem>;
}

/// Contributes fields for an external platform's settings.
pub trait PlatformFieldProvider: Send + Sync {
    /// Fields for `platform`; empty when the plugin has none for it.
    fn platform_fields(&self, platform: &str) -> Vec<FieldDefinition>;
}

/// Contributes campaign fields for an external platform.
pub trait CampaignFieldProvider: Send + Sync {
    /// Fields for `platform` given its stored configuration.
    fn campaign_fields(&self, platform: &str, platform_config: &Params) -> Vec<FieldDefinition>;
}

/// Provides an authentication method.
pub trait AuthProvider: Send + Sync {
    /// Markup for the plugin's buttons on `page`.
    fn render_auth_buttons(&self, page: AuthPage) -> String;
}
