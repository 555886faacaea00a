//! The plugin contract and the descriptor of a loaded plugin.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use numz_core::result::AppResult;

use crate::capabilities::{
    AuthProvider, CampaignFieldProvider, Capability, NavigationProvider, PlatformFieldProvider,
};
use crate::hooks::definitions::HookBinding;

/// Trait implemented by every compiled-in plugin.
///
/// Capability accessors default to `None`; a plugin overrides the ones it
/// implements, usually by returning `Some(self)`.
#[async_trait]
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Identifier contributions are keyed by.
    fn identifier(&self) -> &str;

    /// Hook listeners to register with the host.
    fn hooks(&self) -> Vec<HookBinding> {
        Vec::new()
    }

    /// Called once after the plugin is registered.
    async fn boot(&self) -> AppResult<()> {
        Ok(())
    }

    /// Called when the manager shuts down.
    async fn shutdown(&self) -> AppResult<()> {
        Ok(())
    }

    fn as_navigation(&self) -> Option<&dyn NavigationProvider> {
        None
    }

    fn as_platform_fields(&self) -> Option<&dyn PlatformFieldProvider> {
        None
    }

    fn as_campaign_fields(&self) -> Option<&dyn CampaignFieldProvider> {
        None
    }

    fn as_auth(&self) -> Option<&dyn AuthProvider> {
        None
    }

    /// Capabilities this plugin implements.
    fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| match capability {
                Capability::Navigation => self.as_navigation().is_some(),
                Capability::PlatformFields => self.as_platform_fields().is_some(),
                Capability::CampaignFields => self.as_campaign_fields().is_some(),
                Capability::Auth => self.as_auth().is_some(),
            })
            .collect()
    }
}

/// Metadata about a loaded plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Name as listed in the installed manifest.
    pub name: String,
    /// Plugin-supplied identifier.
    pub identifier: String,
    /// Display name from the entry file.
    pub display_name: String,
    /// Declared version.
    pub version: String,
    /// Description.
    pub description: String,
    /// Author.
    pub author: String,
    /// Located entry file.
    pub entry_file: PathBuf,
    /// Implemented capabilities.
    pub capabilities: Vec<Capability>,
    /// Number of hook listeners the plugin contributed.
    pub hook_count: usize,
}
