//! # numz-plugin
//!
//! Extension points for the Numz runtime. Provides:
//!
//! - Hook bus: priority-ordered listeners per named hook point, snapshot
//!   firing with per-listener failure isolation, bounded execution history
//! - Catalogue of well-known legacy hook points
//! - Plugin manager: installed-plugin manifest, entry locator, compiled-in
//!   plugin catalog, host registration and lifecycle
//! - Typed capability interfaces and their aggregation across plugins

pub mod capabilities;
pub mod catalog;
pub mod hooks;
pub mod locator;
pub mod manager;
pub mod manifest;
pub mod plugin;
pub mod registry;
pub mod traits;

pub use capabilities::{
    AuthPage, AuthProvider, CampaignFieldProvider, Capability, FieldDefinition, MenuItem, NavigationProvider,
    PlatformFieldProvider,
};
pub use catalog::{PluginCatalog, PluginFactory};
pub use hooks::bus::HookBus;
pub use hooks::definitions::{CommonHook, HookBinding, HookOutcome};
pub use hooks::history::{ExecutionHistory, ExecutionRecord};
pub use hooks::registry::{HookRegistry, RegistrationSummary};
pub use manager::{BusHost, LoadReport, PluginHost, PluginManager, SkippedPlugin};
pub use manifest::PluginManifest;
pub use plugin::{Plugin, PluginDescriptor};
pub use registry::{LoadedPlugin, PluginRegistry};
pub use traits::ClosureHandler;
