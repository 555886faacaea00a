//! Integration tests for plugin loading through the runtime.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use numz_core::{AppError, AppResult, Params};
use numz_plugin::{
    AuthPage, AuthProvider, Capability, ClosureHandler, FieldDefinition, HookBinding, MenuItem,
    NavigationProvider, PlatformFieldProvider, Plugin, PluginCatalog, PluginManifest,
};

#[derive(Debug)]
struct Reseller {
    shutdowns: Arc<AtomicUsize>,
}

impl NavigationProvider for Reseller {
    fn sidebar_menu_items(&self) -> Vec<MenuItem> {
        vec![MenuItem::link("Reseller", "/reseller")]
    }
}

impl PlatformFieldProvider for Reseller {
    fn platform_fields(&self, platform: &str) -> Vec<FieldDefinition> {
        if platform == "cpanel" {
            vec![FieldDefinition::new("reseller_acl", "Reseller ACL", "text").required()]
        } else {
            Vec::new()
        }
    }
}

#[async_trait]
impl Plugin for Reseller {
    fn identifier(&self) -> &str {
        "reseller"
    }

    fn hooks(&self) -> Vec<HookBinding> {
        vec![HookBinding::new(
            "ClientAdd",
            3,
            Arc::new(ClosureHandler::new("reseller.client_add", |params| async move {
                Ok(json!({ "tagged": params.get_i64("userid") }))
            })),
        )]
    }

    async fn shutdown(&self) -> AppResult<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn as_navigation(&self) -> Option<&dyn NavigationProvider> {
        Some(self)
    }

    fn as_platform_fields(&self) -> Option<&dyn PlatformFieldProvider> {
        Some(self)
    }
}

#[derive(Debug)]
struct GithubLogin;

impl AuthProvider for GithubLogin {
    fn render_auth_buttons(&self, page: AuthPage) -> String {
        match page {
            AuthPage::Login => "<a href=\"/auth/github\">Sign in with GitHub</a>".to_string(),
            AuthPage::Register => String::new(),
        }
    }
}

#[async_trait]
impl Plugin for GithubLogin {
    fn identifier(&self) -> &str {
        "github-login"
    }

    fn as_auth(&self) -> Option<&dyn AuthProvider> {
        Some(self)
    }
}

#[derive(Debug)]
struct Broken;

#[async_trait]
impl Plugin for Broken {
    fn identifier(&self) -> &str {
        "broken"
    }

    fn hooks(&self) -> Vec<HookBinding> {
        vec![HookBinding::new(
            "ClientAdd",
            1,
            Arc::new(ClosureHandler::new("broken.client_add", |_| async {
                Ok(json!(null))
            })),
        )]
    }

    async fn boot(&self) -> AppResult<()> {
        Err(AppError::plugin("License key rejected"))
    }
}

async fn runtime(shutdowns: Arc<AtomicUsize>) -> helpers::TestRuntime {
    let catalog = PluginCatalog::new()
        .with_plugin("reseller", move |_: &PluginManifest| {
            Arc::new(Reseller {
                shutdowns: Arc::clone(&shutdowns),
            }) as Arc<dyn Plugin>
        })
        .with_plugin("github-login", |_: &PluginManifest| Arc::new(GithubLogin) as Arc<dyn Plugin>)
        .with_plugin("broken", |_: &PluginManifest| Arc::new(Broken) as Arc<dyn Plugin>);
    let t = helpers::TestRuntime::with(|_| {}, catalog).await;

    t.write_plugin_file(
        "installed.json",
        r#"["reseller", "github-login", "broken", "ghost"]"#,
    )
    .await;
    t.write_plugin_file("Reseller/ResellerPlugin.toml", "name = \"Reseller Tools\"\nversion = \"2.1.0\"\n")
        .await;
    t.write_plugin_file("github-login/src/GithubLoginPlugin.toml", "name = \"GitHub Login\"\n")
        .await;
    t.write_plugin_file("broken/BrokenPlugin.toml", "name = \"Broken\"\n").await;
    t
}

#[tokio::test]
async fn test_bootstrap_loads_installed_plugins() {
    let shutdowns = Arc::new(AtomicUsize::new(0));
    let t = runtime(Arc::clone(&shutdowns)).await;

    let report = t.runtime.bootstrap().await.unwrap();
    let plugins = report.plugins.expect("plugins should auto-load");
    assert_eq!(plugins.loaded, vec!["reseller", "github-login"]);
    assert_eq!(plugins.skipped.len(), 2);
    assert_eq!(plugins.skipped[0].name, "broken");
    assert!(plugins.skipped[0].reason.contains("License key rejected"));
    assert_eq!(plugins.skipped[1].reason, "Plugin file not found");

    let manager = t.runtime.plugins();
    let descriptors = manager.descriptors().await;
    assert_eq!(descriptors[0].display_name, "Reseller Tools");
    assert_eq!(descriptors[0].version, "2.1.0");
    assert_eq!(descriptors[1].version, "1.0.0");
    assert_eq!(manager.providers(Capability::Auth).await, vec!["github-login"]);
}

#[tokio::test]
async fn test_capability_aggregation() {
    let t = runtime(Arc::new(AtomicUsize::new(0))).await;
    t.runtime.bootstrap().await.unwrap();
    let manager = t.runtime.plugins();

    let menu = manager.sidebar_menu_items().await;
    assert_eq!(menu.len(), 1);
    assert_eq!(menu["reseller"][0].url.as_deref(), Some("/reseller"));

    assert_eq!(manager.platform_fields_for("cpanel").await["reseller"].len(), 1);
    assert!(manager.platform_fields_for("plesk").await.is_empty());

    let login = manager.auth_buttons(AuthPage::Login).await;
    assert!(login["github-login"].contains("/auth/github"));
    assert!(manager.auth_buttons(AuthPage::Register).await.is_empty());
}

#[tokio::test]
async fn test_plugin_hooks_follow_plugin_lifetime() {
    let shutdowns = Arc::new(AtomicUsize::new(0));
    let t = runtime(Arc::clone(&shutdowns)).await;
    t.runtime.bootstrap().await.unwrap();
    let bus = t.runtime.hooks();

    // The broken plugin's listener was removed when its boot failed.
    let summaries = bus.get_hooks("ClientAdd").await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].owner.as_deref(), Some("reseller"));

    let outcomes = bus.run("ClientAdd", &Params::new().with("userid", 4)).await;
    assert_eq!(outcomes[0].to_value(), json!({ "tagged": 4 }));

    t.runtime.shutdown().await;
    assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    assert!(!bus.has_hook("ClientAdd").await);
    assert!(t.runtime.plugins().descriptors().await.is_empty());
}

#[tokio::test]
async fn test_auto_load_disabled() {
    let t = helpers::TestRuntime::with(|c| c.plugins.auto_load = false, PluginCatalog::new()).await;
    let report = t.runtime.bootstrap().await.unwrap();
    assert!(report.plugins.is_none());
    assert!(t.runtime.plugins().descriptors().await.is_empty());
}
