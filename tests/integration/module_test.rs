//! Integration tests for module discovery, loading, invocation and validation.

mod helpers;

use std::time::Duration;

use serde_json::json;

use numz_core::Params;
use numz_module::{InvokeOptions, ModuleCategory, ModuleError, ModuleFault, SymbolTable};

fn acme_create_only() -> SymbolTable {
    SymbolTable::new()
        .with_fn("acme_MetaData", |_| Ok(json!({ "DisplayName": "Acme Hosting", "APIVersion": "1.1" })))
        .with_fn("acme_CreateAccount", |params| {
            Ok(json!({ "username": format!("u{}", params.get_i64("serviceid").unwrap_or(0)) }))
        })
}

#[tokio::test]
async fn test_absent_module_is_not_found() {
    let t = helpers::TestRuntime::new().await;
    let registry = t.runtime.modules();

    let err = registry
        .load(ModuleCategory::Provisioning, "ghost")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = registry
        .invoke(ModuleCategory::Provisioning, "ghost", "CreateAccount", &Params::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Module ghost not found");
}

#[tokio::test]
async fn test_validate_reports_missing_required_operations() {
    let t = helpers::TestRuntime::new().await;
    t.install(ModuleCategory::Provisioning, "acme", acme_create_only()).await;

    let report = t
        .runtime
        .modules()
        .validate(ModuleCategory::Provisioning, "acme")
        .await;

    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![
            "Required function 'SuspendAccount' not found".to_string(),
            "Required function 'UnsuspendAccount' not found".to_string(),
            "Required function 'TerminateAccount' not found".to_string(),
        ]
    );
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn test_validate_missing_module() {
    let t = helpers::TestRuntime::new().await;
    let report = t
        .runtime
        .modules()
        .validate(ModuleCategory::Registrar, "nowhere")
        .await;
    assert!(!report.valid);
    assert_eq!(report.errors, vec!["Module file not found".to_string()]);
}

#[tokio::test]
async fn test_second_load_uses_cache_until_invalidated() {
    let t = helpers::TestRuntime::new().await;
    t.install(ModuleCategory::Provisioning, "acme", acme_create_only()).await;
    let registry = t.runtime.modules();

    let first = registry.load(ModuleCategory::Provisioning, "acme").await.unwrap();
    let second = registry.load(ModuleCategory::Provisioning, "acme").await.unwrap();
    assert_eq!(first.operations(), second.operations());
    assert_eq!(t.loads(), 1);

    registry.invalidate(ModuleCategory::Provisioning, "acme").await;
    registry.load(ModuleCategory::Provisioning, "acme").await.unwrap();
    assert_eq!(t.loads(), 2);
}

#[tokio::test]
async fn test_invoke_outcomes() {
    let t = helpers::TestRuntime::new().await;
    let table = acme_create_only()
        .with_fn("acme_SuspendAccount", |_| Err(ModuleFault::new("API quota exceeded")))
        .with_fn("acme_TerminateAccount", |_| panic!("upstream client crashed"));
    t.install(ModuleCategory::Provisioning, "acme", table).await;
    let registry = t.runtime.modules();

    let created = registry
        .invoke(
            ModuleCategory::Provisioning,
            "acme",
            "CreateAccount",
            &Params::new().with("serviceid", 4),
        )
        .await
        .unwrap();
    assert_eq!(created, json!({ "username": "u4" }));

    let err = registry
        .invoke(ModuleCategory::Provisioning, "acme", "ChangePackage", &Params::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Function ChangePackage not found in module acme");

    let err = registry
        .invoke(ModuleCategory::Provisioning, "acme", "SuspendAccount", &Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ModuleError::ModuleExecutionError { .. }));
    assert_eq!(err.to_string(), "API quota exceeded");

    let err = registry
        .invoke(ModuleCategory::Provisioning, "acme", "TerminateAccount", &Params::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("upstream client crashed"));
}

#[tokio::test(start_paused = true)]
async fn test_invoke_timeout() {
    let t = helpers::TestRuntime::new().await;
    let table = SymbolTable::new().with_function(
        "slow_CreateAccount",
        numz_module::FnModuleFunction::new(|_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(json!("late"))
        }),
    );
    t.install(ModuleCategory::Provisioning, "slow", table).await;

    let err = t
        .runtime
        .modules()
        .invoke_with(
            ModuleCategory::Provisioning,
            "slow",
            "CreateAccount",
            &Params::new(),
            InvokeOptions::default().with_timeout(Duration::from_secs(2)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ModuleError::TimedOut { .. }));
}

#[tokio::test]
async fn test_discovery_skips_broken_entries() {
    let t = helpers::TestRuntime::new().await;
    t.install(ModuleCategory::Registrar, "namecheap", SymbolTable::new()).await;
    tokio::fs::create_dir_all(t.module_dir(ModuleCategory::Registrar, "broken"))
        .await
        .unwrap();

    let report = t
        .runtime
        .modules()
        .discover(Some(ModuleCategory::Registrar))
        .await
        .unwrap();

    assert_eq!(report.names(ModuleCategory::Registrar), vec!["namecheap"]);
    let skipped: Vec<_> = report.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].module_name(), "broken");
}

#[tokio::test]
async fn test_active_provisioning_modules_follow_products() {
    let t = helpers::TestRuntime::new().await;
    t.install(ModuleCategory::Provisioning, "acme", acme_create_only()).await;
    t.install(ModuleCategory::Provisioning, "ovh", SymbolTable::new()).await;
    t.create_service(1, Some("acme")).await;
    t.create_service(1, Some("ovh")).await;
    t.create_service(2, Some("uninstalled")).await;
    t.create_service(1, None).await;

    let active = t.runtime.modules().active_provisioning_modules().await.unwrap();
    assert_eq!(active, vec!["acme".to_string(), "ovh".to_string()]);
}
