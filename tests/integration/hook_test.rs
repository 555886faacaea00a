//! Integration tests for the hook bus.

mod helpers;

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;

use numz_core::Params;
use numz_core::traits::hook::HookFault;
use numz_module::{ModuleCategory, SymbolTable};
use numz_plugin::{ClosureHandler, CommonHook, HookOutcome};

fn recorder(name: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Arc<ClosureHandler> {
    Arc::new(ClosureHandler::new(name, move |_| {
        let log = log.clone();
        async move {
            log.lock().await.push(name);
            Ok(json!(name))
        }
    }))
}

#[tokio::test]
async fn test_firing_unregistered_point_returns_empty() {
    let t = helpers::TestRuntime::new().await;
    let outcomes = t.runtime.hooks().run("ServiceCreated", &Params::new()).await;
    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn test_lower_priority_runs_first() {
    let t = helpers::TestRuntime::new().await;
    let bus = t.runtime.hooks();
    let log = Arc::new(Mutex::new(Vec::new()));

    bus.add_hook("InvoicePaid", 5, recorder("h2", log.clone())).await;
    bus.add_hook("InvoicePaid", 1, recorder("h1", log.clone())).await;
    bus.add_hook("InvoicePaid", 5, recorder("h3", log.clone())).await;

    let outcomes = bus.run("InvoicePaid", &Params::new().with("invoiceid", 9)).await;
    assert_eq!(*log.lock().await, vec!["h1", "h2", "h3"]);
    assert_eq!(
        outcomes,
        vec![
            HookOutcome::Completed(json!("h1")),
            HookOutcome::Completed(json!("h2")),
            HookOutcome::Completed(json!("h3")),
        ]
    );
}

#[tokio::test]
async fn test_failing_listener_does_not_stop_others() {
    let t = helpers::TestRuntime::new().await;
    let bus = t.runtime.hooks();
    let log = Arc::new(Mutex::new(Vec::new()));

    bus.add_hook("TicketOpen", 1, recorder("first", log.clone())).await;
    bus.add_hook(
        "TicketOpen",
        1,
        Arc::new(ClosureHandler::new("broken", |_| async {
            Err(HookFault::from("mail server down"))
        })),
    )
    .await;
    bus.add_hook("TicketOpen", 2, recorder("last", log.clone())).await;

    let outcomes = bus.run("TicketOpen", &Params::new()).await;
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[1].is_error());
    assert_eq!(outcomes[1].to_value(), json!({ "error": "mail server down" }));
    assert_eq!(*log.lock().await, vec!["first", "last"]);

    let history = bus.execution_history(Some("TicketOpen")).await;
    assert_eq!(history.len(), 3);
    assert!(history[1].failed);
    assert_eq!(history[1].handler, "broken");
}

#[tokio::test]
async fn test_catalogue_is_declared_without_listeners() {
    let t = helpers::TestRuntime::new().await;
    t.runtime.bootstrap().await.unwrap();
    let bus = t.runtime.hooks();

    for hook in CommonHook::ALL {
        assert!(bus.is_declared(hook.as_str()).await);
        assert!(!bus.has_hook(hook.as_str()).await);
        assert_eq!(bus.count_hooks(hook.as_str()).await, 0);
    }
}

#[tokio::test]
async fn test_module_hooks_are_registered_at_bootstrap() {
    let t = helpers::TestRuntime::new().await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let table = SymbolTable::new()
        .with_fn("licensing_config", |_| Ok(json!({ "name": "Licensing" })))
        .with_hook("AfterModuleCreate", 10, recorder("licensing", seen.clone()));
    t.install(ModuleCategory::Addon, "licensing", table).await;

    let report = t.runtime.bootstrap().await.unwrap();
    assert_eq!(report.module_hooks, 1);

    let bus = t.runtime.hooks();
    let summaries = bus.get_hooks("AfterModuleCreate").await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].owner.as_deref(), Some("module:addons/licensing"));

    bus.run("AfterModuleCreate", &Params::new()).await;
    assert_eq!(*seen.lock().await, vec!["licensing"]);
}

#[tokio::test]
async fn test_remove_hook_by_priority() {
    let t = helpers::TestRuntime::new().await;
    let bus = t.runtime.hooks();
    let log = Arc::new(Mutex::new(Vec::new()));
    bus.add_hook("DailyCronJob", 1, recorder("a", log.clone())).await;
    bus.add_hook("DailyCronJob", 2, recorder("b", log.clone())).await;

    assert_eq!(bus.remove_hook("DailyCronJob", Some(1)).await, 1);
    assert_eq!(bus.count_hooks("DailyCronJob").await, 1);
    assert_eq!(bus.remove_hook("DailyCronJob", None).await, 1);
    assert!(!bus.has_hook("DailyCronJob").await);
}
