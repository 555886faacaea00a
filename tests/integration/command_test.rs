//! Integration tests for the legacy command surface.

mod helpers;

use serde_json::json;

use numz_command::CommandEnvelope;
use numz_core::Params;
use numz_core::types::billing::ServiceStatus;
use numz_module::{ModuleCategory, ModuleFault, SymbolTable};

fn ada() -> Params {
    Params::new()
        .with("firstname", "Ada")
        .with("lastname", "Lovelace")
        .with("email", "ada@example.com")
}

fn provisioning_module() -> SymbolTable {
    SymbolTable::new()
        .with_fn("acme_CreateAccount", |params| {
            let ram = params
                .get("configoptions")
                .and_then(|c| c.get("ram"))
                .cloned()
                .unwrap_or_default();
            Ok(json!({ "username": "acme4", "password": "s3cret", "ram": ram }))
        })
        .with_fn("acme_SuspendAccount", |_| Ok(json!("success")))
        .with_fn("acme_UnsuspendAccount", |_| Ok(json!({ "error": "Account locked upstream" })))
        .with_fn("acme_TerminateAccount", |_| Err(ModuleFault::new("Server unreachable")))
}

#[tokio::test]
async fn test_unknown_command_envelope() {
    let t = helpers::TestRuntime::new().await;
    let envelope = t
        .runtime
        .commands()
        .execute("NoSuchCommand", &Params::new(), None)
        .await;

    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({ "result": "error", "message": "Command 'NoSuchCommand' not found" })
    );
}

#[tokio::test]
async fn test_routing_is_repeatable() {
    let t = helpers::TestRuntime::new().await;
    let dispatcher = t.runtime.commands();
    let params = Params::new().with("clientid", 77);

    for command in ["Foo", "GetClientsDetails"] {
        let first = dispatcher.execute(command, &params, None).await;
        let second = dispatcher.execute(command, &params, None).await;
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_client_commands() {
    let t = helpers::TestRuntime::new().await;
    let dispatcher = t.runtime.commands();

    let created = dispatcher.execute("AddClient", &ada(), Some("admin")).await;
    assert_eq!(created.get("clientid"), Some(&json!(1)));
    assert_eq!(dispatcher.last_response().await, Some(created));

    let update = Params::new().with("clientid", 1).with("companyname", "Analytical Engines");
    assert!(dispatcher.execute("updateclient", &update, None).await.is_success());

    let details = dispatcher
        .execute("GetClientsDetails", &Params::new().with("clientid", 1), None)
        .await;
    assert_eq!(details.get("companyname"), Some(&json!("Analytical Engines")));

    let missing = dispatcher.execute("AddClient", &Params::new(), None).await;
    assert_eq!(missing, CommandEnvelope::error("Missing required parameter 'firstname'"));
}

#[tokio::test]
async fn test_service_lifecycle_through_module() {
    let t = helpers::TestRuntime::new().await;
    t.install(ModuleCategory::Provisioning, "acme", provisioning_module()).await;
    let dispatcher = t.runtime.commands();
    dispatcher.execute("AddClient", &ada(), None).await;
    let service = t.create_service(1, Some("acme")).await;
    let params = Params::new().with("serviceid", service.id);

    let created = dispatcher.execute("ModuleCreate", &params, None).await;
    assert_eq!(created.get("ram"), Some(&json!("2G")));
    let stored = t.runtime.store().find_service(service.id).await.unwrap().unwrap();
    assert_eq!(stored.username.as_deref(), Some("acme4"));
    assert_eq!(stored.password.as_deref(), Some("s3cret"));

    let suspended = dispatcher
        .execute("ModuleSuspend", &Params::new().with("accountid", service.id), None)
        .await;
    assert_eq!(suspended, CommandEnvelope::success());
    let stored = t.runtime.store().find_service(service.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ServiceStatus::Suspended);

    let refused = dispatcher.execute("ModuleUnsuspend", &params, None).await;
    assert_eq!(refused, CommandEnvelope::error("Account locked upstream"));

    let failed = dispatcher.execute("ModuleTerminate", &params, None).await;
    assert_eq!(failed, CommandEnvelope::error("Server unreachable"));

    let stored = t.runtime.store().find_service(service.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ServiceStatus::Suspended);
}

#[tokio::test]
async fn test_module_command_edge_cases() {
    let t = helpers::TestRuntime::new().await;
    let dispatcher = t.runtime.commands();
    let unbound = t.create_service(1, None).await;
    let missing_module = t.create_service(1, Some("ghost")).await;

    let envelope = dispatcher
        .execute("ModuleCreate", &Params::new().with("serviceid", 999), None)
        .await;
    assert_eq!(envelope.message(), Some("Service not found"));

    let envelope = dispatcher
        .execute("ModuleCreate", &Params::new().with("serviceid", unbound.id), None)
        .await;
    assert_eq!(envelope.message(), Some("No module configured for this product"));

    let envelope = dispatcher
        .execute("ModuleCreate", &Params::new().with("serviceid", missing_module.id), None)
        .await;
    assert_eq!(envelope.message(), Some("Module ghost not found"));
}

#[tokio::test]
async fn test_domain_register_with_registrar() {
    let t = helpers::TestRuntime::new().await;
    let table = SymbolTable::new().with_fn("namecheap_RegisterDomain", |params| {
        if params.get_str("domainname") == Some("taken.test") {
            Ok(json!({ "error": "Domain not available" }))
        } else {
            Ok(json!("success"))
        }
    });
    t.install(ModuleCategory::Registrar, "namecheap", table).await;
    let dispatcher = t.runtime.commands();

    let params = Params::new()
        .with("clientid", 1)
        .with("domainname", "fresh.test")
        .with("registrar", "namecheap")
        .with("regperiod", 2);
    let envelope = dispatcher.execute("DomainRegister", &params, None).await;
    assert_eq!(envelope.get("domainid"), Some(&json!(1)));

    let taken = params.clone().with("domainname", "taken.test");
    let envelope = dispatcher.execute("DomainRegister", &taken, None).await;
    assert_eq!(envelope.message(), Some("Domain not available"));

    let unmanaged = Params::new().with("userid", 1).with("domainname", "manual.test");
    let envelope = dispatcher.execute("DomainRegister", &unmanaged, None).await;
    assert_eq!(envelope.get("domainid"), Some(&json!(3)));
}

#[tokio::test]
async fn test_invoice_round_trip() {
    let t = helpers::TestRuntime::new().await;
    let dispatcher = t.runtime.commands();
    dispatcher.execute("AddClient", &ada(), None).await;

    let params = Params::new()
        .with("userid", 1)
        .with("itemdescription1", "Hosting (monthly)")
        .with("itemamount1", "9.99");
    let created = dispatcher.execute("CreateInvoice", &params, None).await;
    let invoice_id = created.get("invoiceid").cloned().unwrap();

    let invoice = dispatcher
        .execute("GetInvoice", &Params::new().with("invoiceid", invoice_id), None)
        .await;
    assert_eq!(invoice.get("total"), Some(&json!("9.99")));
    assert_eq!(invoice.get("status"), Some(&json!("unpaid")));
}
