//! Standard command handlers, grouped by the record they act on.

pub mod client;
pub mod domain;
pub mod invoice;
pub mod service;

use std::sync::Arc;

use serde_json::Value;

use numz_core::Params;
use numz_core::traits::store::BillingStore;
use numz_module::ModuleRegistry;

use crate::dispatcher::CommandDispatcher;

/// Registers every standard command on `dispatcher`.
pub fn register_standard(
    dispatcher: &mut CommandDispatcher,
    store: Arc<dyn BillingStore>,
    modules: Arc<ModuleRegistry>,
) {
    dispatcher.register(Arc::new(client::AddClient::new(store.clone())));
    dispatcher.register(Arc::new(client::GetClientsDetails::new(store.clone())));
    dispatcher.register(Arc::new(client::UpdateClient::new(store.clone())));

    for action in service::ModuleAction::ALL {
        dispatcher.register(Arc::new(service::ModuleCommand::new(
            action,
            store.clone(),
            modules.clone(),
        )));
    }

    dispatcher.register(Arc::new(invoice::CreateInvoice::new(store.clone())));
    dispatcher.register(Arc::new(invoice::GetInvoice::new(store.clone())));

    dispatcher.register(Arc::new(domain::DomainRegister::new(store, modules)));
}

/// Optional string parameter, owned.
fn text(params: &Params, key: &str) -> Option<String> {
    params.get_str(key).map(str::to_string)
}

/// The failure message a module result carries, if any.
///
/// Modules report failure with an `error` field, or with any plain string
/// other than `"success"`.
fn module_failure(result: &Value) -> Option<String> {
    match result {
        Value::Object(fields) => match fields.get("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(message)) => Some(message.clone()),
            Some(other) => Some(other.to_string()),
        },
        Value::String(s) if !s.eq_ignore_ascii_case("success") => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_failure_detection() {
        assert_eq!(module_failure(&json!({ "error": "quota" })), Some("quota".to_string()));
        assert_eq!(module_failure(&json!({ "error": null, "ok": 1 })), None);
        assert_eq!(module_failure(&json!("success")), None);
        assert_eq!(module_failure(&json!("Server unreachable")), Some("Server unreachable".to_string()));
        assert_eq!(module_failure(&json!({ "username": "u1" })), None);
    }
}
