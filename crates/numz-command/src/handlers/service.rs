//! `ModuleCreate`, `ModuleSuspend`, `ModuleUnsuspend` and `ModuleTerminate`.
//!
//! Each command resolves the service's provisioning module and calls it
//! through the module registry with the legacy parameter bag.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use numz_core::{AppError, Params};
use numz_core::result::AppResult;
use numz_core::traits::store::BillingStore;
use numz_core::types::billing::{Client, Product, Service, ServiceStatus};
use numz_module::{ModuleCategory, ModuleRegistry};

use super::module_failure;
use crate::envelope::CommandEnvelope;
use crate::handler::{CommandHandler, CommandRequest};

/// A provisioning lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleAction {
    /// Provision the account and store the credentials it returns.
    Create,
    /// Suspend the account and mark the service suspended.
    Suspend,
    /// Lift a suspension and mark the service active.
    Unsuspend,
    /// Remove the account and mark the service terminated.
    Terminate,
}

impl ModuleAction {
    pub const ALL: [ModuleAction; 4] = [
        ModuleAction::Create,
        ModuleAction::Suspend,
        ModuleAction::Unsuspend,
        ModuleAction::Terminate,
    ];

    /// Command name.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Create => "ModuleCreate",
            Self::Suspend => "ModuleSuspend",
            Self::Unsuspend => "ModuleUnsuspend",
            Self::Terminate => "ModuleTerminate",
        }
    }

    /// Module operation invoked.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Create => "CreateAccount",
            Self::Suspend => "SuspendAccount",
            Self::Unsuspend => "UnsuspendAccount",
            Self::Terminate => "TerminateAccount",
        }
    }

    /// Status the service moves to on success. Creation keeps the status
    /// and stores the returned credentials instead.
    pub fn resulting_status(&self) -> Option<ServiceStatus> {
        match self {
            Self::Create => None,
            Self::Suspend => Some(ServiceStatus::Suspended),
            Self::Unsuspend => Some(ServiceStatus::Active),
            Self::Terminate => Some(ServiceStatus::Terminated),
        }
    }
}

/// Runs one [`ModuleAction`] against a service.
pub struct ModuleCommand {
    action: ModuleAction,
    store: Arc<dyn BillingStore>,
    modules: Arc<ModuleRegistry>,
}

impl std::fmt::Debug for ModuleCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleCommand")
            .field("action", &self.action)
            .finish()
    }
}

impl ModuleCommand {
    /// A handler for `action`, resolving modules through `modules`.
    pub fn new(action: ModuleAction, store: Arc<dyn BillingStore>, modules: Arc<ModuleRegistry>) -> Self {
        Self {
            action,
            store,
            modules,
        }
    }
}

#[async_trait]
impl CommandHandler for ModuleCommand {
    fn command(&self) -> &str {
        self.action.command()
    }

    async fn handle(&self, request: CommandRequest<'_>) -> AppResult<CommandEnvelope> {
        let params = request.params;
        let service_id = match params.get_i64("serviceid") {
            Some(id) => id,
            None => params.require_i64("accountid").map_err(|_| {
                AppError::validation("Missing required parameter 'serviceid'")
            })?,
        };

        let Some(mut service) = self.store.find_service(service_id).await? else {
            return Ok(CommandEnvelope::error("Service not found"));
        };
        let product = self.store.find_product(service.product_id).await?;
        let Some(module) = product
            .as_ref()
            .and_then(|p| p.server_module.clone())
            .filter(|m| !m.is_empty())
        else {
            return Ok(CommandEnvelope::error("No module configured for this product"));
        };

        let client = self.store.find_client(service.client_id).await?;
        let module_params = module_params(&service, product.as_ref(), client.as_ref());

        let result = self
            .modules
            .invoke(
                ModuleCategory::Provisioning,
                &module,
                self.action.operation(),
                &module_params,
            )
            .await?;

        if let Some(message) = module_failure(&result) {
            warn!(
                service_id,
                module = %module,
                operation = self.action.operation(),
                error = %message,
                "Module reported failure"
            );
            return Ok(CommandEnvelope::error(message));
        }

        match self.action.resulting_status() {
            Some(status) => service.status = status,
            None => {
                if let Some(username) = result.get("username").and_then(Value::as_str) {
                    service.username = Some(username.to_string());
                }
                if let Some(password) = result.get("password").and_then(Value::as_str) {
                    service.password = Some(password.to_string());
                }
            }
        }
        let service = self.store.update_service(service).await?;

        info!(
            service_id = service.id,
            module = %module,
            command = self.action.command(),
            status = ?service.status,
            "Module command completed"
        );
        Ok(CommandEnvelope::success_from(result))
    }
}

/// Builds the parameter bag legacy provisioning modules expect.
pub fn module_params(service: &Service, product: Option<&Product>, client: Option<&Client>) -> Params {
    let clients_details = match client {
        Some(c) => json!({
            "userid": c.id,
            "firstname": c.first_name,
            "lastname": c.last_name,
            "email": c.email,
            "fullname": c.full_name(),
            "companyname": c.company,
            "address1": c.address1,
            "address2": c.address2,
            "city": c.city,
            "state": c.state,
            "postcode": c.postcode,
            "country": c.country,
            "phonenumber": c.phone,
        }),
        None => Value::Object(Map::new()),
    };

    Params::new()
        .with("serviceid", service.id)
        .with("productid", service.product_id)
        .with("serverid", product.and_then(|p| p.server_id))
        .with("domain", service.domain.clone())
        .with("username", service.username.clone())
        .with("password", service.password.clone())
        .with("clientsdetails", clients_details)
        .with("customfields", Value::Object(service.custom_fields.clone()))
        .with("configoptions", Value::Object(service.config_options.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_action_table() {
        assert_eq!(ModuleAction::Suspend.operation(), "SuspendAccount");
        assert_eq!(ModuleAction::Unsuspend.resulting_status(), Some(ServiceStatus::Active));
        assert_eq!(ModuleAction::Create.resulting_status(), None);
    }

    #[test]
    fn test_module_params_shape() {
        let service = Service {
            id: 3,
            client_id: 1,
            product_id: 2,
            domain: Some("example.com".into()),
            username: None,
            password: None,
            status: ServiceStatus::Pending,
            custom_fields: Map::new(),
            config_options: Map::new(),
        };
        let product = Product {
            id: 2,
            name: "VPS".into(),
            server_module: Some("acme".into()),
            server_id: Some(9),
        };
        let client = Client {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            company: None,
            email: "ada@example.com".into(),
            address1: None,
            address2: None,
            city: None,
            state: None,
            postcode: None,
            country: Some("GB".into()),
            phone: None,
            status: "Active".into(),
            created_at: Utc::now(),
        };

        let params = module_params(&service, Some(&product), Some(&client));
        assert_eq!(params.get_i64("serverid"), Some(9));
        assert_eq!(params.get_str("domain"), Some("example.com"));
        assert_eq!(params.get("username"), Some(&Value::Null));
        assert_eq!(params.get("clientsdetails").unwrap()["fullname"], json!("Ada Lovelace"));
        assert_eq!(params.get("customfields"), Some(&json!({})));
    }
}
