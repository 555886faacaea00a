//! `DomainRegister`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};

use numz_core::result::AppResult;
use numz_core::traits::store::BillingStore;
use numz_core::types::billing::{Domain, DomainStatus};
use numz_core::{AppError, Params};
use numz_module::{ModuleCategory, ModuleRegistry};

use super::{module_failure, text};
use crate::envelope::CommandEnvelope;
use crate::handler::{CommandHandler, CommandRequest};

/// Records a pending domain and, when a registrar is named, registers it
/// through the registrar module.
pub struct DomainRegister {
    store: Arc<dyn BillingStore>,
    modules: Arc<ModuleRegistry>,
}

impl std::fmt::Debug for DomainRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DomainRegister")
    }
}

impl DomainRegister {
    /// Registers through the registrar module named by the domain record.
    pub fn new(store: Arc<dyn BillingStore>, modules: Arc<ModuleRegistry>) -> Self {
        Self { store, modules }
    }
}

#[async_trait]
impl CommandHandler for DomainRegister {
    fn command(&self) -> &str {
        "DomainRegister"
    }

    async fn handle(&self, request: CommandRequest<'_>) -> AppResult<CommandEnvelope> {
        let params = request.params;
        let client_id = params
            .get_i64("userid")
            .or_else(|| params.get_i64("clientid"))
            .ok_or_else(|| AppError::validation("Missing required parameter 'userid'"))?;
        let name = params.require_str("domainname")?;
        let period = params.get_i64("regperiod").unwrap_or(1);
        if period < 1 {
            return Err(AppError::validation("Registration period must be at least one year"));
        }

        let mut domain = self
            .store
            .insert_domain(Domain {
                id: 0,
                client_id,
                name: name.to_string(),
                registrar: text(params, "registrar").filter(|r| !r.is_empty()),
                registration_period: period,
                status: DomainStatus::Pending,
            })
            .await?;

        if let Some(registrar) = domain.registrar.clone() {
            let registrar_params = Params::new()
                .with("domainname", domain.name.as_str())
                .with("regperiod", domain.registration_period);
            let result = self
                .modules
                .invoke(ModuleCategory::Registrar, &registrar, "RegisterDomain", &registrar_params)
                .await?;

            if let Some(message) = module_failure(&result) {
                warn!(domain = %domain.name, registrar = %registrar, error = %message, "Registrar refused domain");
                return Ok(CommandEnvelope::error(message));
            }

            domain.status = DomainStatus::Active;
            domain = self.store.update_domain(domain).await?;
        }

        info!(domain_id = domain.id, domain = %domain.name, status = ?domain.status, "Domain registered");

        let mut fields = Map::new();
        fields.insert("domainid".to_string(), Value::from(domain.id));
        Ok(CommandEnvelope::success_with(fields))
    }
}
