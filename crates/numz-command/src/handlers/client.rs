//! `AddClient`, `GetClientsDetails` and `UpdateClient`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::info;

use numz_core::Params;
use numz_core::error::{AppError, ErrorKind};
use numz_core::result::AppResult;
use numz_core::traits::store::BillingStore;
use numz_core::types::billing::Client;

use super::text;
use crate::envelope::CommandEnvelope;
use crate::handler::{CommandHandler, CommandRequest};

/// Creates a client.
#[derive(Clone)]
pub struct AddClient {
    store: Arc<dyn BillingStore>,
}

impl std::fmt::Debug for AddClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AddClient")
    }
}

impl AddClient {
    /// Creates clients in `store`.
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for AddClient {
    fn command(&self) -> &str {
        "AddClient"
    }

    async fn handle(&self, request: CommandRequest<'_>) -> AppResult<CommandEnvelope> {
        let params = request.params;
        let first_name = params.require_str("firstname")?;
        let last_name = params.require_str("lastname")?;
        let email = params.require_str("email")?;

        let inserted = self
            .store
            .insert_client(Client {
                id: 0,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                company: text(params, "companyname"),
                email: email.to_string(),
                address1: text(params, "address1"),
                address2: text(params, "address2"),
                city: text(params, "city"),
                state: text(params, "state"),
                postcode: text(params, "postcode"),
                country: text(params, "country"),
                phone: text(params, "phonenumber"),
                status: "Active".to_string(),
                created_at: Utc::now(),
            })
            .await;
        let client = match inserted {
            Ok(client) => client,
            Err(e) => return conflict_as_envelope(e),
        };

        info!(client_id = client.id, "Client created");
        Ok(client_id(client.id))
    }
}

/// Returns a client's details, looked up by `clientid` or `email`.
#[derive(Clone)]
pub struct GetClientsDetails {
    store: Arc<dyn BillingStore>,
}

impl std::fmt::Debug for GetClientsDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GetClientsDetails")
    }
}

impl GetClientsDetails {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for GetClientsDetails {
    fn command(&self) -> &str {
        "GetClientsDetails"
    }

    async fn handle(&self, request: CommandRequest<'_>) -> AppResult<CommandEnvelope> {
        let params = request.params;
        let client = if let Some(id) = params.get_i64("clientid") {
            self.store.find_client(id).await?
        } else if let Some(email) = params.get_str("email") {
            self.store.find_client_by_email(email).await?
        } else {
            None
        };

        let Some(client) = client else {
            return Ok(CommandEnvelope::error("Client not found"));
        };

        Ok(CommandEnvelope::success_from(json!({
            "clientid": client.id,
            "userid": client.id,
            "firstname": client.first_name,
            "lastname": client.last_name,
            "fullname": client.full_name(),
            "companyname": client.company,
            "email": client.email,
            "address1": client.address1,
            "address2": client.address2,
            "city": client.city,
            "state": client.state,
            "postcode": client.postcode,
            "country": client.country,
            "phonenumber": client.phone,
            "datecreated": client.created_at.format("%Y-%m-%d").to_string(),
            "status": client.status,
        })))
    }
}

/// Updates the supplied fields of a client.
#[derive(Clone)]
pub struct UpdateClient {
    store: Arc<dyn BillingStore>,
}

impl std::fmt::Debug for UpdateClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UpdateClient")
    }
}

impl UpdateClient {
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for UpdateClient {
    fn command(&self) -> &str {
        "UpdateClient"
    }

    async fn handle(&self, request: CommandRequest<'_>) -> AppResult<CommandEnvelope> {
        let params = request.params;
        let id = params.require_i64("clientid")?;
        let Some(mut client) = self.store.find_client(id).await? else {
            return Ok(CommandEnvelope::error("Client not found"));
        };

        apply_updates(&mut client, params);
        let client = match self.store.update_client(client).await {
            Ok(client) => client,
            Err(e) => return conflict_as_envelope(e),
        };

        info!(client_id = client.id, "Client updated");
        Ok(client_id(client.id))
    }
}

/// Copies each supplied legacy field onto `client`.
fn apply_updates(client: &mut Client, params: &Params) {
    if let Some(v) = text(params, "firstname") {
        client.first_name = v;
    }
    if let Some(v) = text(params, "lastname") {
        client.last_name = v;
    }
    if let Some(v) = text(params, "email") {
        client.email = v;
    }
    if let Some(v) = text(params, "status") {
        client.status = v;
    }

    let optional = [
        ("companyname", &mut client.company),
        ("address1", &mut client.address1),
        ("address2", &mut client.address2),
        ("city", &mut client.city),
        ("state", &mut client.state),
        ("postcode", &mut client.postcode),
        ("country", &mut client.country),
        ("phonenumber", &mut client.phone),
    ];
    for (key, field) in optional {
        if let Some(v) = text(params, key) {
            *field = Some(v);
        }
    }
}

/// Store conflicts (a taken email address) go back to the caller as error
/// envelopes; anything else propagates.
fn conflict_as_envelope(err: AppError) -> AppResult<CommandEnvelope> {
    match err.kind {
        ErrorKind::Conflict => Ok(CommandEnvelope::error(err.message)),
        _ => Err(err),
    }
}

fn client_id(id: i64) -> CommandEnvelope {
    let mut fields = Map::new();
    fields.insert("clientid".to_string(), Value::from(id));
    CommandEnvelope::success_with(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBillingStore;

    fn store() -> Arc<dyn BillingStore> {
        Arc::new(MemoryBillingStore::new())
    }

    fn ada() -> Params {
        Params::new()
            .with("firstname", "Ada")
            .with("lastname", "Lovelace")
            .with("email", "ada@example.com")
            .with("city", "London")
    }

    async fn run(handler: &dyn CommandHandler, params: &Params) -> CommandEnvelope {
        handler
            .handle(CommandRequest {
                params,
                acting_user: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_then_get() {
        let store = store();
        let created = run(&AddClient::new(store.clone()), &ada()).await;
        assert_eq!(created.get("clientid"), Some(&json!(1)));

        let details = run(
            &GetClientsDetails::new(store.clone()),
            &Params::new().with("email", "ADA@example.com"),
        )
        .await;
        assert_eq!(details.get("fullname"), Some(&json!("Ada Lovelace")));
        assert_eq!(details.get("city"), Some(&json!("London")));
        assert_eq!(details.get("companyname"), Some(&Value::Null));
        assert_eq!(details.get("status"), Some(&json!("Active")));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = store();
        let handler = AddClient::new(store);
        run(&handler, &ada()).await;
        let second = run(&handler, &ada()).await;
        assert_eq!(
            second.message(),
            Some("A client already exists with that email address")
        );
    }

    #[tokio::test]
    async fn test_update_cannot_take_another_clients_email() {
        let store = store();
        run(&AddClient::new(store.clone()), &ada()).await;
        let bob = ada().with("firstname", "Bob").with("email", "bob@example.com");
        run(&AddClient::new(store.clone()), &bob).await;

        let params = Params::new().with("clientid", 2).with("email", "ADA@example.com");
        let envelope = run(&UpdateClient::new(store.clone()), &params).await;
        assert_eq!(
            envelope.message(),
            Some("A client already exists with that email address")
        );
        let unchanged = store.find_client(2).await.unwrap().unwrap();
        assert_eq!(unchanged.email, "bob@example.com");
    }

    #[tokio::test]
    async fn test_missing_fields_are_errors() {
        let err = AddClient::new(store())
            .handle(CommandRequest {
                params: &Params::new().with("firstname", "Ada"),
                acting_user: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.message, "Missing required parameter 'lastname'");
    }

    #[tokio::test]
    async fn test_update_changes_only_supplied_fields() {
        let store = store();
        run(&AddClient::new(store.clone()), &ada()).await;

        let params = Params::new().with("clientid", "1").with("lastname", "Byron");
        let updated = run(&UpdateClient::new(store.clone()), &params).await;
        assert!(updated.is_success());

        let client = store.find_client(1).await.unwrap().unwrap();
        assert_eq!(client.full_name(), "Ada Byron");
        assert_eq!(client.city.as_deref(), Some("London"));
    }

    #[tokio::test]
    async fn test_unknown_client() {
        let envelope = run(&GetClientsDetails::new(store()), &Params::new().with("clientid", 9)).await;
        assert_eq!(envelope.message(), Some("Client not found"));
        let envelope = run(&UpdateClient::new(store()), &Params::new().with("clientid", 9)).await;
        assert_eq!(envelope.message(), Some("Client not found"));
    }
}
