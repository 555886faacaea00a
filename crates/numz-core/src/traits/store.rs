//! Data store seam used by the command handlers.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::billing::{Client, Domain, Invoice, Product, Service};

/// Access to the surrounding billing data model.
///
/// Lookups return `Ok(None)` for absent records; handlers decide how absence
/// is reported.
#[async_trait]
pub trait BillingStore: Send + Sync + 'static {
    /// Find a client by ID.
    async fn find_client(&self, id: i64) -> AppResult<Option<Client>>;

    /// Find a client by email address (case-insensitive).
    async fn find_client_by_email(&self, email: &str) -> AppResult<Option<Client>>;

    /// Insert a client. The store assigns the ID. Email addresses are unique
    /// (case-insensitive); a taken address fails with a conflict error.
    async fn insert_client(&self, client: Client) -> AppResult<Client>;

    /// Replace a stored client. Changing the email to one held by another
    /// client fails with a conflict error.
    async fn update_client(&self, client: Client) -> AppResult<Client>;

    /// Find a product by ID.
    async fn find_product(&self, id: i64) -> AppResult<Option<Product>>;

    /// Insert a product. The store assigns the ID.
    async fn insert_product(&self, product: Product) -> AppResult<Product>;

    /// Distinct provisioning module names referenced by at least one product.
    async fn product_server_modules(&self) -> AppResult<Vec<String>>;

    /// Find a service by ID.
    async fn find_service(&self, id: i64) -> AppResult<Option<Service>>;

    /// Insert a service. The store assigns the ID.
    async fn insert_service(&self, service: Service) -> AppResult<Service>;

    /// Replace a stored service.
    async fn update_service(&self, service: Service) -> AppResult<Service>;

    /// Find an invoice by ID.
    async fn find_invoice(&self, id: i64) -> AppResult<Option<Invoice>>;

    /// Insert an invoice. The store assigns the invoice and line IDs.
    async fn insert_invoice(&self, invoice: Invoice) -> AppResult<Invoice>;

    /// Insert a domain. The store assigns the ID.
    async fn insert_domain(&self, domain: Domain) -> AppResult<Domain>;

    /// Replace a stored domain.
    async fn update_domain(&self, domain: Domain) -> AppResult<Domain>;
}
