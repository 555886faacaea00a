//! In-process [`BillingStore`] backed by concurrent maps.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use numz_core::error::AppError;
use numz_core::result::AppResult;
use numz_core::traits::store::BillingStore;
use numz_core::types::billing::{Client, Domain, Invoice, Product, Service};

/// Records to preload into a [`MemoryBillingStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingSeed {
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub domains: Vec<Domain>,
}

/// Message of the conflict raised when an email address is already taken.
pub const DUPLICATE_EMAIL: &str = "A client already exists with that email address";

/// A table with store-assigned IDs.
#[derive(Debug)]
struct Table<T> {
    rows: DashMap<i64, T>,
    next_id: AtomicI64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Inserts a row with a known ID and keeps the allocator ahead of it.
    fn put(&self, id: i64, row: T) {
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
        self.rows.insert(id, row);
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).map(|row| row.value().clone())
    }

    fn replace(&self, id: i64, row: T, what: &str) -> AppResult<()> {
        match self.rows.get_mut(&id) {
            Some(mut slot) => {
                *slot = row;
                Ok(())
            }
            None => Err(AppError::not_found(format!("{what} {id} not found"))),
        }
    }
}

/// In-memory billing data.
#[derive(Debug)]
pub struct MemoryBillingStore {
    clients: Table<Client>,
    /// Lowercased email to client ID. Claimed through `entry` so the
    /// uniqueness check and the insert happen under one shard lock.
    client_emails: DashMap<String, i64>,
    products: Table<Product>,
    services: Table<Service>,
    invoices: Table<Invoice>,
    domains: Table<Domain>,
    invoice_items: AtomicI64,
}

impl MemoryBillingStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            clients: Table::new(),
            client_emails: DashMap::new(),
            products: Table::new(),
            services: Table::new(),
            invoices: Table::new(),
            domains: Table::new(),
            invoice_items: AtomicI64::new(1),
        }
    }

    /// Creates a store holding `seed`. Seeded rows keep their IDs.
    pub fn from_seed(seed: BillingSeed) -> Self {
        let store = Self::new();
        for client in seed.clients {
            store.client_emails.insert(email_key(&client.email), client.id);
            store.clients.put(client.id, client);
        }
        for product in seed.products {
            store.products.put(product.id, product);
        }
        for service in seed.services {
            store.services.put(service.id, service);
        }
        for invoice in seed.invoices {
            for item in &invoice.items {
                store.invoice_items.fetch_max(item.id + 1, Ordering::SeqCst);
            }
            store.invoices.put(invoice.id, invoice);
        }
        for domain in seed.domains {
            store.domains.put(domain.id, domain);
        }
        debug!(
            clients = store.clients.rows.len(),
            products = store.products.rows.len(),
            services = store.services.rows.len(),
            "Billing store seeded"
        );
        store
    }

    /// Reads a JSON seed file.
    pub async fn load_seed(path: &std::path::Path) -> AppResult<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        let seed: BillingSeed = serde_json::from_str(&text)?;
        Ok(Self::from_seed(seed))
    }

    /// Domain by ID.
    pub fn domain(&self, id: i64) -> Option<Domain> {
        self.domains.get(id)
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl Default for MemoryBillingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BillingStore for MemoryBillingStore {
    async fn find_client(&self, id: i64) -> AppResult<Option<Client>> {
        Ok(self.clients.get(id))
    }

    async fn find_client_by_email(&self, email: &str) -> AppResult<Option<Client>> {
        let id = self.client_emails.get(&email_key(email)).map(|id| *id);
        Ok(id.and_then(|id| self.clients.get(id)))
    }

    async fn insert_client(&self, mut client: Client) -> AppResult<Client> {
        match self.client_emails.entry(email_key(&client.email)) {
            Entry::Occupied(_) => Err(AppError::conflict(DUPLICATE_EMAIL)),
            Entry::Vacant(slot) => {
                client.id = self.clients.allocate();
                self.clients.rows.insert(client.id, client.clone());
                slot.insert(client.id);
                Ok(client)
            }
        }
    }

    async fn update_client(&self, client: Client) -> AppResult<Client> {
        let Some(previous) = self.clients.get(client.id) else {
            return Err(AppError::not_found(format!("Client {} not found", client.id)));
        };
        let (old_key, new_key) = (email_key(&previous.email), email_key(&client.email));
        if old_key != new_key {
            match self.client_emails.entry(new_key) {
                Entry::Occupied(_) => return Err(AppError::conflict(DUPLICATE_EMAIL)),
                Entry::Vacant(slot) => {
                    slot.insert(client.id);
                }
            }
            self.client_emails.remove(&old_key);
        }
        self.clients.replace(client.id, client.clone(), "Client")?;
        Ok(client)
    }

    async fn find_product(&self, id: i64) -> AppResult<Option<Product>> {
        Ok(self.products.get(id))
    }

    async fn insert_product(&self, mut product: Product) -> AppResult<Product> {
        product.id = self.products.allocate();
        self.products.rows.insert(product.id, product.clone());
        Ok(product)
    }

    async fn product_server_modules(&self) -> AppResult<Vec<String>> {
        let modules: BTreeSet<String> = self
            .products
            .rows
            .iter()
            .filter_map(|row| row.server_module.clone())
            .filter(|name| !name.is_empty())
            .collect();
        Ok(modules.into_iter().collect())
    }

    async fn find_service(&self, id: i64) -> AppResult<Option<Service>> {
        Ok(self.services.get(id))
    }

    async fn insert_service(&self, mut service: Service) -> AppResult<Service> {
        service.id = self.services.allocate();
        self.services.rows.insert(service.id, service.clone());
        Ok(service)
    }

    async fn update_service(&self, service: Service) -> AppResult<Service> {
        self.services.replace(service.id, service.clone(), "Service")?;
        Ok(service)
    }

    async fn find_invoice(&self, id: i64) -> AppResult<Option<Invoice>> {
        Ok(self.invoices.get(id))
    }

    async fn insert_invoice(&self, mut invoice: Invoice) -> AppResult<Invoice> {
        invoice.id = self.invoices.allocate();
        for item in &mut invoice.items {
            item.id = self.invoice_items.fetch_add(1, Ordering::SeqCst);
        }
        if invoice.number.is_empty() {
            invoice.number = format!("INV-{}-{:05}", invoice.created_on.format("%Y"), invoice.id);
        }
        self.invoices.rows.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn insert_domain(&self, mut domain: Domain) -> AppResult<Domain> {
        domain.id = self.domains.allocate();
        self.domains.rows.insert(domain.id, domain.clone());
        Ok(domain)
    }

    async fn update_domain(&self, domain: Domain) -> AppResult<Domain> {
        self.domains.replace(domain.id, domain.clone(), "Domain")?;
        Ok(domain)
    }
}
