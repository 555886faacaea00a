//! Shared value types.

pub mod billing;
pub mod params;

pub use billing::{Client, Domain, DomainStatus, Invoice, InvoiceItem, InvoiceStatus, Product, Service, ServiceStatus};
pub use params::Params;
