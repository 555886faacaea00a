//! Billing records the command handlers read and write.
//!
//! Only the fields the legacy command surface exchanges are modelled.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A client account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Client ID.
    pub id: i64,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Company name.
    pub company: Option<String>,
    /// Email address.
    pub email: String,
    /// Address line 1.
    pub address1: Option<String>,
    /// Address line 2.
    pub address2: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State or region.
    pub state: Option<String>,
    /// Postcode.
    pub postcode: Option<String>,
    /// Country code.
    pub country: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Account status.
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A product a service is provisioned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: i64,
    /// Product name.
    pub name: String,
    /// Provisioning module bound to this product.
    pub server_module: Option<String>,
    /// Server the product provisions onto.
    pub server_id: Option<i64>,
}

/// Service lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Ordered but not provisioned.
    Pending,
    /// Provisioned and running.
    Active,
    /// Suspended by the provider.
    Suspended,
    /// Terminated.
    Terminated,
}

/// A provisioned (or to-be-provisioned) service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Service ID.
    pub id: i64,
    /// Owning client.
    pub client_id: i64,
    /// Product the service was ordered from.
    pub product_id: i64,
    /// Domain attached to the service.
    pub domain: Option<String>,
    /// Account username on the upstream system.
    pub username: Option<String>,
    /// Account password on the upstream system.
    pub password: Option<String>,
    /// Lifecycle status.
    pub status: ServiceStatus,
    /// Custom field values.
    pub custom_fields: Map<String, Value>,
    /// Configurable option values.
    pub config_options: Map<String, Value>,
}

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Awaiting payment.
    Unpaid,
    /// Paid in full.
    Paid,
    /// Cancelled.
    Cancelled,
    /// Refunded.
    Refunded,
    /// Draft, not yet issued.
    Draft,
}

impl InvoiceStatus {
    /// Parses a legacy status string.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "unpaid" => Some(Self::Unpaid),
            "paid" => Some(Self::Paid),
            "cancelled" => Some(Self::Cancelled),
            "refunded" => Some(Self::Refunded),
            "draft" => Some(Self::Draft),
            _ => None,
        }
    }

    /// Legacy status string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Draft => "draft",
        }
    }
}

/// A single invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Line ID.
    pub id: i64,
    /// Line description.
    pub description: String,
    /// Amount in minor units.
    pub amount_cents: i64,
}

/// An invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: i64,
    /// Owning client.
    pub client_id: i64,
    /// Human-facing invoice number.
    pub number: String,
    /// Issue date.
    pub created_on: NaiveDate,
    /// Due date.
    pub due_on: NaiveDate,
    /// Payment date.
    pub paid_on: Option<NaiveDate>,
    /// Subtotal in minor units.
    pub subtotal_cents: i64,
    /// Tax in minor units.
    pub tax_cents: i64,
    /// Total in minor units.
    pub total_cents: i64,
    /// Status.
    pub status: InvoiceStatus,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Line items.
    pub items: Vec<InvoiceItem>,
}

/// Domain status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    /// Registration requested.
    Pending,
    /// Registered with the registrar.
    Active,
}

/// A registered (or pending) domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Domain ID.
    pub id: i64,
    /// Owning client.
    pub client_id: i64,
    /// Fully-qualified domain name.
    pub name: String,
    /// Registrar module handling the domain.
    pub registrar: Option<String>,
    /// Registration period in years.
    pub registration_period: i64,
    /// Status.
    pub status: DomainStatus,
}
