//! `CreateInvoice` and `GetInvoice`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use serde_json::{Map, Value, json};
use tracing::info;

use numz_core::result::AppResult;
use numz_core::traits::store::BillingStore;
use numz_core::types::billing::{Invoice, InvoiceItem, InvoiceStatus};
use numz_core::{AppError, Params};

use super::text;
use crate::envelope::CommandEnvelope;
use crate::handler::{CommandHandler, CommandRequest};

/// Days until an invoice falls due when no `duedate` is supplied.
const DEFAULT_TERMS_DAYS: u64 = 14;

/// Creates an invoice, optionally with `itemdescriptionN`/`itemamountN` lines.
pub struct CreateInvoice {
    store: Arc<dyn BillingStore>,
}

impl std::fmt::Debug for CreateInvoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CreateInvoice")
    }
}

impl CreateInvoice {
    /// Creates invoices in `store`.
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for CreateInvoice {
    fn command(&self) -> &str {
        "CreateInvoice"
    }

    async fn handle(&self, request: CommandRequest<'_>) -> AppResult<CommandEnvelope> {
        let params = request.params;
        let client_id = params.require_i64("userid")?;
        if self.store.find_client(client_id).await?.is_none() {
            return Ok(CommandEnvelope::error("Client not found"));
        }

        let today = Utc::now().date_naive();
        let due_on = match params.get_str("duedate") {
            Some(raw) => parse_date(raw)?,
            None => today + Days::new(DEFAULT_TERMS_DAYS),
        };
        let status = match params.get_str("status") {
            Some(raw) => InvoiceStatus::parse(raw)
                .ok_or_else(|| AppError::validation(format!("Invalid invoice status '{raw}'")))?,
            None => InvoiceStatus::Unpaid,
        };

        let items = line_items(params)?;
        let subtotal = items
            .iter()
            .try_fold(0_i64, |total, item| total.checked_add(item.amount_cents))
            .ok_or_else(|| AppError::validation("Invoice total is out of range"))?;

        let invoice = self
            .store
            .insert_invoice(Invoice {
                id: 0,
                client_id,
                number: text(params, "invoicenum").unwrap_or_default(),
                created_on: today,
                due_on,
                paid_on: (status == InvoiceStatus::Paid).then_some(today),
                subtotal_cents: subtotal,
                tax_cents: 0,
                total_cents: subtotal,
                status,
                notes: text(params, "notes"),
                items,
            })
            .await?;

        info!(invoice_id = invoice.id, client_id, total_cents = invoice.total_cents, "Invoice created");

        let mut fields = Map::new();
        fields.insert("invoiceid".to_string(), Value::from(invoice.id));
        Ok(CommandEnvelope::success_with(fields))
    }
}

/// Returns an invoice with its line items.
pub struct GetInvoice {
    store: Arc<dyn BillingStore>,
}

impl std::fmt::Debug for GetInvoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GetInvoice")
    }
}

impl GetInvoice {
    /// Reads invoices from `store`.
    pub fn new(store: Arc<dyn BillingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandHandler for GetInvoice {
    fn command(&self) -> &str {
        "GetInvoice"
    }

    async fn handle(&self, request: CommandRequest<'_>) -> AppResult<CommandEnvelope> {
        let id = request.params.require_i64("invoiceid")?;
        let Some(invoice) = self.store.find_invoice(id).await? else {
            return Ok(CommandEnvelope::error("Invoice not found"));
        };

        let items: Vec<Value> = invoice
            .items
            .iter()
            .map(|item| {
                json!({
                    "id": item.id,
                    "description": item.description,
                    "amount": money(item.amount_cents),
                })
            })
            .collect();

        Ok(CommandEnvelope::success_from(json!({
            "invoiceid": invoice.id,
            "invoicenum": invoice.number,
            "userid": invoice.client_id,
            "date": invoice.created_on.format("%Y-%m-%d").to_string(),
            "duedate": invoice.due_on.format("%Y-%m-%d").to_string(),
            "datepaid": invoice.paid_on.map(|d| d.format("%Y-%m-%d").to_string()),
            "subtotal": money(invoice.subtotal_cents),
            "tax": money(invoice.tax_cents),
            "total": money(invoice.total_cents),
            "balance": money(invoice.total_cents),
            "status": invoice.status.as_str(),
            "items": items,
        })))
    }
}

fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

/// Reads numbered `itemdescriptionN` / `itemamountN` pairs, starting at 1.
fn line_items(params: &Params) -> AppResult<Vec<InvoiceItem>> {
    let mut items = Vec::new();
    for n in 1.. {
        let Some(description) = params.get_str(&format!("itemdescription{n}")) else {
            break;
        };
        let key = format!("itemamount{n}");
        let amount_cents = match params.get(&key) {
            Some(value) => parse_amount(value)
                .ok_or_else(|| AppError::validation(format!("Invalid amount for '{key}'")))?,
            None => 0,
        };
        items.push(InvoiceItem {
            id: 0,
            description: description.to_string(),
            amount_cents,
        });
    }
    Ok(items)
}

/// Parses `12`, `12.5`, `"12.50"` or `"-3.05"` into minor units.
///
/// Both parts must be plain ASCII digits and the fraction, when present, has
/// one or two of them.
fn parse_amount(value: &Value) -> Option<i64> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.as_str()),
    };
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) if !fraction.is_empty() => (whole, fraction),
        Some(_) => return None,
        None => (digits, ""),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !all_digits(whole)
        || !all_digits(fraction)
        || fraction.len() > 2
    {
        return None;
    }
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse::<i64>().ok()?,
    };
    let cents = whole.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -cents } else { cents })
}

/// Formats minor units with two decimals and no grouping.
fn money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::client::AddClient;
    use crate::store::MemoryBillingStore;

    async fn run(handler: &dyn CommandHandler, params: &Params) -> AppResult<CommandEnvelope> {
        handler
            .handle(CommandRequest {
                params,
                acting_user: None,
            })
            .await
    }

    async fn store_with_client() -> Arc<dyn BillingStore> {
        let store: Arc<dyn BillingStore> = Arc::new(MemoryBillingStore::new());
        let params = Params::new()
            .with("firstname", "Ada")
            .with("lastname", "Lovelace")
            .with("email", "ada@example.com");
        run(&AddClient::new(store.clone()), &params).await.unwrap();
        store
    }

    #[test]
    fn test_amounts() {
        assert_eq!(parse_amount(&json!("12.50")), Some(1250));
        assert_eq!(parse_amount(&json!(12.5)), Some(1250));
        assert_eq!(parse_amount(&json!(7)), Some(700));
        assert_eq!(parse_amount(&json!("-3.05")), Some(-305));
        assert_eq!(parse_amount(&json!("abc")), None);
        assert_eq!(parse_amount(&json!(".5")), Some(50));
    }

    #[test]
    fn test_amounts_reject_malformed_fractions_and_signs() {
        assert_eq!(parse_amount(&json!("1.-5")), None);
        assert_eq!(parse_amount(&json!("1.+5")), None);
        assert_eq!(parse_amount(&json!("12.999")), None);
        assert_eq!(parse_amount(&json!("12.")), None);
        assert_eq!(parse_amount(&json!("--5")), None);
        assert_eq!(parse_amount(&json!("+5")), None);
        assert_eq!(parse_amount(&json!("99999999999999999999")), None);
        assert_eq!(money(1250), "12.50");
        assert_eq!(money(-305), "-3.05");
        assert_eq!(money(0), "0.00");
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = store_with_client().await;
        let params = Params::new()
            .with("userid", 1)
            .with("duedate", "2030-01-31")
            .with("itemdescription1", "Hosting")
            .with("itemamount1", "10.00")
            .with("itemdescription2", "Domain")
            .with("itemamount2", 12.5);
        let created = run(&CreateInvoice::new(store.clone()), &params).await.unwrap();
        let id = created.get("invoiceid").cloned().unwrap();

        let fetched = run(&GetInvoice::new(store), &Params::new().with("invoiceid", id))
            .await
            .unwrap();
        assert_eq!(fetched.get("total"), Some(&json!("22.50")));
        assert_eq!(fetched.get("balance"), Some(&json!("22.50")));
        assert_eq!(fetched.get("duedate"), Some(&json!("2030-01-31")));
        assert_eq!(fetched.get("status"), Some(&json!("unpaid")));
        assert_eq!(fetched.get("datepaid"), Some(&Value::Null));
        assert_eq!(fetched.get("items").unwrap()[1]["amount"], json!("12.50"));
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let store = store_with_client().await;
        let handler = CreateInvoice::new(store);

        let err = run(&handler, &Params::new().with("userid", 1).with("status", "overdue"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Invalid invoice status 'overdue'");

        let envelope = run(&handler, &Params::new().with("userid", 99)).await.unwrap();
        assert_eq!(envelope.message(), Some("Client not found"));
    }

    #[tokio::test]
    async fn test_total_overflow_is_rejected() {
        let store = store_with_client().await;
        let params = Params::new()
            .with("userid", 1)
            .with("itemdescription1", "Dedicated rack")
            .with("itemamount1", "90000000000000000")
            .with("itemdescription2", "Second rack")
            .with("itemamount2", "90000000000000000");

        let err = run(&CreateInvoice::new(store), &params).await.unwrap_err();
        assert_eq!(err.message, "Invoice total is out of range");
    }

    #[tokio::test]
    async fn test_unknown_invoice() {
        let store: Arc<dyn BillingStore> = Arc::new(MemoryBillingStore::new());
        let envelope = run(&GetInvoice::new(store), &Params::new().with("invoiceid", 4))
            .await
            .unwrap();
        assert_eq!(envelope.message(), Some("Invoice not found"));
    }
}
