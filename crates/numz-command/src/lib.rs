//! # numz-command
//!
//! The legacy command surface: a case-insensitive table of named commands,
//! each producing a `{"result": "success" | "error", ...}` envelope.
//!
//! - [`CommandDispatcher`] routes a command name to its handler, executes it
//!   once and wraps every outcome (including panics) in an envelope.
//! - [`handlers`] implements the client, service, invoice and domain
//!   commands against a [`BillingStore`](numz_core::traits::BillingStore).
//! - [`MemoryBillingStore`] is an in-process store for tests and the CLI.

pub mod dispatcher;
pub mod envelope;
pub mod handler;
pub mod handlers;
pub mod store;

pub use dispatcher::CommandDispatcher;
pub use envelope::CommandEnvelope;
pub use handler::{CommandHandler, CommandRequest};
pub use store::{BillingSeed, MemoryBillingStore};
