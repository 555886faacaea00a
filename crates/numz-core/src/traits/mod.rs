//! Core traits defined in `numz-core` and implemented by other crates.

pub mod cache;
pub mod hook;
pub mod store;

pub use cache::CacheProvider;
pub use hook::{HookFault, HookHandler};
pub use store::BillingStore;
