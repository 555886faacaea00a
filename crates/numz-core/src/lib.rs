//! # numz-core
//!
//! Core crate for the Numz legacy-module compatibility runtime. Contains the
//! configuration schema, the cross-crate traits (cache, hook handlers, the
//! billing data store), the open parameter bag shared by modules, commands
//! and hooks, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Numz crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::params::Params;
