//! # numz-runtime
//!
//! Builds the compatibility runtime from [`AppConfig`](numz_core::config::AppConfig)
//! and runs the startup pass: hook catalogue, module discovery and loading,
//! module hook registration and plugin loading.

pub mod builder;
pub mod runtime;

pub use builder::RuntimeBuilder;
pub use runtime::{BootstrapReport, CompatRuntime};
