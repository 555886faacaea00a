//! # numz-cache
//!
//! Expiring cache for answers the runtime recomputes rarely: the active
//! module names per category and the installed-plugin list. Entries carry
//! their own TTL; [`CacheManager`] picks the backend from configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::CacheManager;
