//! In-process cache backend.

mod store;

pub use store::MemoryCacheProvider;
