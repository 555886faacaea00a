//! Hook system: catalogue, registration table, execution history and bus.

pub mod bus;
pub mod definitions;
pub mod history;
pub mod registry;

pub use bus::HookBus;
pub use definitions::{CommonHook, HookBinding, HookOutcome};
pub use history::{ExecutionHistory, ExecutionRecord};
pub use registry::HookRegistry;
