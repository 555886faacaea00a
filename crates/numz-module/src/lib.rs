//! # numz-module
//!
//! Module registry for legacy-convention extension modules. Provides:
//!
//! - Category table mapping canonical labels to on-disk directories
//! - Discovery of `<root>/<category>/<name>/<name>.<ext>` entry files
//! - Loading through pluggable [`ModuleLoader`]s into immutable descriptors
//! - Invocation with timeouts, cancellation and panic isolation
//! - Per-category validation of required operations
//! - Cached active-set queries and explicit invalidation
//! - Optional dynamic loading via `libloading` (`dynamic` feature)

pub mod active;
pub mod category;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod function;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod symbol;
pub mod validation;

pub use active::{ActiveModuleSource, ConfigActiveSource, StoreActiveSource};
pub use category::ModuleCategory;
pub use descriptor::ModuleDescriptor;
pub use discovery::{DiscoveryReport, ModuleEntry};
pub use error::{DiscoveryError, ModuleError, ModuleFault};
pub use function::{FnModuleFunction, ModuleFunction};
pub use loader::native::NativeModuleLoader;
pub use loader::{LoaderSet, ModuleLoader};
pub use manifest::{EntryManifest, LoaderKind};
pub use registry::{InvokeOptions, ModuleRegistry};
pub use symbol::{ModuleHook, SymbolTable};
pub use validation::ValidationReport;
