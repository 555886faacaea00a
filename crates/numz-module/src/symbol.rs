//! Symbol tables: what a loaded module entry point exports.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use numz_core::traits::hook::HookHandler;

use crate::function::{FnModuleFunction, ModuleFunction};

/// A hook registration shipped alongside a module.
#[derive(Clone)]
pub struct ModuleHook {
    /// Hook point name.
    pub point: String,
    /// Execution priority (lower runs first).
    pub priority: i32,
    /// Listener.
    pub handler: Arc<dyn HookHandler>,
}

impl fmt::Debug for ModuleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHook")
            .field("point", &self.point)
            .field("priority", &self.priority)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// Top-level callables exported by one module entry point, keyed by their
/// full symbol name (`<module>_<Operation>`), plus any hook registrations.
#[derive(Clone, Default)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Arc<dyn ModuleFunction>>,
    hooks: Vec<ModuleHook>,
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("symbols", &self.symbols.keys().collect::<Vec<_>>())
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function under its full symbol name.
    pub fn with_function(mut self, symbol: &str, function: impl ModuleFunction) -> Self {
        self.insert(symbol, Arc::new(function));
        self
    }

    /// Adds a synchronous closure under its full symbol name.
    pub fn with_fn<F>(self, symbol: &str, handler: F) -> Self
    where
        F: Fn(&numz_core::Params) -> Result<serde_json::Value, crate::error::ModuleFault>
            + Send
            + Sync
            + 'static,
    {
        self.with_function(symbol, FnModuleFunction::sync(handler))
    }

    /// Adds a hook registration.
    pub fn with_hook(mut self, point: &str, priority: i32, handler: Arc<dyn HookHandler>) -> Self {
        self.hooks.push(ModuleHook {
            point: point.to_string(),
            priority,
            handler,
        });
        self
    }

    /// Inserts a function under its full symbol name.
    pub fn insert(&mut self, symbol: &str, function: Arc<dyn ModuleFunction>) {
        self.symbols.insert(symbol.to_string(), function);
    }

    /// Full symbol names, sorted.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    /// Hook registrations, in declaration order.
    pub fn hooks(&self) -> &[ModuleHook] {
        &self.hooks
    }

    /// Functions exported as `<module>_<Operation>`, keyed by `<Operation>`.
    ///
    /// Symbols without the prefix, or with nothing after it, are ignored.
    pub fn operations_for(&self, module: &str) -> BTreeMap<String, Arc<dyn ModuleFunction>> {
        let prefix = format!("{module}_");
        self.symbols
            .iter()
            .filter_map(|(symbol, function)| {
                symbol
                    .strip_prefix(&prefix)
                    .filter(|operation| !operation.is_empty())
                    .map(|operation| (operation.to_string(), Arc::clone(function)))
            })
            .collect()
    }
}
