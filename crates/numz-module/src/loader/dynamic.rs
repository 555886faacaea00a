//! Dynamic module loader using `libloading` (feature-gated).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::info;

use numz_core::Params;

use crate::discovery::ModuleEntry;
use crate::error::{ModuleError, ModuleFault};
use crate::function::ModuleFunction;
use crate::manifest::LoaderKind;
use crate::symbol::SymbolTable;

use super::ModuleLoader;
use super::ffi::{self, ExportsFn, FreeFn, ModuleFn};

/// Loads modules from shared libraries (.so / .dll / .dylib).
#[derive(Default)]
pub struct DynamicModuleLoader {
    /// Loaded libraries, kept alive for the lifetime of the loader.
    libraries: DashMap<PathBuf, Arc<libloading::Library>>,
}

impl std::fmt::Debug for DynamicModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicModuleLoader")
            .field("loaded_count", &self.libraries.len())
            .finish()
    }
}

impl DynamicModuleLoader {
    /// Creates a new dynamic loader.
    pub fn new() -> Self {
        Self::default()
    }

    fn library_path(entry: &ModuleEntry) -> PathBuf {
        match &entry.manifest.library {
            Some(file) => entry.directory.join(file),
            None => entry
                .directory
                .join(libloading::library_filename(&entry.name)),
        }
    }

    fn open(&self, entry: &ModuleEntry, path: &PathBuf) -> Result<Arc<libloading::Library>, ModuleError> {
        if let Some(lib) = self.libraries.get(path) {
            return Ok(Arc::clone(lib.value()));
        }

        // SAFETY: loading a library runs its initialisers; only trusted
        // module directories should be configured.
        let lib = unsafe { libloading::Library::new(path) }.map_err(|e| ModuleError::Load {
            category: entry.category,
            name: entry.name.clone(),
            reason: format!("cannot open '{}': {e}", path.display()),
        })?;
        let lib = Arc::new(lib);
        self.libraries.insert(path.clone(), Arc::clone(&lib));
        Ok(lib)
    }
}

/// Reads and frees a string returned by a module library.
///
/// # Safety
/// `ptr` must be null or a string allocated by the library that exports `free`.
unsafe fn take_string(ptr: *mut std::os::raw::c_char, free: FreeFn) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let value = unsafe { ffi::c_str_to_string(ptr) };
    unsafe { free(ptr) };
    value
}

#[async_trait]
impl ModuleLoader for DynamicModuleLoader {
    fn kind(&self) -> LoaderKind {
        LoaderKind::Dynamic
    }

    async fn load(&self, entry: &ModuleEntry) -> Result<SymbolTable, ModuleError> {
        let path = Self::library_path(entry);
        let lib = self.open(entry, &path)?;
        let load_error = |reason: String| ModuleError::Load {
            category: entry.category,
            name: entry.name.clone(),
            reason,
        };

        let free_symbol = format!("{}_Free", entry.name);
        let exports_symbol = format!("{}_Exports", entry.name);

        // SAFETY: symbol types follow the ABI documented in `ffi`.
        let exported = unsafe {
            let free: libloading::Symbol<FreeFn> = lib
                .get(free_symbol.as_bytes())
                .map_err(|e| load_error(format!("missing '{free_symbol}': {e}")))?;
            let exports: libloading::Symbol<ExportsFn> = lib
                .get(exports_symbol.as_bytes())
                .map_err(|e| load_error(format!("missing '{exports_symbol}': {e}")))?;
            take_string(exports(), *free)
        }
        .ok_or_else(|| load_error(format!("'{exports_symbol}' returned no data")))?;

        let symbols: Vec<String> = serde_json::from_str(&exported)
            .map_err(|e| load_error(format!("'{exports_symbol}' is not a JSON string array: {e}")))?;

        let mut table = SymbolTable::new();
        for symbol in symbols {
            // SAFETY: only checks presence; the pointer is re-resolved per call.
            unsafe { lib.get::<ModuleFn>(symbol.as_bytes()) }
                .map_err(|e| load_error(format!("exported symbol '{symbol}' is missing: {e}")))?;
            table.insert(
                &symbol,
                Arc::new(DynamicFunction {
                    library: Arc::clone(&lib),
                    symbol: symbol.clone(),
                    free_symbol: free_symbol.clone(),
                }),
            );
        }

        info!(
            category = %entry.category,
            module = %entry.name,
            path = %path.display(),
            symbols = table.symbols().count(),
            "Dynamic module loaded"
        );
        Ok(table)
    }
}

/// One function exported by a module library.
struct DynamicFunction {
    library: Arc<libloading::Library>,
    symbol: String,
    free_symbol: String,
}

impl DynamicFunction {
    fn call_blocking(&self, params_json: String) -> Result<Value, ModuleFault> {
        let input = ffi::string_to_c_string(&params_json)
            .ok_or_else(|| ModuleFault::new("parameters contain a NUL byte"))?;

        // SAFETY: symbol types follow the ABI documented in `ffi`; the input
        // string outlives the call.
        let output = unsafe {
            let function: libloading::Symbol<ModuleFn> = self
                .library
                .get(self.symbol.as_bytes())
                .map_err(|e| ModuleFault::new(e.to_string()))?;
            let free: libloading::Symbol<FreeFn> = self
                .library
                .get(self.free_symbol.as_bytes())
                .map_err(|e| ModuleFault::new(e.to_string()))?;
            take_string(function(input.as_ptr()), *free)
        }
        .ok_or_else(|| ModuleFault::new(format!("{} returned no result", self.symbol)))?;

        let value: Value = serde_json::from_str(&output)
            .map_err(|e| ModuleFault::new(format!("{} returned invalid JSON: {e}", self.symbol)))?;

        match value.get("error").and_then(Value::as_str) {
            Some(message) => Err(ModuleFault::new(message)),
            None => Ok(value),
        }
    }
}

#[async_trait]
impl ModuleFunction for DynamicFunction {
    async fn call(&self, params: &Params) -> Result<Value, ModuleFault> {
        let params_json =
            serde_json::to_string(params).map_err(|e| ModuleFault::new(e.to_string()))?;
        let this = DynamicFunction {
            library: Arc::clone(&self.library),
            symbol: self.symbol.clone(),
            free_symbol: self.free_symbol.clone(),
        };
        tokio::task::spawn_blocking(move || this.call_blocking(params_json))
            .await
            .map_err(|e| ModuleFault::new(format!("module call aborted: {e}")))?
    }
}
