//! Callable module operations.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use numz_core::Params;

use crate::error::ModuleFault;

/// One exported module operation.
#[async_trait]
pub trait ModuleFunction: Send + Sync + 'static {
    /// Run the operation with the legacy parameter bag.
    async fn call(&self, params: &Params) -> Result<Value, ModuleFault>;
}

type BoxedFn = Arc<dyn Fn(Params) -> BoxFuture<'static, Result<Value, ModuleFault>> + Send + Sync>;

/// A closure-based module function.
#[derive(Clone)]
pub struct FnModuleFunction {
    handler: BoxedFn,
}

impl std::fmt::Debug for FnModuleFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnModuleFunction")
            .field("handler", &"<closure>")
            .finish()
    }
}

impl FnModuleFunction {
    /// Wraps an async closure. The closure receives its own copy of the params.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ModuleFault>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |params| Box::pin(handler(params))),
        }
    }

    /// Wraps a synchronous closure.
    pub fn sync<F>(handler: F) -> Self
    where
        F: Fn(&Params) -> Result<Value, ModuleFault> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(move |params| {
                let result = handler(&params);
                Box::pin(futures::future::ready(result))
            }),
        }
    }

    /// A function that always returns `value`. Handy for accessors such as `MetaData`.
    pub fn constant(value: Value) -> Self {
        Self::sync(move |_| Ok(value.clone()))
    }
}

#[async_trait]
impl ModuleFunction for FnModuleFunction {
    async fn call(&self, params: &Params) -> Result<Value, ModuleFault> {
        (self.handler)(params.clone()).await
    }
}
