//! Convenience listener implementations.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use numz_core::Params;
use numz_core::traits::hook::{HookFault, HookHandler};

type BoxedHandler = Arc<dyn Fn(Params) -> BoxFuture<'static, Result<Value, HookFault>> + Send + Sync>;

/// A closure-based hook listener for quick handler creation.
pub struct ClosureHandler {
    /// Listener identity.
    name: String,
    /// Handler function.
    handler: BoxedHandler,
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("name", &self.name)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl ClosureHandler {
    /// Creates a new closure-based handler. The closure receives its own
    /// copy of the firing's parameters.
    pub fn new<F, Fut>(name: &str, handler: F) -> Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HookFault>> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            handler: Arc::new(move |params| Box::pin(handler(params))),
        }
    }
}

#[async_trait]
impl HookHandler for ClosureHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, params: &Params) -> Result<Value, HookFault> {
        (self.handler)(params.clone()).await
    }
}
