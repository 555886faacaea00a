//! Hook bus: fires a hook point at every registered listener.
//!
//! - Listeners run in priority order (lower first), then registration order.
//! - Firing iterates a snapshot; listeners registered during a firing run
//!   from the next firing on.
//! - A failing, panicking or timed-out listener yields an error-shaped
//!   result in its slot and the remaining listeners still run.
//! - Listeners run sequentially and may mutate shared state; a listener
//!   observes every side effect of the listeners ordered before it.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, error};

use numz_core::Params;
use numz_core::config::hooks::HookConfig;
use numz_core::error::panic_message;
use numz_core::traits::hook::HookHandler;

use super::definitions::{HookBinding, HookOutcome};
use super::history::{ExecutionHistory, ExecutionRecord};
use super::registry::{HookRegistration, HookRegistry, RegistrationSummary};

/// Hook registration table plus firing and history.
#[derive(Debug)]
pub struct HookBus {
    registry: Arc<HookRegistry>,
    history: Arc<ExecutionHistory>,
    handler_timeout: Option<Duration>,
}

impl HookBus {
    /// Creates an empty bus from configuration.
    pub fn new(config: &HookConfig) -> Self {
        Self {
            registry: Arc::new(HookRegistry::new()),
            history: Arc::new(ExecutionHistory::new(config.history_capacity)),
            handler_timeout: config.handler_timeout_seconds.map(Duration::from_secs),
        }
    }

    /// Creates a bus and declares the hook catalogue when configured to.
    pub async fn bootstrap(config: &HookConfig) -> Self {
        let bus = Self::new(config);
        if config.declare_catalog {
            bus.registry.declare_catalog().await;
        }
        bus
    }

    /// Registers a listener.
    pub async fn add_hook(&self, point: &str, priority: i32, handler: Arc<dyn HookHandler>) {
        self.registry.register(point, priority, handler, None).await;
    }

    /// Registers a listener on behalf of a plugin or module.
    pub async fn add_owned_hook(&self, binding: HookBinding, owner: &str) {
        self.registry
            .register(&binding.point, binding.priority, binding.handler, Some(owner))
            .await;
    }

    /// Fires `point`, returning one outcome per listener in execution order.
    ///
    /// A point with no listeners yields an empty list.
    pub async fn run(&self, point: &str, params: &Params) -> Vec<HookOutcome> {
        let registrations = self.registry.snapshot(point).await;
        if registrations.is_empty() {
            debug!(hook = %point, "No hook handlers registered");
            return Vec::new();
        }

        debug!(hook = %point, handler_count = registrations.len(), "Running hook");

        let mut outcomes = Vec::with_capacity(registrations.len());
        for registration in &registrations {
            let outcome = self.execute(registration, params).await;
            self.history
                .record(ExecutionRecord {
                    hook_point: point.to_string(),
                    priority: registration.priority,
                    handler: registration.handler.name().to_string(),
                    params: params.clone(),
                    result: outcome.to_value(),
                    failed: outcome.is_error(),
                    executed_at: Utc::now(),
                })
                .await;
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn execute(&self, registration: &HookRegistration, params: &Params) -> HookOutcome {
        let handler = registration.handler.name();
        let call = AssertUnwindSafe(registration.handler.handle(params)).catch_unwind();

        let result = match self.handler_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    error!(
                        hook = %registration.point,
                        handler = %handler,
                        timeout_secs = limit.as_secs(),
                        "Hook handler timed out"
                    );
                    return HookOutcome::failed(format!(
                        "Hook handler timed out after {}s",
                        limit.as_secs_f64()
                    ));
                }
            },
            None => call.await,
        };

        match result {
            Ok(Ok(value)) => HookOutcome::Completed(value),
            Ok(Err(fault)) => {
                error!(
                    hook = %registration.point,
                    handler = %handler,
                    error = %fault,
                    "Hook execution failed"
                );
                HookOutcome::failed(fault.message)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(
                    hook = %registration.point,
                    handler = %handler,
                    error = %message,
                    "Hook handler panicked"
                );
                HookOutcome::failed(message)
            }
        }
    }

    /// Whether at least one listener is registered for `point`.
    pub async fn has_hook(&self, point: &str) -> bool {
        self.registry.has_hook(point).await
    }

    /// Number of listeners registered for `point`.
    pub async fn count_hooks(&self, point: &str) -> usize {
        self.registry.count_hooks(point).await
    }

    /// Registration summaries for `point` in execution order.
    pub async fn get_hooks(&self, point: &str) -> Vec<RegistrationSummary> {
        self.registry.get_hooks(point).await
    }

    /// Every declared or registered hook point.
    pub async fn hook_points(&self) -> Vec<String> {
        self.registry.hook_points().await
    }

    /// Whether `point` is declared or has listeners.
    pub async fn is_declared(&self, point: &str) -> bool {
        self.registry.is_declared(point).await
    }

    /// Removes listeners at one priority, or the whole point.
    pub async fn remove_hook(&self, point: &str, priority: Option<i32>) -> usize {
        self.registry.remove_hook(point, priority).await
    }

    /// Execution records, oldest first, optionally for one point.
    pub async fn execution_history(&self, point: Option<&str>) -> Vec<ExecutionRecord> {
        self.history.entries(point).await
    }

    /// Drops the execution history.
    pub async fn clear_history(&self) {
        self.history.clear().await;
    }

    /// Returns the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}
