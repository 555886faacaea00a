//! Command dispatcher: routes a command name to its handler.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use numz_core::Params;
use numz_core::config::command::CommandConfig;
use numz_core::error::{AppError, panic_message};
use numz_core::result::AppResult;

use crate::envelope::CommandEnvelope;
use crate::handler::{CommandHandler, CommandRequest};

/// Routes, executes once and wraps the outcome. Never fails.
#[derive(Debug)]
pub struct CommandDispatcher {
    /// Lower-cased command name → handler.
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
    last_response: RwLock<Option<CommandEnvelope>>,
    log_params_on_error: bool,
    timeout: Option<Duration>,
}

impl CommandDispatcher {
    /// Creates an empty dispatcher.
    pub fn new(config: &CommandConfig) -> Self {
        Self {
            handlers: HashMap::new(),
            last_response: RwLock::new(None),
            log_params_on_error: config.log_params_on_error,
            timeout: config.timeout_seconds.map(Duration::from_secs),
        }
    }

    /// Registers a handler. A later handler with the same name replaces the
    /// earlier one.
    pub fn register(&mut self, handler: Arc<dyn CommandHandler>) {
        let command = handler.command().to_string();
        info!(command = %command, "Registered command handler");
        self.handlers.insert(command.to_ascii_lowercase(), handler);
    }

    /// Whether `command` resolves to a handler.
    pub fn has_command(&self, command: &str) -> bool {
        self.handlers.contains_key(&command.to_ascii_lowercase())
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .values()
            .map(|h| h.command().to_string())
            .collect();
        names.sort();
        names
    }

    /// Executes `command` with `params`.
    ///
    /// Unknown commands, handler errors, panics and timeouts all come back
    /// as error envelopes.
    pub async fn execute(
        &self,
        command: &str,
        params: &Params,
        acting_user: Option<&str>,
    ) -> CommandEnvelope {
        let Some(handler) = self.handlers.get(&command.to_ascii_lowercase()) else {
            warn!(command = %command, "Unknown command");
            return CommandEnvelope::error(format!("Command '{command}' not found"));
        };

        debug!(command = %handler.command(), acting_user = ?acting_user, "Executing command");

        let request = CommandRequest {
            params,
            acting_user,
        };
        match self.run(handler.as_ref(), request).await {
            Ok(envelope) => {
                *self.last_response.write().await = Some(envelope.clone());
                envelope
            }
            Err(e) => {
                if self.log_params_on_error {
                    error!(
                        command = %handler.command(),
                        error = %e.message,
                        params = %serde_json::Value::Object(params.as_map().clone()),
                        "Command failed"
                    );
                } else {
                    error!(command = %handler.command(), error = %e.message, "Command failed");
                }
                CommandEnvelope::error(e.message)
            }
        }
    }

    async fn run(
        &self,
        handler: &dyn CommandHandler,
        request: CommandRequest<'_>,
    ) -> AppResult<CommandEnvelope> {
        let call = AssertUnwindSafe(handler.handle(request)).catch_unwind();
        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                AppError::timeout(format!(
                    "Command '{}' timed out after {}s",
                    handler.command(),
                    limit.as_secs_f64()
                ))
            })?,
            None => call.await,
        };
        outcome.map_err(|panic| AppError::internal(panic_message(panic.as_ref())))?
    }

    /// The most recent envelope returned by a handler.
    pub async fn last_response(&self) -> Option<CommandEnvelope> {
        self.last_response.read().await.clone()
    }
}
