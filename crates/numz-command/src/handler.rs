//! The command handler contract.

use async_trait::async_trait;

use numz_core::Params;
use numz_core::result::AppResult;

use crate::envelope::CommandEnvelope;

/// Input to a command handler.
#[derive(Debug, Clone, Copy)]
pub struct CommandRequest<'a> {
    /// Command parameter bag.
    pub params: &'a Params,
    /// Administrator the command runs on behalf of.
    pub acting_user: Option<&'a str>,
}

/// Trait for command handler implementations.
///
/// A handler reports expected failures ("Client not found") as an error
/// envelope. Returning `Err` is reserved for unexpected failures; the
/// dispatcher converts those into error envelopes too.
#[async_trait]
pub trait CommandHandler: Send + Sync + std::fmt::Debug {
    /// Command name, e.g. `AddClient`.
    fn command(&self) -> &str;

    /// Executes the command once.
    async fn handle(&self, request: CommandRequest<'_>) -> AppResult<CommandEnvelope>;
}
