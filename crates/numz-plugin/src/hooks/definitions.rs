//! Hook point catalogue and listener outcomes.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use numz_core::traits::hook::HookHandler;

/// Well-known hook points that legacy modules register against.
///
/// Hook points are plain strings on the bus; this catalogue only names the
/// ones declared at startup. Any other name may be fired ad hoc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonHook {
    // ── Client ──
    /// A client account was created.
    ClientAdd,
    /// A client account was edited.
    ClientEdit,
    /// A client account was deleted.
    ClientDelete,
    /// A client logged in.
    ClientLogin,
    /// A client logged out.
    ClientLogout,
    /// A client changed their password.
    ClientChangePassword,

    // ── Order ──
    /// An order was paid.
    OrderPaid,
    /// An order was cancelled.
    OrderCancelled,
    /// An order was refunded.
    OrderRefunded,
    /// An order changed status.
    OrderStatusChange,

    // ── Invoice ──
    /// An invoice was created.
    InvoiceCreated,
    /// An invoice was paid.
    InvoicePaid,
    /// An invoice was cancelled.
    InvoiceCancelled,
    /// A payment reminder was sent for an invoice.
    InvoicePaymentReminder,

    // ── Service ──
    /// A service was edited.
    ServiceEdit,
    /// A service was deleted.
    ServiceDelete,
    /// A service's recurring billing completed.
    ServiceRecurringCompleted,

    // ── Ticket ──
    /// A ticket was opened.
    TicketOpen,
    /// A client replied to a ticket.
    TicketUserReply,
    /// Staff replied to a ticket.
    TicketAdminReply,
    /// A ticket was closed.
    TicketClose,

    // ── Domain ──
    /// A domain was registered.
    DomainRegister,
    /// A domain was transferred.
    DomainTransfer,
    /// A domain was renewed.
    DomainRenew,
    /// A domain was deleted.
    DomainDelete,

    // ── Module ──
    /// A provisioning module created an account.
    AfterModuleCreate,
    /// A provisioning module suspended an account.
    AfterModuleSuspend,
    /// A provisioning module unsuspended an account.
    AfterModuleUnsuspend,
    /// A provisioning module terminated an account.
    AfterModuleTerminate,
    /// A provisioning module changed an account password.
    AfterModuleChangePassword,
    /// A provisioning module changed an account package.
    AfterModuleChangePackage,

    // ── Cron ──
    /// Any cron run finished.
    AfterCronJob,
    /// The daily cron run.
    DailyCronJob,
}

impl CommonHook {
    /// The full catalogue, in declaration order.
    pub const ALL: [CommonHook; 33] = [
        Self::ClientAdd,
        Self::ClientEdit,
        Self::ClientDelete,
        Self::ClientLogin,
        Self::ClientLogout,
        Self::ClientChangePassword,
        Self::OrderPaid,
        Self::OrderCancelled,
        Self::OrderRefunded,
        Self::OrderStatusChange,
        Self::InvoiceCreated,
        Self::InvoicePaid,
        Self::InvoiceCancelled,
        Self::InvoicePaymentReminder,
        Self::ServiceEdit,
        Self::ServiceDelete,
        Self::ServiceRecurringCompleted,
        Self::TicketOpen,
        Self::TicketUserReply,
        Self::TicketAdminReply,
        Self::TicketClose,
        Self::DomainRegister,
        Self::DomainTransfer,
        Self::DomainRenew,
        Self::DomainDelete,
        Self::AfterModuleCreate,
        Self::AfterModuleSuspend,
        Self::AfterModuleUnsuspend,
        Self::AfterModuleTerminate,
        Self::AfterModuleChangePassword,
        Self::AfterModuleChangePackage,
        Self::AfterCronJob,
        Self::DailyCronJob,
    ];

    /// The hook point name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientAdd => "ClientAdd",
            Self::ClientEdit => "ClientEdit",
            Self::ClientDelete => "ClientDelete",
            Self::ClientLogin => "ClientLogin",
            Self::ClientLogout => "ClientLogout",
            Self::ClientChangePassword => "ClientChangePassword",
            Self::OrderPaid => "OrderPaid",
            Self::OrderCancelled => "OrderCancelled",
            Self::OrderRefunded => "OrderRefunded",
            Self::OrderStatusChange => "OrderStatusChange",
            Self::InvoiceCreated => "InvoiceCreated",
            Self::InvoicePaid => "InvoicePaid",
            Self::InvoiceCancelled => "InvoiceCancelled",
            Self::InvoicePaymentReminder => "InvoicePaymentReminder",
            Self::ServiceEdit => "ServiceEdit",
            Self::ServiceDelete => "ServiceDelete",
            Self::ServiceRecurringCompleted => "ServiceRecurringCompleted",
            Self::TicketOpen => "TicketOpen",
            Self::TicketUserReply => "TicketUserReply",
            Self::TicketAdminReply => "TicketAdminReply",
            Self::TicketClose => "TicketClose",
            Self::DomainRegister => "DomainRegister",
            Self::DomainTransfer => "DomainTransfer",
            Self::DomainRenew => "DomainRenew",
            Self::DomainDelete => "DomainDelete",
            Self::AfterModuleCreate => "AfterModuleCreate",
            Self::AfterModuleSuspend => "AfterModuleSuspend",
            Self::AfterModuleUnsuspend => "AfterModuleUnsuspend",
            Self::AfterModuleTerminate => "AfterModuleTerminate",
            Self::AfterModuleChangePassword => "AfterModuleChangePassword",
            Self::AfterModuleChangePackage => "AfterModuleChangePackage",
            Self::AfterCronJob => "AfterCronJob",
            Self::DailyCronJob => "DailyCronJob",
        }
    }

    /// Lifecycle group the hook belongs to.
    pub fn group(&self) -> &'static str {
        match self {
            Self::ClientAdd
            | Self::ClientEdit
            | Self::ClientDelete
            | Self::ClientLogin
            | Self::ClientLogout
            | Self::ClientChangePassword => "client",
            Self::OrderPaid
            | Self::OrderCancelled
            | Self::OrderRefunded
            | Self::OrderStatusChange => "order",
            Self::InvoiceCreated
            | Self::InvoicePaid
            | Self::InvoiceCancelled
            | Self::InvoicePaymentReminder => "invoice",
            Self::ServiceEdit | Self::ServiceDelete | Self::ServiceRecurringCompleted => "service",
            Self::TicketOpen | Self::TicketUserReply | Self::TicketAdminReply | Self::TicketClose => {
                "ticket"
            }
            Self::DomainRegister | Self::DomainTransfer | Self::DomainRenew | Self::DomainDelete => {
                "domain"
            }
            Self::AfterModuleCreate
            | Self::AfterModuleSuspend
            | Self::AfterModuleUnsuspend
            | Self::AfterModuleTerminate
            | Self::AfterModuleChangePassword
            | Self::AfterModuleChangePackage => "module",
            Self::AfterCronJob | Self::DailyCronJob => "cron",
        }
    }

    /// Looks up a catalogue entry by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }
}

impl fmt::Display for CommonHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listener bound to a hook point, as contributed by a plugin or module.
#[derive(Clone)]
pub struct HookBinding {
    /// Hook point name.
    pub point: String,
    /// Execution priority (lower runs first).
    pub priority: i32,
    /// Listener.
    pub handler: Arc<dyn HookHandler>,
}

impl HookBinding {
    /// Creates a binding.
    pub fn new(point: impl Into<String>, priority: i32, handler: Arc<dyn HookHandler>) -> Self {
        Self {
            point: point.into(),
            priority,
            handler,
        }
    }
}

impl fmt::Debug for HookBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookBinding")
            .field("point", &self.point)
            .field("priority", &self.priority)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// What one listener produced during a firing.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    /// The listener returned a value.
    Completed(Value),
    /// The listener failed, panicked or timed out.
    Failed {
        /// Failure message.
        error: String,
    },
}

impl HookOutcome {
    /// Creates a failed outcome.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// Whether the listener failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Legacy result shape: the listener's value, or `{"error": message}`.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Completed(value) => value.clone(),
            Self::Failed { error } => json!({ "error": error }),
        }
    }
}

impl Serialize for HookOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_names_are_unique_and_resolvable() {
        let mut names: Vec<&str> = CommonHook::ALL.iter().map(|h| h.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CommonHook::ALL.len());
        assert_eq!(CommonHook::from_name("InvoicePaid"), Some(CommonHook::InvoicePaid));
        assert_eq!(CommonHook::from_name("ServiceCreated"), None);
    }

    #[test]
    fn test_failed_outcome_serializes_as_error_object() {
        let outcome = HookOutcome::failed("listener exploded");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({ "error": "listener exploded" })
        );
        assert_eq!(
            serde_json::to_value(HookOutcome::Completed(json!(true))).unwrap(),
            json!(true)
        );
    }
}
