//! Hook registry: listeners per hook point, ordered by priority then
//! registration order.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use numz_core::traits::hook::HookHandler;

use super::definitions::CommonHook;

/// One listener registration.
pub struct HookRegistration {
    /// Hook point name.
    pub point: String,
    /// Execution priority (lower runs first).
    pub priority: i32,
    /// Listener.
    pub handler: Arc<dyn HookHandler>,
    /// Plugin or module that registered the listener, if any.
    pub owner: Option<String>,
    /// Registration time.
    pub registered_at: DateTime<Utc>,
}

impl std::fmt::Debug for HookRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistration")
            .field("point", &self.point)
            .field("priority", &self.priority)
            .field("handler", &self.handler.name())
            .field("owner", &self.owner)
            .field("registered_at", &self.registered_at)
            .finish()
    }
}

/// Serializable view of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    /// Hook point name.
    pub point: String,
    /// Execution priority.
    pub priority: i32,
    /// Listener identity.
    pub handler: String,
    /// Registering plugin or module.
    pub owner: Option<String>,
    /// Registration time.
    pub registered_at: DateTime<Utc>,
}

impl From<&HookRegistration> for RegistrationSummary {
    fn from(reg: &HookRegistration) -> Self {
        Self {
            point: reg.point.clone(),
            priority: reg.priority,
            handler: reg.handler.name().to_string(),
            owner: reg.owner.clone(),
            registered_at: reg.registered_at,
        }
    }
}

type PriorityTable = BTreeMap<i32, Vec<Arc<HookRegistration>>>;

/// Registry of hook listeners keyed by hook point.
///
/// A point present with no listeners is "declared": it shows up in
/// [`HookRegistry::hook_points`] but [`HookRegistry::has_hook`] is false.
#[derive(Debug, Default)]
pub struct HookRegistry {
    points: RwLock<HashMap<String, PriorityTable>>,
}

impl HookRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a hook point with no listeners. Existing listeners are kept.
    pub async fn declare(&self, point: &str) {
        let mut points = self.points.write().await;
        points.entry(point.to_string()).or_default();
    }

    /// Declares every catalogue hook point.
    pub async fn declare_catalog(&self) {
        let mut points = self.points.write().await;
        for hook in CommonHook::ALL {
            points.entry(hook.as_str().to_string()).or_default();
        }
        debug!(count = CommonHook::ALL.len(), "Hook catalogue declared");
    }

    /// Appends a listener. Registering the same handler twice runs it twice.
    pub async fn register(
        &self,
        point: &str,
        priority: i32,
        handler: Arc<dyn HookHandler>,
        owner: Option<&str>,
    ) {
        let registration = Arc::new(HookRegistration {
            point: point.to_string(),
            priority,
            handler,
            owner: owner.map(str::to_string),
            registered_at: Utc::now(),
        });

        info!(
            hook = %point,
            handler = %registration.handler.name(),
            priority,
            owner = registration.owner.as_deref(),
            "Hook handler registered"
        );

        let mut points = self.points.write().await;
        points
            .entry(point.to_string())
            .or_default()
            .entry(priority)
            .or_default()
            .push(registration);
    }

    /// Listeners for a point in execution order, detached from the registry.
    pub async fn snapshot(&self, point: &str) -> Vec<Arc<HookRegistration>> {
        let points = self.points.read().await;
        points
            .get(point)
            .map(|table| table.values().flatten().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether at least one listener is registered for `point`.
    pub async fn has_hook(&self, point: &str) -> bool {
        self.count_hooks(point).await > 0
    }

    /// Number of listeners registered for `point`.
    pub async fn count_hooks(&self, point: &str) -> usize {
        let points = self.points.read().await;
        points
            .get(point)
            .map(|table| table.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Registration summaries for `point` in execution order.
    pub async fn get_hooks(&self, point: &str) -> Vec<RegistrationSummary> {
        self.snapshot(point)
            .await
            .iter()
            .map(|reg| RegistrationSummary::from(reg.as_ref()))
            .collect()
    }

    /// Every declared or registered hook point, sorted.
    pub async fn hook_points(&self) -> Vec<String> {
        let points = self.points.read().await;
        let mut names: Vec<String> = points.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether `point` is declared or has listeners.
    pub async fn is_declared(&self, point: &str) -> bool {
        self.points.read().await.contains_key(point)
    }

    /// Removes the listeners at one priority, or the whole point when
    /// `priority` is `None`. Returns the number of listeners removed.
    pub async fn remove_hook(&self, point: &str, priority: Option<i32>) -> usize {
        let mut points = self.points.write().await;
        let removed = match priority {
            Some(priority) => points
                .get_mut(point)
                .and_then(|table| table.remove(&priority))
                .map(|regs| regs.len())
                .unwrap_or(0),
            None => points
                .remove(point)
                .map(|table| table.values().map(Vec::len).sum())
                .unwrap_or(0),
        };

        info!(hook = %point, priority, removed, "Hook handlers removed");
        removed
    }

    /// Removes every listener registered by `owner`.
    pub async fn unregister_owner(&self, owner: &str) -> usize {
        let mut points = self.points.write().await;
        let mut removed = 0;
        for table in points.values_mut() {
            for regs in table.values_mut() {
                let before = regs.len();
                regs.retain(|reg| reg.owner.as_deref() != Some(owner));
                removed += before - regs.len();
            }
            table.retain(|_, regs| !regs.is_empty());
        }

        info!(owner = %owner, removed, "Hook handlers unregistered for owner");
        removed
    }
}
