//! Bounded execution history of hook listener invocations.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use numz_core::Params;

/// One listener invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    /// Hook point fired.
    pub hook_point: String,
    /// Priority of the listener.
    pub priority: i32,
    /// Listener identity.
    pub handler: String,
    /// Parameters the firing received.
    pub params: Params,
    /// Listener result, or `{"error": ...}`.
    pub result: Value,
    /// Whether the listener failed.
    pub failed: bool,
    /// Invocation time.
    pub executed_at: DateTime<Utc>,
}

/// Ring buffer of the most recent execution records.
///
/// A capacity of zero disables recording.
#[derive(Debug)]
pub struct ExecutionHistory {
    capacity: usize,
    records: Mutex<VecDeque<ExecutionRecord>>,
}

impl ExecutionHistory {
    /// Creates a history holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    /// Appends a record, evicting the oldest when full.
    pub async fn record(&self, record: ExecutionRecord) {
        if self.capacity == 0 {
            return;
        }
        let mut records = self.records.lock().await;
        while records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Records oldest first, optionally for a single hook point.
    pub async fn entries(&self, point: Option<&str>) -> Vec<ExecutionRecord> {
        let records = self.records.lock().await;
        records
            .iter()
            .filter(|r| point.is_none_or(|p| r.hook_point == p))
            .cloned()
            .collect()
    }

    /// Drops every record.
    pub async fn clear(&self) {
        self.records.lock().await.clear();
    }

    /// Number of retained records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether no records are retained.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}
