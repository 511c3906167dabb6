//! Core types for the task tracker.

use serde::{Deserialize, Serialize};

/// Task identifier. Always positive once assigned by a store.
pub type TaskId = i64;

/// A single to-do record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "taskId")]
    pub id: TaskId,
    pub text: String,
    /// Creation time in seconds since the Unix epoch. Never changes after insert.
    pub timestamp: i64,
    pub done: bool,
}

impl Task {
    /// A freshly created task: not done, stamped with `timestamp`.
    pub fn new(id: TaskId, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id,
            text: text.into(),
            timestamp,
            done: false,
        }
    }
}

/// Current time in whole seconds since the Unix epoch.
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
