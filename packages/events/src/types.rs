// ABOUTME: Event payloads emitted after task execution or policy denial
// ABOUTME: Serialized as tagged JSON for external sinks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification of a task outcome.
///
/// Carries only correlation data; never the task output itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// A task ran to completion (successfully or not)
    TaskCompleted {
        task: String,
        requester: String,
        exit_code: i64,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    /// A task was denied before any environment existed
    PolicyViolation {
        task: String,
        requester: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl TaskEvent {
    pub fn completed(
        task: impl Into<String>,
        requester: impl Into<String>,
        exit_code: i64,
        duration_ms: u64,
    ) -> Self {
        TaskEvent::TaskCompleted {
            task: task.into(),
            requester: requester.into(),
            exit_code,
            duration_ms,
            timestamp: Utc::now(),
        }
    }

    pub fn violation(
        task: impl Into<String>,
        requester: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TaskEvent::PolicyViolation {
            task: task.into(),
            requester: requester.into(),
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }
}
