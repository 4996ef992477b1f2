//! Scheduled task domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request to move a desk to a target height at or after a given time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: Uuid,
    pub desk_id: String,
    pub user_id: Uuid,
    pub description: String,
    /// Target height in centimeters
    pub new_height: i32,
    /// Instant the task becomes eligible
    pub scheduled_at: DateTime<Utc>,
    /// Set exactly when the task reaches COMPLETED or FAILED
    pub completed_at: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub error_message: Option<String>,
    /// Recorded on a degraded success (device offline, delayed state write)
    pub warning_message: Option<String>,
}

impl ScheduledTask {
    /// Whether the task is eligible for execution at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at <= now
    }
}

/// Scheduled task status
///
/// Moves forward only: PENDING -> IN_PROGRESS -> {COMPLETED, FAILED}.
/// CANCELLED is set by an external actor from PENDING or IN_PROGRESS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Failed,
}

impl TaskStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
            TaskStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Failed
        )
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        match (self, next) {
            (TaskStatus::Pending, TaskStatus::InProgress) => true,
            (TaskStatus::Pending, TaskStatus::Cancelled) => true,
            (TaskStatus::InProgress, TaskStatus::Completed) => true,
            (TaskStatus::InProgress, TaskStatus::Failed) => true,
            (TaskStatus::InProgress, TaskStatus::Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TaskStatus::Pending),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            "FAILED" => Ok(TaskStatus::Failed),
            other => Err(format!("unknown task status: {}", other)),
        }
    }
}

/// Final write-back for a task that reached a terminal state
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResolution {
    pub status: TaskStatus,
    pub completed_at: DateTime<Utc>,
    pub error_message: Option<String>,
    pub warning_message: Option<String>,
}

impl TaskResolution {
    pub fn completed(at: DateTime<Utc>, warning: Option<String>) -> Self {
        Self {
            status: TaskStatus::Completed,
            completed_at: at,
            error_message: None,
            warning_message: warning,
        }
    }

    pub fn failed(at: DateTime<Utc>, error: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            completed_at: at,
            error_message: Some(error.into()),
            warning_message: None,
        }
    }
}
