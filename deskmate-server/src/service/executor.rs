//! Task Executor
//!
//! Runs one execution attempt for one scheduled task:
//!
//! ```text
//! PENDING --(desk free)--> IN_PROGRESS --(actuation)--> COMPLETED | FAILED
//! ```
//!
//! A task whose desk is occupied is deferred without any write, so it stays
//! eligible on the next tick. A task observed as CANCELLED is never actuated.
//! The executor always re-reads the task before acting; the poller's view may
//! be stale by the time a task's turn comes.

use chrono::{DateTime, Utc};
use deskmate_core::domain::task::{ScheduledTask, TaskResolution, TaskStatus};
use deskmate_core::domain::telemetry::AdjustmentSource;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::service::actuation::{Actuation, DeskActuator};
use crate::store::{DeskStore, StoreError, TaskStore};

/// Executor error type
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Why a task was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotDue,
    Cancelled,
    AlreadyResolved,
    Missing,
    /// The task changed state between being read and being written
    LostRace,
}

/// Result of one execution attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// COMPLETED; `warning` is set for a degraded success
    Completed { warning: Option<String> },
    Failed { error: String },
    /// Desk occupied; nothing written
    Deferred,
    Skipped(SkipReason),
}

pub struct TaskExecutor {
    tasks: Arc<dyn TaskStore>,
    desks: Arc<dyn DeskStore>,
    actuator: DeskActuator,
}

impl TaskExecutor {
    pub fn new(tasks: Arc<dyn TaskStore>, desks: Arc<dyn DeskStore>, actuator: DeskActuator) -> Self {
        Self {
            tasks,
            desks,
            actuator,
        }
    }

    /// Runs one attempt for `task` as of `now`
    pub async fn execute(
        &self,
        task: &ScheduledTask,
        now: DateTime<Utc>,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        let Some(task) = self.tasks.get_task(task.id).await? else {
            warn!(task_id = %task.id, "Task vanished before execution");
            return Ok(ExecutionOutcome::Skipped(SkipReason::Missing));
        };

        match task.status {
            TaskStatus::Cancelled => {
                debug!(task_id = %task.id, "Task cancelled, skipping");
                return Ok(ExecutionOutcome::Skipped(SkipReason::Cancelled));
            }
            TaskStatus::Completed | TaskStatus::Failed => {
                debug!(task_id = %task.id, "Task already {}, skipping", task.status);
                return Ok(ExecutionOutcome::Skipped(SkipReason::AlreadyResolved));
            }
            TaskStatus::Pending | TaskStatus::InProgress => {}
        }

        if !task.is_due(now) {
            return Ok(ExecutionOutcome::Skipped(SkipReason::NotDue));
        }

        let Some(desk) = self.desks.get_desk(&task.desk_id).await? else {
            let error = format!("Desk {} not found", task.desk_id);
            return self.fail(&task, error, now).await;
        };

        if desk.is_locked {
            info!(
                task_id = %task.id,
                desk_id = %desk.id,
                "Desk is occupied, deferring task"
            );
            return Ok(ExecutionOutcome::Deferred);
        }

        if task.status == TaskStatus::Pending && !self.tasks.mark_in_progress(task.id).await? {
            debug!(task_id = %task.id, "Task left PENDING before it could be started");
            return Ok(ExecutionOutcome::Skipped(SkipReason::LostRace));
        }

        info!(
            task_id = %task.id,
            desk_id = %desk.id,
            "Moving desk to {}cm",
            task.new_height
        );

        let resolution = match self
            .actuator
            .apply(&desk, task.new_height, AdjustmentSource::Scheduler, now)
            .await
        {
            Ok(Actuation::Confirmed { warning, .. }) => TaskResolution::completed(now, warning),
            Ok(Actuation::Offline { warning, .. }) => TaskResolution::completed(now, Some(warning)),
            Err(e) => {
                error!(task_id = %task.id, desk_id = %desk.id, "Task failed: {}", e);
                TaskResolution::failed(now, e.to_string())
            }
        };

        self.finish(&task, resolution).await
    }

    /// Resolve a task as FAILED without touching the device
    async fn fail(
        &self,
        task: &ScheduledTask,
        error: String,
        now: DateTime<Utc>,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        error!(task_id = %task.id, "Task failed: {}", error);

        if task.status == TaskStatus::Pending && !self.tasks.mark_in_progress(task.id).await? {
            return Ok(ExecutionOutcome::Skipped(SkipReason::LostRace));
        }

        self.finish(task, TaskResolution::failed(now, error)).await
    }

    async fn finish(
        &self,
        task: &ScheduledTask,
        resolution: TaskResolution,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        if !self.tasks.resolve(task.id, &resolution).await? {
            warn!(task_id = %task.id, "Task changed state during execution, result discarded");
            return Ok(ExecutionOutcome::Skipped(SkipReason::LostRace));
        }

        let outcome = match resolution.status {
            TaskStatus::Failed => ExecutionOutcome::Failed {
                error: resolution.error_message.unwrap_or_default(),
            },
            _ => ExecutionOutcome::Completed {
                warning: resolution.warning_message,
            },
        };

        match &outcome {
            ExecutionOutcome::Completed {
                warning: Some(warning),
            } => warn!(task_id = %task.id, "Task completed with warning: {}", warning),
            ExecutionOutcome::Completed { warning: None } => {
                info!(task_id = %task.id, "Task completed")
            }
            _ => {}
        }

        Ok(outcome)
    }
}
