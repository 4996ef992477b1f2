//! Task poller
//!
//! Each tick queries the store for due IN_PROGRESS and PENDING tasks and
//! executes them one after another, IN_PROGRESS first. Ticks never overlap:
//! a tick requested while another is running is skipped.

use chrono::{DateTime, Utc};
use deskmate_core::domain::task::TaskStatus;
use deskmate_core::dto::task::{DueTasks, TickReport};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::service::executor::{ExecutionOutcome, TaskExecutor};
use crate::store::{StoreResult, TaskStore};

/// Polls the store for due tasks and executes them
pub struct TaskPoller {
    tasks: Arc<dyn TaskStore>,
    executor: TaskExecutor,
    interval: Duration,
    tick_lock: Mutex<()>,
}

impl TaskPoller {
    pub fn new(tasks: Arc<dyn TaskStore>, executor: TaskExecutor, interval: Duration) -> Self {
        Self {
            tasks,
            executor,
            interval,
            tick_lock: Mutex::new(()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tasks eligible at `now`, oldest first within each status
    pub async fn due_tasks(&self, now: DateTime<Utc>) -> StoreResult<DueTasks> {
        let in_progress = self.tasks.find_due(TaskStatus::InProgress, now).await?;
        let pending = self.tasks.find_due(TaskStatus::Pending, now).await?;

        Ok(DueTasks {
            in_progress,
            pending,
        })
    }

    /// Runs one tick against the current time
    pub async fn tick(&self) -> StoreResult<TickReport> {
        self.tick_at(Utc::now()).await
    }

    /// Runs one tick as of `now`.
    ///
    /// Fails only if the due queries fail; per-task errors are counted in the
    /// report.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> StoreResult<TickReport> {
        let Ok(_guard) = self.tick_lock.try_lock() else {
            warn!("Previous poll tick still running, skipping");
            return Ok(TickReport {
                overlapped: true,
                ..TickReport::default()
            });
        };

        let due = self.due_tasks(now).await?;
        let mut report = TickReport {
            in_progress_due: due.in_progress.len(),
            pending_due: due.pending.len(),
            ..TickReport::default()
        };

        if due.is_empty() {
            debug!("No due tasks");
            return Ok(report);
        }

        info!(
            "Found {} due task(s) ({} in progress, {} pending)",
            due.len(),
            report.in_progress_due,
            report.pending_due
        );

        for task in due.in_progress.iter().chain(due.pending.iter()) {
            match self.executor.execute(task, now).await {
                Ok(outcome) => record(&mut report, &outcome),
                Err(e) => {
                    error!(task_id = %task.id, "Error while executing task: {}", e);
                    report.errors += 1;
                }
            }
        }

        info!(
            "Tick finished: {} completed ({} degraded), {} failed, {} deferred, {} skipped, {} errors",
            report.completed,
            report.degraded,
            report.failed,
            report.deferred,
            report.skipped,
            report.errors
        );

        Ok(report)
    }

    /// Starts the polling loop in the background
    pub fn start(self: Arc<Self>) -> PollerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            info!("Starting task poller (interval: {:?})", self.interval);

            let mut interval = time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(e) = self.tick().await {
                            error!("Error during poll tick: {}", e);
                        }
                    }
                }
            }

            info!("Task poller stopped");
        });

        PollerHandle { cancel, handle }
    }
}

fn record(report: &mut TickReport, outcome: &ExecutionOutcome) {
    match outcome {
        ExecutionOutcome::Completed { warning } => {
            report.completed += 1;
            if warning.is_some() {
                report.degraded += 1;
            }
        }
        ExecutionOutcome::Failed { .. } => report.failed += 1,
        ExecutionOutcome::Deferred => report.deferred += 1,
        ExecutionOutcome::Skipped(_) => report.skipped += 1,
    }
}

/// Handle to a running poller
pub struct PollerHandle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PollerHandle {
    /// Stops the loop and waits for the current tick to finish
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!("Task poller panicked: {}", e);
        }
    }
}
