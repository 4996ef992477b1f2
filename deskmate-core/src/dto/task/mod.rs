//! Scheduled task DTOs

use serde::{Deserialize, Serialize};

use crate::domain::task::ScheduledTask;

/// Tasks eligible at the time of the query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DueTasks {
    pub in_progress: Vec<ScheduledTask>,
    pub pending: Vec<ScheduledTask>,
}

impl DueTasks {
    pub fn is_empty(&self) -> bool {
        self.in_progress.is_empty() && self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.in_progress.len() + self.pending.len()
    }
}

/// Outcome counts for one poll tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub in_progress_due: usize,
    pub pending_due: usize,
    pub completed: usize,
    /// Completed while the device was unreachable or the state write lagged
    pub degraded: usize,
    pub failed: usize,
    /// Desk occupied, left for a later tick
    pub deferred: usize,
    /// Cancelled, no longer due, or lost a race
    pub skipped: usize,
    /// Store errors while processing a task
    pub errors: usize,
    /// Another tick was still running; nothing was done
    pub overlapped: bool,
}

impl TickReport {
    pub fn processed(&self) -> usize {
        self.completed + self.failed + self.deferred + self.skipped + self.errors
    }
}
