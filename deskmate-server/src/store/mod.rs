//! Store contract
//!
//! The executor, poller and sync service only ever see desks and tasks
//! through these two traits. Persistence proper (schema, queries) lives
//! behind them: [`PgStore`] for PostgreSQL, [`InMemoryStore`] for local
//! development and tests.
//!
//! The conditional task updates are the only guard against concurrent
//! writers: `mark_in_progress` applies only to a PENDING task and `resolve`
//! only to an IN_PROGRESS one, so an external cancel is never overwritten.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deskmate_core::domain::desk::Desk;
use deskmate_core::domain::task::{ScheduledTask, TaskResolution, TaskStatus};
use deskmate_core::domain::telemetry::DeskTelemetry;
use thiserror::Error;
use uuid::Uuid;

/// Store error type
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Scheduled task persistence as seen by the scheduler
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Tasks in `status` whose `scheduled_at <= now`, oldest first
    async fn find_due(
        &self,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ScheduledTask>>;

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<ScheduledTask>>;

    /// PENDING -> IN_PROGRESS. Returns false if the task was no longer PENDING.
    async fn mark_in_progress(&self, id: Uuid) -> StoreResult<bool>;

    /// IN_PROGRESS -> COMPLETED/FAILED. Returns false if the task was no
    /// longer IN_PROGRESS.
    async fn resolve(&self, id: Uuid, resolution: &TaskResolution) -> StoreResult<bool>;
}

/// Desk persistence as seen by the scheduler and the sync service
#[async_trait]
pub trait DeskStore: Send + Sync {
    async fn get_desk(&self, id: &str) -> StoreResult<Option<Desk>>;

    /// Creates the desk if absent, otherwise overwrites its state.
    ///
    /// Marks the desk online and stamps `last_data_at`. `name` is only used
    /// on creation.
    async fn upsert_synced(
        &self,
        id: &str,
        name: &str,
        telemetry: &DeskTelemetry,
        at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Replaces `last_data` and reachability of an existing desk.
    /// Returns false if the desk does not exist.
    async fn write_state(
        &self,
        id: &str,
        telemetry: &DeskTelemetry,
        is_online: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Returns false if the desk does not exist
    async fn set_locked(&self, id: &str, locked: bool) -> StoreResult<bool>;

    /// Sets the lock flag on every desk wired to a controller
    async fn set_locked_by_controller(&self, controller_id: &str, locked: bool)
    -> StoreResult<u64>;

    /// Associates a user with a desk. Returns true if the association is new.
    async fn ensure_owner(&self, user_id: Uuid, desk_id: &str) -> StoreResult<bool>;
}
