//! PostgreSQL store
//!
//! Thin adapter from the store traits onto the sqlx repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deskmate_core::domain::desk::Desk;
use deskmate_core::domain::task::{ScheduledTask, TaskResolution, TaskStatus};
use deskmate_core::domain::telemetry::DeskTelemetry;
use sqlx::PgPool;
use uuid::Uuid;

use super::{DeskStore, StoreResult, TaskStore};
use crate::repository::{desk_repository, task_repository, user_desk_repository};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn find_due(
        &self,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ScheduledTask>> {
        Ok(task_repository::find_due(&self.pool, status, now).await?)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<ScheduledTask>> {
        Ok(task_repository::find_by_id(&self.pool, id).await?)
    }

    async fn mark_in_progress(&self, id: Uuid) -> StoreResult<bool> {
        Ok(task_repository::mark_in_progress(&self.pool, id).await?)
    }

    async fn resolve(&self, id: Uuid, resolution: &TaskResolution) -> StoreResult<bool> {
        Ok(task_repository::resolve(&self.pool, id, resolution).await?)
    }
}

#[async_trait]
impl DeskStore for PgStore {
    async fn get_desk(&self, id: &str) -> StoreResult<Option<Desk>> {
        Ok(desk_repository::find_by_id(&self.pool, id).await?)
    }

    async fn upsert_synced(
        &self,
        id: &str,
        name: &str,
        telemetry: &DeskTelemetry,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        Ok(desk_repository::upsert_synced(&self.pool, id, name, telemetry, at).await?)
    }

    async fn write_state(
        &self,
        id: &str,
        telemetry: &DeskTelemetry,
        is_online: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        Ok(desk_repository::write_state(&self.pool, id, telemetry, is_online, at).await?)
    }

    async fn set_locked(&self, id: &str, locked: bool) -> StoreResult<bool> {
        Ok(desk_repository::set_locked(&self.pool, id, locked).await?)
    }

    async fn set_locked_by_controller(
        &self,
        controller_id: &str,
        locked: bool,
    ) -> StoreResult<u64> {
        Ok(desk_repository::set_locked_by_controller(&self.pool, controller_id, locked).await?)
    }

    async fn ensure_owner(&self, user_id: Uuid, desk_id: &str) -> StoreResult<bool> {
        Ok(user_desk_repository::ensure(&self.pool, user_id, desk_id).await?)
    }
}
