//! In-memory store
//!
//! Keeps desks, tasks and ownership in maps behind async locks. Used when
//! running against the device simulator without a database, and by tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deskmate_core::domain::desk::Desk;
use deskmate_core::domain::task::{ScheduledTask, TaskResolution, TaskStatus};
use deskmate_core::domain::telemetry::DeskTelemetry;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DeskStore, StoreResult, TaskStore};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    desks: RwLock<HashMap<String, Desk>>,
    tasks: RwLock<HashMap<Uuid, ScheduledTask>>,
    owners: RwLock<BTreeSet<(Uuid, String)>>,
}

#[allow(dead_code)]
impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a desk
    pub async fn insert_desk(&self, desk: Desk) {
        self.desks.write().await.insert(desk.id.clone(), desk);
    }

    /// Inserts or replaces a task
    pub async fn insert_task(&self, task: ScheduledTask) {
        self.tasks.write().await.insert(task.id, task);
    }

    pub async fn task(&self, id: Uuid) -> Option<ScheduledTask> {
        self.tasks.read().await.get(&id).cloned()
    }

    pub async fn desk(&self, id: &str) -> Option<Desk> {
        self.desks.read().await.get(id).cloned()
    }

    pub async fn desk_count(&self) -> usize {
        self.desks.read().await.len()
    }

    /// Cancels a PENDING or IN_PROGRESS task, as an external actor would
    pub async fn cancel_task(&self, id: Uuid) -> bool {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&id) {
            Some(task) if task.status.can_transition_to(TaskStatus::Cancelled) => {
                task.status = TaskStatus::Cancelled;
                true
            }
            _ => false,
        }
    }

    /// Users associated with a desk
    pub async fn owners_of(&self, desk_id: &str) -> Vec<Uuid> {
        self.owners
            .read()
            .await
            .iter()
            .filter(|(_, desk)| desk == desk_id)
            .map(|(user, _)| *user)
            .collect()
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn find_due(
        &self,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ScheduledTask>> {
        let mut due: Vec<ScheduledTask> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|task| task.status == status && task.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|task| task.scheduled_at);
        Ok(due)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<ScheduledTask>> {
        Ok(self.task(id).await)
    }

    async fn mark_in_progress(&self, id: Uuid) -> StoreResult<bool> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&id) {
            Some(task) if task.status == TaskStatus::Pending => {
                task.status = TaskStatus::InProgress;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn resolve(&self, id: Uuid, resolution: &TaskResolution) -> StoreResult<bool> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&id) {
            Some(task) if task.status == TaskStatus::InProgress => {
                task.status = resolution.status;
                task.completed_at = Some(resolution.completed_at);
                task.error_message = resolution.error_message.clone();
                task.warning_message = resolution.warning_message.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl DeskStore for InMemoryStore {
    async fn get_desk(&self, id: &str) -> StoreResult<Option<Desk>> {
        Ok(self.desk(id).await)
    }

    async fn upsert_synced(
        &self,
        id: &str,
        name: &str,
        telemetry: &DeskTelemetry,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut desks = self.desks.write().await;
        let desk = desks
            .entry(id.to_string())
            .or_insert_with(|| Desk::new(id, name));
        desk.is_online = true;
        desk.last_data = telemetry.clone();
        desk.last_data_at = Some(at);
        Ok(())
    }

    async fn write_state(
        &self,
        id: &str,
        telemetry: &DeskTelemetry,
        is_online: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut desks = self.desks.write().await;
        match desks.get_mut(id) {
            Some(desk) => {
                desk.is_online = is_online;
                desk.last_data = telemetry.clone();
                desk.last_data_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_locked(&self, id: &str, locked: bool) -> StoreResult<bool> {
        let mut desks = self.desks.write().await;
        match desks.get_mut(id) {
            Some(desk) => {
                desk.is_locked = locked;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_locked_by_controller(
        &self,
        controller_id: &str,
        locked: bool,
    ) -> StoreResult<u64> {
        let mut desks = self.desks.write().await;
        let mut updated = 0;
        for desk in desks.values_mut() {
            if desk.controller_id.as_deref() == Some(controller_id) {
                desk.is_locked = locked;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn ensure_owner(&self, user_id: Uuid, desk_id: &str) -> StoreResult<bool> {
        Ok(self
            .owners
            .write()
            .await
            .insert((user_id, desk_id.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::pending_task;
    use chrono::Duration;

    #[tokio::test]
    async fn test_find_due_filters_status_and_time() {
        let store = InMemoryStore::new();
        let now = Utc::now();

        let due = pending_task("desk-1", 100, now - Duration::minutes(5));
        let later = pending_task("desk-1", 100, now + Duration::minutes(5));
        let mut running = pending_task("desk-1", 100, now - Duration::minutes(1));
        running.status = TaskStatus::InProgress;

        store.insert_task(due.clone()).await;
        store.insert_task(later).await;
        store.insert_task(running.clone()).await;

        let pending = store.find_due(TaskStatus::Pending, now).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, due.id);

        let in_progress = store.find_due(TaskStatus::InProgress, now).await.unwrap();
        assert_eq!(in_progress.len(), 1);
        assert_eq!(in_progress[0].id, running.id);
    }

    #[tokio::test]
    async fn test_find_due_orders_oldest_first() {
        let store = InMemoryStore::new();
        let now = Utc::now();

        let newer = pending_task("desk-1", 100, now - Duration::minutes(1));
        let older = pending_task("desk-1", 100, now - Duration::minutes(9));
        store.insert_task(newer.clone()).await;
        store.insert_task(older.clone()).await;

        let due = store.find_due(TaskStatus::Pending, now).await.unwrap();
        let ids: Vec<Uuid> = due.iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[tokio::test]
    async fn test_conditional_transitions() {
        let store = InMemoryStore::new();
        let task = pending_task("desk-1", 100, Utc::now());
        store.insert_task(task.clone()).await;

        let resolution = TaskResolution::completed(Utc::now(), None);
        assert!(!store.resolve(task.id, &resolution).await.unwrap());

        assert!(store.mark_in_progress(task.id).await.unwrap());
        assert!(!store.mark_in_progress(task.id).await.unwrap());

        assert!(store.resolve(task.id, &resolution).await.unwrap());
        assert!(!store.resolve(task.id, &resolution).await.unwrap());

        let stored = store.task(task.id).await.unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
        assert_eq!(stored.completed_at, Some(resolution.completed_at));
    }

    #[tokio::test]
    async fn test_cancelled_task_cannot_start() {
        let store = InMemoryStore::new();
        let task = pending_task("desk-1", 100, Utc::now());
        store.insert_task(task.clone()).await;

        assert!(store.cancel_task(task.id).await);
        assert!(!store.mark_in_progress(task.id).await.unwrap());
        assert!(!store.cancel_task(task.id).await);
    }

    #[tokio::test]
    async fn test_upsert_creates_then_overwrites() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        let mut telemetry = DeskTelemetry::default();
        telemetry.height = Some(80);

        store.upsert_synced("desk-1", "First", &telemetry, now).await.unwrap();
        store.set_locked("desk-1", true).await.unwrap();

        telemetry.height = Some(90);
        store.upsert_synced("desk-1", "Renamed", &telemetry, now).await.unwrap();

        let desk = store.desk("desk-1").await.unwrap();
        assert_eq!(store.desk_count().await, 1);
        assert_eq!(desk.name, "First");
        assert!(desk.is_online);
        assert!(desk.is_locked);
        assert_eq!(desk.last_data.height, Some(90));
    }

    #[tokio::test]
    async fn test_lock_by_controller() {
        let store = InMemoryStore::new();
        store
            .insert_desk(Desk::new("a", "A").with_controller("pico-1"))
            .await;
        store
            .insert_desk(Desk::new("b", "B").with_controller("pico-1"))
            .await;
        store
            .insert_desk(Desk::new("c", "C").with_controller("pico-2"))
            .await;

        let updated = store.set_locked_by_controller("pico-1", true).await.unwrap();
        assert_eq!(updated, 2);
        assert!(store.desk("a").await.unwrap().is_locked);
        assert!(store.desk("b").await.unwrap().is_locked);
        assert!(!store.desk("c").await.unwrap().is_locked);
    }

    #[tokio::test]
    async fn test_ensure_owner_is_idempotent() {
        let store = InMemoryStore::new();
        let user = Uuid::new_v4();

        assert!(store.ensure_owner(user, "desk-1").await.unwrap());
        assert!(!store.ensure_owner(user, "desk-1").await.unwrap());
        assert_eq!(store.owners_of("desk-1").await, vec![user]);
    }
}
