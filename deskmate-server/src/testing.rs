//! Test doubles shared by the service and scheduler tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deskmate_client::{ClientError, DeviceApi};
use deskmate_core::domain::desk::Desk;
use deskmate_core::domain::device::{
    DeviceConfig, DeviceFault, DeviceSnapshot, DeviceState, DeviceUsage,
};
use deskmate_core::domain::task::{ScheduledTask, TaskResolution, TaskStatus};
use deskmate_core::domain::telemetry::DeskTelemetry;
use deskmate_core::dto::device::SetPositionResponse;
use deskmate_core::height;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::store::{DeskStore, InMemoryStore, StoreError, StoreResult, TaskStore};

/// How the fake device answers position writes
#[derive(Debug, Clone)]
pub enum WriteMode {
    /// Accept and echo the requested position
    Echo,
    /// Accept but report a different position
    EchoAt(i32),
    Timeout,
    Unreachable,
    Reject(u16, String),
    Garbage,
}

#[derive(Debug)]
struct FakeState {
    mode: WriteMode,
    devices: BTreeMap<String, DeviceSnapshot>,
    broken_snapshots: HashSet<String>,
    listing_fails: bool,
    writes: Vec<(String, i32)>,
}

/// Scripted stand-in for the device service
#[derive(Debug)]
pub struct FakeDevice {
    state: Mutex<FakeState>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                mode: WriteMode::Echo,
                devices: BTreeMap::new(),
                broken_snapshots: HashSet::new(),
                listing_fails: false,
                writes: Vec::new(),
            }),
        }
    }

    pub fn with_mode(self, mode: WriteMode) -> Self {
        self.set_mode(mode);
        self
    }

    pub fn set_mode(&self, mode: WriteMode) {
        self.state.lock().unwrap().mode = mode;
    }

    pub fn add_device(&self, id: &str, position_mm: i32) {
        self.state
            .lock()
            .unwrap()
            .devices
            .insert(id.to_string(), snapshot(&format!("DESK {}", id), position_mm));
    }

    pub fn break_snapshot(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .broken_snapshots
            .insert(id.to_string());
    }

    pub fn fail_listing(&self) {
        self.state.lock().unwrap().listing_fails = true;
    }

    /// Every position write attempted, in order
    pub fn writes(&self) -> Vec<(String, i32)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes.len()
    }
}

fn unreachable(target: &str) -> ClientError {
    ClientError::Connectivity {
        target: target.to_string(),
        detail: "connection refused".to_string(),
    }
}

#[async_trait]
impl DeviceApi for FakeDevice {
    async fn list_device_ids(&self) -> deskmate_client::Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.listing_fails {
            return Err(unreachable("desk list"));
        }
        Ok(state.devices.keys().cloned().collect())
    }

    async fn get_device_snapshot(&self, desk_id: &str) -> deskmate_client::Result<DeviceSnapshot> {
        let state = self.state.lock().unwrap();
        let target = format!("desk {}", desk_id);
        if state.broken_snapshots.contains(desk_id) {
            return Err(unreachable(&target));
        }
        state
            .devices
            .get(desk_id)
            .cloned()
            .ok_or_else(|| ClientError::Connectivity {
                target,
                detail: "HTTP 404 Not Found".to_string(),
            })
    }

    async fn set_position(
        &self,
        desk_id: &str,
        position_mm: i32,
    ) -> deskmate_client::Result<SetPositionResponse> {
        if !height::mm_in_envelope(position_mm) {
            return Err(ClientError::OutOfRange {
                attempted_mm: position_mm,
                min_mm: height::MIN_MM,
                max_mm: height::MAX_MM,
            });
        }

        let mut state = self.state.lock().unwrap();
        state.writes.push((desk_id.to_string(), position_mm));
        let target = format!("desk {}", desk_id);

        let reported = match state.mode.clone() {
            WriteMode::Echo => position_mm,
            WriteMode::EchoAt(reported) => reported,
            WriteMode::Timeout => {
                return Err(ClientError::Timeout {
                    target,
                    timeout_ms: 10_000,
                });
            }
            WriteMode::Unreachable => return Err(unreachable(&target)),
            WriteMode::Reject(status, message) => {
                return Err(ClientError::Rejected {
                    target,
                    status,
                    message,
                });
            }
            WriteMode::Garbage => {
                return Err(ClientError::InvalidResponse(
                    "missing field `position_mm`".to_string(),
                ));
            }
        };

        if let Some(device) = state.devices.get_mut(desk_id) {
            device.state.position_mm = reported;
        }
        Ok(SetPositionResponse {
            position_mm: reported,
        })
    }
}

/// Desk store whose state writes can be switched off
pub struct FlakyDeskStore {
    inner: Arc<InMemoryStore>,
    writes_fail: AtomicBool,
}

impl FlakyDeskStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            writes_fail: AtomicBool::new(false),
        }
    }

    pub fn fail_writes(&self) {
        self.writes_fail.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.writes_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DeskStore for FlakyDeskStore {
    async fn get_desk(&self, id: &str) -> StoreResult<Option<Desk>> {
        self.inner.get_desk(id).await
    }

    async fn upsert_synced(
        &self,
        id: &str,
        name: &str,
        telemetry: &DeskTelemetry,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.check()?;
        self.inner.upsert_synced(id, name, telemetry, at).await
    }

    async fn write_state(
        &self,
        id: &str,
        telemetry: &DeskTelemetry,
        is_online: bool,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.check()?;
        self.inner.write_state(id, telemetry, is_online, at).await
    }

    async fn set_locked(&self, id: &str, locked: bool) -> StoreResult<bool> {
        self.inner.set_locked(id, locked).await
    }

    async fn set_locked_by_controller(
        &self,
        controller_id: &str,
        locked: bool,
    ) -> StoreResult<u64> {
        self.inner
            .set_locked_by_controller(controller_id, locked)
            .await
    }

    async fn ensure_owner(&self, user_id: Uuid, desk_id: &str) -> StoreResult<bool> {
        self.inner.ensure_owner(user_id, desk_id).await
    }
}

/// Task store whose due queries always fail
pub struct BrokenTaskStore;

#[async_trait]
impl TaskStore for BrokenTaskStore {
    async fn find_due(
        &self,
        _status: TaskStatus,
        _now: DateTime<Utc>,
    ) -> StoreResult<Vec<ScheduledTask>> {
        Err(StoreError::Unavailable("database is down".to_string()))
    }

    async fn get_task(&self, _id: Uuid) -> StoreResult<Option<ScheduledTask>> {
        Ok(None)
    }

    async fn mark_in_progress(&self, _id: Uuid) -> StoreResult<bool> {
        Ok(false)
    }

    async fn resolve(&self, _id: Uuid, _resolution: &TaskResolution) -> StoreResult<bool> {
        Ok(false)
    }
}

// ===== Fixtures =====

pub fn snapshot(name: &str, position_mm: i32) -> DeviceSnapshot {
    DeviceSnapshot {
        config: DeviceConfig {
            name: name.to_string(),
            manufacturer: "Linak A/S".to_string(),
        },
        state: DeviceState {
            position_mm,
            speed_mms: 0,
            status: "Normal".to_string(),
            is_position_lost: false,
            is_overload_protection_up: false,
            is_overload_protection_down: false,
            is_anti_collision: false,
        },
        usage: DeviceUsage {
            activations_counter: 12,
            sit_stand_counter: 4,
        },
        recent_errors: vec![DeviceFault {
            time_s: 120,
            error_code: 93,
        }],
    }
}

pub fn pending_task(desk_id: &str, new_height: i32, scheduled_at: DateTime<Utc>) -> ScheduledTask {
    ScheduledTask {
        id: Uuid::new_v4(),
        desk_id: desk_id.to_string(),
        user_id: Uuid::new_v4(),
        description: format!("Move {} to {}cm", desk_id, new_height),
        new_height,
        scheduled_at,
        completed_at: None,
        status: TaskStatus::Pending,
        error_message: None,
        warning_message: None,
    }
}

/// An online, unlocked desk sitting at 75cm
pub fn free_desk(id: &str) -> Desk {
    let mut desk = Desk::new(id, format!("Desk {}", id));
    desk.is_online = true;
    desk.last_data.position_mm = Some(750);
    desk.last_data.height = Some(75);
    desk
}

pub fn locked_desk(id: &str) -> Desk {
    let mut desk = free_desk(id);
    desk.is_locked = true;
    desk
}
