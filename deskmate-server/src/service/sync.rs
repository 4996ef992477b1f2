//! Desk Sync Service
//!
//! Mirrors the device service into the desk store. Every synced desk is
//! linked to the administrator account; the first desk synced in a run is
//! also linked to the default regular user.

use chrono::Utc;
use deskmate_client::{ClientError, DeviceApi};
use deskmate_core::domain::telemetry::DeskTelemetry;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::store::{DeskStore, StoreError};

/// Default administrator account, linked to every desk
pub const ADMIN_USER_ID: Uuid = Uuid::from_u128(0xd93419b8_7f82_4a1f_943d_6ad9bde6d993);

/// Default regular user, linked to the first desk of a sync run
pub const REGULAR_USER_ID: Uuid = Uuid::from_u128(0xd812baf1_1d50_4c83_ad2e_d65dd1d0dce2);

/// Sync error type
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Device error: {0}")]
    Device(#[from] ClientError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub struct DeskSyncService {
    device: Arc<dyn DeviceApi>,
    desks: Arc<dyn DeskStore>,
}

impl DeskSyncService {
    pub fn new(device: Arc<dyn DeviceApi>, desks: Arc<dyn DeskStore>) -> Self {
        Self { device, desks }
    }

    /// Sync every desk the device service knows about.
    ///
    /// Returns how many desks were synced. Only a failure to list devices
    /// fails the whole run.
    pub async fn sync_all(&self) -> Result<usize, SyncError> {
        let ids = self.device.list_device_ids().await?;
        info!("Syncing {} desk(s) from device service", ids.len());

        let mut synced = 0;
        for id in &ids {
            match self.sync_and_seed(id, synced == 0).await {
                Ok(()) => synced += 1,
                Err(e) => error!(desk_id = %id, "Failed to sync desk: {}", e),
            }
        }

        info!("Synced {}/{} desk(s)", synced, ids.len());
        Ok(synced)
    }

    /// Refresh a single desk, creating it if needed
    pub async fn sync_desk(&self, id: &str) -> Result<(), SyncError> {
        self.refresh(id).await?;
        info!(desk_id = %id, "Desk synced");
        Ok(())
    }

    async fn sync_and_seed(&self, id: &str, first: bool) -> Result<(), SyncError> {
        self.refresh(id).await?;

        self.desks.ensure_owner(ADMIN_USER_ID, id).await?;
        if first {
            self.desks.ensure_owner(REGULAR_USER_ID, id).await?;
        }
        Ok(())
    }

    async fn refresh(&self, id: &str) -> Result<(), SyncError> {
        let snapshot = self.device.get_device_snapshot(id).await?;

        if !snapshot.state.position_in_envelope() {
            warn!(
                desk_id = %id,
                "Device reports position {}mm outside the envelope, not recording it",
                snapshot.state.position_mm
            );
        }

        let telemetry = DeskTelemetry::from_snapshot(&snapshot);
        let name = if snapshot.config.name.is_empty() {
            id
        } else {
            snapshot.config.name.as_str()
        };

        self.desks
            .upsert_synced(id, name, &telemetry, Utc::now())
            .await?;

        debug!(desk_id = %id, "Stored snapshot for {}", name);
        Ok(())
    }
}
