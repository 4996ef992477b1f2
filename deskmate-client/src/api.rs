//! Device API seam
//!
//! The executor and sync service depend on this trait rather than on
//! [`DeviceClient`] directly so they can be driven by a scripted device in
//! tests.

use async_trait::async_trait;
use deskmate_core::domain::device::DeviceSnapshot;
use deskmate_core::dto::device::SetPositionResponse;

use crate::DeviceClient;
use crate::error::Result;

/// Operations the rest of the system needs from the device service
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// List the ids of every known device
    async fn list_device_ids(&self) -> Result<Vec<String>>;

    /// Fetch the full snapshot of one device
    async fn get_device_snapshot(&self, desk_id: &str) -> Result<DeviceSnapshot>;

    /// Drive a device to a position in millimeters
    async fn set_position(&self, desk_id: &str, position_mm: i32) -> Result<SetPositionResponse>;
}

#[async_trait]
impl DeviceApi for DeviceClient {
    async fn list_device_ids(&self) -> Result<Vec<String>> {
        DeviceClient::list_device_ids(self).await
    }

    async fn get_device_snapshot(&self, desk_id: &str) -> Result<DeviceSnapshot> {
        DeviceClient::get_device_snapshot(self, desk_id).await
    }

    async fn set_position(&self, desk_id: &str, position_mm: i32) -> Result<SetPositionResponse> {
        DeviceClient::set_position(self, desk_id, position_mm).await
    }
}
