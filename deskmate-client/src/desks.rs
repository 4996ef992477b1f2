//! Desk endpoints of the device service

use deskmate_core::domain::device::DeviceSnapshot;
use deskmate_core::dto::device::{SetPositionRequest, SetPositionResponse};
use deskmate_core::height;
use tracing::debug;

use crate::DeviceClient;
use crate::error::{ClientError, Result};

impl DeviceClient {
    /// List the ids of every device the service knows about
    pub async fn list_device_ids(&self) -> Result<Vec<String>> {
        let target = "desk list";
        let url = self.desks_url();
        let response = self.send(target, || self.client.get(&url)).await?;

        self.handle_read(target, response).await
    }

    /// Fetch config, state, usage and recent errors for one device
    pub async fn get_device_snapshot(&self, desk_id: &str) -> Result<DeviceSnapshot> {
        let target = format!("desk {}", desk_id);
        let url = format!("{}/{}", self.desks_url(), desk_id);
        let response = self.send(&target, || self.client.get(&url)).await?;

        self.handle_read(&target, response).await
    }

    /// Drive a device to `position_mm`
    ///
    /// The position is checked against the global envelope first; an
    /// out-of-range value fails with [`ClientError::OutOfRange`] and no
    /// request is made.
    pub async fn set_position(
        &self,
        desk_id: &str,
        position_mm: i32,
    ) -> Result<SetPositionResponse> {
        validate_position(position_mm)?;

        let target = format!("desk {}", desk_id);
        let url = format!("{}/{}/state", self.desks_url(), desk_id);
        let body = SetPositionRequest { position_mm };

        debug!("Setting {} to {}mm", target, position_mm);

        let response = self
            .send(&target, || self.client.put(&url).json(&body))
            .await?;

        self.handle_write(&target, response).await
    }
}

/// Rejects positions outside the global envelope
pub(crate) fn validate_position(position_mm: i32) -> Result<()> {
    if !height::mm_in_envelope(position_mm) {
        return Err(ClientError::OutOfRange {
            attempted_mm: position_mm,
            min_mm: height::MIN_MM,
            max_mm: height::MAX_MM,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_position_bounds() {
        assert!(validate_position(680).is_ok());
        assert!(validate_position(1000).is_ok());
        assert!(validate_position(1320).is_ok());

        for position in [i32::MIN, -1, 0, 679, 1321, i32::MAX] {
            match validate_position(position) {
                Err(ClientError::OutOfRange {
                    attempted_mm,
                    min_mm,
                    max_mm,
                }) => {
                    assert_eq!(attempted_mm, position);
                    assert_eq!(min_mm, 680);
                    assert_eq!(max_mm, 1320);
                }
                other => panic!("expected OutOfRange for {}, got {:?}", position, other),
            }
        }
    }
}
