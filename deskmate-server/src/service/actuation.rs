//! Desk Actuation
//!
//! Drives one desk to a height and writes the result back into the desk's
//! telemetry. Shared by the scheduler and the interactive height endpoint
//! so both follow the same degraded-success rules:
//!
//! - device confirmed: telemetry overlaid with the echoed position, desk online
//! - device timed out or unreachable: intended position recorded locally,
//!   tagged as applied while offline, desk marked offline
//! - anything else: returned to the caller untouched

use chrono::{DateTime, Utc};
use deskmate_client::{ClientError, DeviceApi};
use deskmate_core::domain::desk::Desk;
use deskmate_core::domain::telemetry::AdjustmentSource;
use deskmate_core::height;
use std::sync::Arc;
use tracing::{info, warn};

use crate::store::DeskStore;

/// What happened to the desk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actuation {
    /// The device accepted the move
    Confirmed {
        position_mm: i32,
        /// Set when the device moved but the local state write failed
        warning: Option<String>,
    },
    /// The device could not be reached; the move was only recorded locally
    Offline { position_mm: i32, warning: String },
}

impl Actuation {
    pub fn position_mm(&self) -> i32 {
        match self {
            Actuation::Confirmed { position_mm, .. } | Actuation::Offline { position_mm, .. } => {
                *position_mm
            }
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Actuation::Confirmed { warning, .. } => warning.as_deref(),
            Actuation::Offline { warning, .. } => Some(warning),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Actuation::Confirmed { .. })
    }
}

#[derive(Clone)]
pub struct DeskActuator {
    device: Arc<dyn DeviceApi>,
    desks: Arc<dyn DeskStore>,
}

impl DeskActuator {
    pub fn new(device: Arc<dyn DeviceApi>, desks: Arc<dyn DeskStore>) -> Self {
        Self { device, desks }
    }

    /// Move `desk` to `height_cm` on behalf of `source`
    pub async fn apply(
        &self,
        desk: &Desk,
        height_cm: i32,
        source: AdjustmentSource,
        now: DateTime<Utc>,
    ) -> Result<Actuation, ClientError> {
        let requested_mm = height::cm_to_mm(height_cm);

        match self.device.set_position(&desk.id, requested_mm).await {
            Ok(echo) => {
                let position_mm = if height::mm_in_envelope(echo.position_mm) {
                    echo.position_mm
                } else {
                    warn!(
                        desk_id = %desk.id,
                        "Device echoed position {}mm outside the envelope, recording {}mm",
                        echo.position_mm,
                        requested_mm
                    );
                    requested_mm
                };

                info!(desk_id = %desk.id, "Desk moved to {}mm ({})", position_mm, source);

                let warning = self
                    .record(desk, position_mm, height_cm, source, true, now)
                    .await
                    .map(|e| format!("Desk moved but state sync is delayed: {}", e));

                Ok(Actuation::Confirmed {
                    position_mm,
                    warning,
                })
            }
            Err(e) if e.is_transient() => {
                let source = source.offline();
                warn!(desk_id = %desk.id, "Device offline, recording {}mm locally: {}", requested_mm, e);

                let mut warning = format!(
                    "Device unreachable, height recorded locally; the desk may not have moved ({})",
                    e
                );
                if let Some(store_error) = self
                    .record(desk, requested_mm, height_cm, source, false, now)
                    .await
                {
                    warning.push_str(&format!("; local state write failed: {}", store_error));
                }

                Ok(Actuation::Offline {
                    position_mm: requested_mm,
                    warning,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Overlay the position onto the desk's telemetry and persist it.
    /// Returns the reason if the write did not happen.
    async fn record(
        &self,
        desk: &Desk,
        position_mm: i32,
        height_cm: i32,
        source: AdjustmentSource,
        is_online: bool,
        now: DateTime<Utc>,
    ) -> Option<String> {
        let mut telemetry = desk.last_data.clone();
        telemetry.overlay_adjustment(position_mm, height_cm, now, source);

        match self
            .desks
            .write_state(&desk.id, &telemetry, is_online, now)
            .await
        {
            Ok(true) => None,
            Ok(false) => {
                warn!(desk_id = %desk.id, "Desk disappeared before its state could be written");
                Some(format!("desk {} no longer exists", desk.id))
            }
            Err(e) => {
                warn!(desk_id = %desk.id, "Failed to write desk state: {}", e);
                Some(e.to_string())
            }
        }
    }
}
