//! Height Service
//!
//! Interactive "set this desk's height now". Shares validation, retries and
//! the degraded-success rules with the scheduler, but answers synchronously.

use chrono::Utc;
use deskmate_client::ClientError;
use deskmate_core::domain::telemetry::AdjustmentSource;
use deskmate_core::dto::desk::SetHeightResponse;
use deskmate_core::height;
use std::sync::Arc;
use thiserror::Error;

use crate::service::actuation::DeskActuator;
use crate::store::{DeskStore, StoreError};

/// Height service error type
#[derive(Debug, Error)]
pub enum HeightError {
    #[error("Height {attempted_cm}cm is out of valid range ({min_cm}-{max_cm}cm)")]
    OutOfRange {
        attempted_cm: i32,
        min_cm: i32,
        max_cm: i32,
    },

    #[error("Desk not found: {0}")]
    DeskNotFound(String),

    #[error(transparent)]
    Device(#[from] ClientError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub struct HeightService {
    desks: Arc<dyn DeskStore>,
    actuator: DeskActuator,
}

impl HeightService {
    pub fn new(desks: Arc<dyn DeskStore>, actuator: DeskActuator) -> Self {
        Self { desks, actuator }
    }

    /// Move a desk to `height_cm` now
    pub async fn set_height(
        &self,
        desk_id: &str,
        height_cm: i32,
    ) -> Result<SetHeightResponse, HeightError> {
        if !height::cm_in_envelope(height_cm) {
            return Err(HeightError::OutOfRange {
                attempted_cm: height_cm,
                min_cm: height::MIN_CM,
                max_cm: height::MAX_CM,
            });
        }

        let desk = self
            .desks
            .get_desk(desk_id)
            .await?
            .ok_or_else(|| HeightError::DeskNotFound(desk_id.to_string()))?;

        tracing::info!("Setting desk {} to {}cm", desk_id, height_cm);

        let actuation = self
            .actuator
            .apply(&desk, height_cm, AdjustmentSource::Manual, Utc::now())
            .await?;

        Ok(SetHeightResponse {
            desk_id: desk.id,
            height: height_cm,
            position_mm: actuation.position_mm(),
            device_confirmed: actuation.is_confirmed(),
            warning: actuation.warning().map(str::to_string),
        })
    }
}
