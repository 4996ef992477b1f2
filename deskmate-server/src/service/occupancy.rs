//! Occupancy Service
//!
//! Writers of the desk lock flag: explicit lock/unlock of one desk, and the
//! presence signal a desk controller sends for every desk wired to it.
//! The flag is a best-effort admission filter for the scheduler, not a
//! mutual-exclusion primitive.

use std::sync::Arc;
use thiserror::Error;

use crate::store::{DeskStore, StoreError};

/// Occupancy error type
#[derive(Debug, Error)]
pub enum OccupancyError {
    #[error("Desk not found: {0}")]
    DeskNotFound(String),

    /// No desk is wired to the controller
    #[error("Controller not found: {0}")]
    ControllerNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub struct OccupancyService {
    desks: Arc<dyn DeskStore>,
}

impl OccupancyService {
    pub fn new(desks: Arc<dyn DeskStore>) -> Self {
        Self { desks }
    }

    /// Lock or unlock a single desk
    pub async fn set_locked(&self, desk_id: &str, locked: bool) -> Result<(), OccupancyError> {
        if !self.desks.set_locked(desk_id, locked).await? {
            return Err(OccupancyError::DeskNotFound(desk_id.to_string()));
        }

        tracing::info!(
            "Desk {} {}",
            desk_id,
            if locked { "locked" } else { "unlocked" }
        );
        Ok(())
    }

    /// Apply a controller's presence signal to all of its desks.
    /// Returns the number of desks updated; a controller with no desks is
    /// unknown.
    pub async fn controller_occupied(
        &self,
        controller_id: &str,
        occupied: bool,
    ) -> Result<u64, OccupancyError> {
        let updated = self
            .desks
            .set_locked_by_controller(controller_id, occupied)
            .await?;

        if updated == 0 {
            tracing::warn!("Occupancy signal from unknown controller {}", controller_id);
            return Err(OccupancyError::ControllerNotFound(controller_id.to_string()));
        }

        tracing::info!(
            "Controller {} reports {}, {} desk(s) updated",
            controller_id,
            if occupied { "occupied" } else { "free" },
            updated
        );
        Ok(updated)
    }
}
