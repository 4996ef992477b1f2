//! Desk DTOs

use serde::{Deserialize, Serialize};

/// Request to move a desk now
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SetHeightRequest {
    /// Target height in centimeters
    pub height: i32,
}

/// Outcome of an accepted height change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetHeightResponse {
    pub desk_id: String,
    /// Height in centimeters now recorded for the desk
    pub height: i32,
    pub position_mm: i32,
    /// False when the device could not be reached and the change was only recorded locally
    pub device_confirmed: bool,
    pub warning: Option<String>,
}

/// Result of a bulk synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub synced: usize,
}

/// Occupancy signal sent by a desk controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancySignal {
    /// Controller id
    pub id: String,
    pub occupied: bool,
}

/// Number of desks whose lock flag was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyResponse {
    pub updated: u64,
}
