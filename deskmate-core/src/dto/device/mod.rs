//! Device service DTOs

use serde::{Deserialize, Serialize};

/// Body of `PUT /desks/{id}/state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPositionRequest {
    pub position_mm: i32,
}

/// Echo returned by the device after a position write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPositionResponse {
    pub position_mm: i32,
}
