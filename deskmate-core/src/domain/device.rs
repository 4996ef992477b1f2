//! Device service types
//!
//! Mirrors the JSON the device service returns for `GET /desks/{id}`.

use serde::{Deserialize, Serialize};

use crate::height;

/// Full snapshot of one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub config: DeviceConfig,
    pub state: DeviceState,
    #[serde(default)]
    pub usage: DeviceUsage,
    #[serde(rename = "lastErrors", default)]
    pub recent_errors: Vec<DeviceFault>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub position_mm: i32,
    #[serde(default)]
    pub speed_mms: i32,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "isPositionLost", default)]
    pub is_position_lost: bool,
    #[serde(rename = "isOverloadProtectionUp", default)]
    pub is_overload_protection_up: bool,
    #[serde(rename = "isOverloadProtectionDown", default)]
    pub is_overload_protection_down: bool,
    #[serde(rename = "isAntiCollision", default)]
    pub is_anti_collision: bool,
}

impl DeviceState {
    pub fn position_in_envelope(&self) -> bool {
        height::mm_in_envelope(self.position_mm)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceUsage {
    #[serde(rename = "activationsCounter", default)]
    pub activations_counter: i64,
    #[serde(rename = "sitStandCounter", default)]
    pub sit_stand_counter: i64,
}

/// One entry of the device's recent error log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceFault {
    pub time_s: i64,
    #[serde(rename = "errorCode")]
    pub error_code: i32,
}
