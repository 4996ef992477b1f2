//! Desk domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::telemetry::DeskTelemetry;

/// A height-adjustable desk mirrored from the device service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Desk {
    /// Human-assigned id or the device hardware address
    pub id: String,
    pub controller_id: Option<String>,
    pub name: String,
    /// A person is believed to be at the desk; automated moves must wait
    pub is_locked: bool,
    /// Last known reachability of the underlying device
    pub is_online: bool,
    pub last_data: DeskTelemetry,
    pub last_data_at: Option<DateTime<Utc>>,
}

impl Desk {
    /// Creates an unlocked, offline desk with empty telemetry
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            controller_id: None,
            name: name.into(),
            is_locked: false,
            is_online: false,
            last_data: DeskTelemetry::default(),
            last_data_at: None,
        }
    }

    pub fn with_controller(mut self, controller_id: impl Into<String>) -> Self {
        self.controller_id = Some(controller_id.into());
        self
    }
}
