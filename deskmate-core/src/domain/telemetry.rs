//! Desk telemetry (`last_data`)
//!
//! The persisted `last_data` column is an open JSON object. Internally it is
//! read into [`DeskTelemetry`], which types the keys this system writes and
//! keeps every other key in `extra` so older or foreign records survive a
//! read-modify-write untouched.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::device::{DeviceFault, DeviceSnapshot};
use crate::height;

/// Current telemetry layout version. Bags written before versioning read as 0.
pub const TELEMETRY_VERSION: u32 = 1;

/// Who last moved the desk, recorded as `adjusted_by`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentSource {
    Scheduler,
    SchedulerDeviceOffline,
    Manual,
    ManualDeviceOffline,
}

impl AdjustmentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentSource::Scheduler => "scheduler",
            AdjustmentSource::SchedulerDeviceOffline => "scheduler, device offline",
            AdjustmentSource::Manual => "manual",
            AdjustmentSource::ManualDeviceOffline => "manual, device offline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduler" => Some(AdjustmentSource::Scheduler),
            "scheduler, device offline" => Some(AdjustmentSource::SchedulerDeviceOffline),
            "manual" => Some(AdjustmentSource::Manual),
            "manual, device offline" => Some(AdjustmentSource::ManualDeviceOffline),
            _ => None,
        }
    }

    /// The same origin, but marked as applied while the device was unreachable
    pub fn offline(self) -> Self {
        match self {
            AdjustmentSource::Scheduler | AdjustmentSource::SchedulerDeviceOffline => {
                AdjustmentSource::SchedulerDeviceOffline
            }
            AdjustmentSource::Manual | AdjustmentSource::ManualDeviceOffline => {
                AdjustmentSource::ManualDeviceOffline
            }
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(
            self,
            AdjustmentSource::SchedulerDeviceOffline | AdjustmentSource::ManualDeviceOffline
        )
    }
}

impl std::fmt::Display for AdjustmentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most recent known state of a desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskTelemetry {
    #[serde(rename = "schema_version", default)]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_mm: Option<i32>,

    /// Height in centimeters, derived from `position_mm`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mms: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(rename = "isPositionLost", default, skip_serializing_if = "Option::is_none")]
    pub is_position_lost: Option<bool>,

    #[serde(
        rename = "isOverloadProtectionUp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_overload_protection_up: Option<bool>,

    #[serde(
        rename = "isOverloadProtectionDown",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_overload_protection_down: Option<bool>,

    #[serde(rename = "isAntiCollision", default, skip_serializing_if = "Option::is_none")]
    pub is_anti_collision: Option<bool>,

    #[serde(rename = "activationsCounter", default, skip_serializing_if = "Option::is_none")]
    pub activations_counter: Option<i64>,

    #[serde(rename = "sitStandCounter", default, skip_serializing_if = "Option::is_none")]
    pub sit_stand_counter: Option<i64>,

    #[serde(rename = "lastErrors", default, skip_serializing_if = "Vec::is_empty")]
    pub recent_errors: Vec<DeviceFault>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_adjusted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_by: Option<String>,

    /// Keys this version does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DeskTelemetry {
    fn default() -> Self {
        Self {
            version: TELEMETRY_VERSION,
            manufacturer: None,
            position_mm: None,
            height: None,
            speed_mms: None,
            status: None,
            is_position_lost: None,
            is_overload_protection_up: None,
            is_overload_protection_down: None,
            is_anti_collision: None,
            activations_counter: None,
            sit_stand_counter: None,
            recent_errors: Vec::new(),
            last_adjusted_at: None,
            adjusted_by: None,
            extra: Map::new(),
        }
    }
}

impl DeskTelemetry {
    /// Builds a normalized bag from a device snapshot.
    ///
    /// A reported position outside the envelope is dropped rather than stored.
    pub fn from_snapshot(snapshot: &DeviceSnapshot) -> Self {
        let state = &snapshot.state;
        let (position_mm, height) = if state.position_in_envelope() {
            (
                Some(state.position_mm),
                Some(height::mm_to_cm(state.position_mm)),
            )
        } else {
            (None, None)
        };

        Self {
            version: TELEMETRY_VERSION,
            manufacturer: Some(snapshot.config.manufacturer.clone()),
            position_mm,
            height,
            speed_mms: Some(state.speed_mms),
            status: Some(state.status.clone()),
            is_position_lost: Some(state.is_position_lost),
            is_overload_protection_up: Some(state.is_overload_protection_up),
            is_overload_protection_down: Some(state.is_overload_protection_down),
            is_anti_collision: Some(state.is_anti_collision),
            activations_counter: Some(snapshot.usage.activations_counter),
            sit_stand_counter: Some(snapshot.usage.sit_stand_counter),
            recent_errors: snapshot.recent_errors.clone(),
            last_adjusted_at: None,
            adjusted_by: None,
            extra: Map::new(),
        }
    }

    /// Reads a stored bag. Anything that is not a JSON object reads as empty.
    ///
    /// Keys are decoded one at a time: a known key whose value has an
    /// unexpected type stays in `extra` verbatim instead of failing the
    /// whole bag.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut bag) = value else {
            return Self::default();
        };

        let mut telemetry = Self {
            version: take(&mut bag, "schema_version").unwrap_or(0),
            manufacturer: take(&mut bag, "manufacturer"),
            position_mm: take(&mut bag, "position_mm"),
            height: take(&mut bag, "height"),
            speed_mms: take(&mut bag, "speed_mms"),
            status: take(&mut bag, "status"),
            is_position_lost: take(&mut bag, "isPositionLost"),
            is_overload_protection_up: take(&mut bag, "isOverloadProtectionUp"),
            is_overload_protection_down: take(&mut bag, "isOverloadProtectionDown"),
            is_anti_collision: take(&mut bag, "isAntiCollision"),
            activations_counter: take(&mut bag, "activationsCounter"),
            sit_stand_counter: take(&mut bag, "sitStandCounter"),
            recent_errors: take(&mut bag, "lastErrors").unwrap_or_default(),
            last_adjusted_at: take(&mut bag, "last_adjusted_at"),
            adjusted_by: take(&mut bag, "adjusted_by"),
            extra: Map::new(),
        };
        telemetry.extra = bag;
        telemetry
    }

    /// Writes the bag back out. Typed keys that are set win over raw values
    /// kept under the same name in `extra`.
    pub fn to_value(&self) -> Value {
        let mut bag = self.extra.clone();
        let typed = Self {
            extra: Map::new(),
            ..self.clone()
        };
        if let Ok(Value::Object(fields)) = serde_json::to_value(&typed) {
            bag.extend(fields);
        }
        Value::Object(bag)
    }

    /// Overlays a new position onto the bag, leaving every other key alone.
    ///
    /// `height_cm` is the height that was asked for; `position_mm` is what the
    /// device reported (or the request, if it never answered). Callers must
    /// have checked `position_mm` against the envelope.
    pub fn overlay_adjustment(
        &mut self,
        position_mm: i32,
        height_cm: i32,
        at: DateTime<Utc>,
        source: AdjustmentSource,
    ) {
        self.version = TELEMETRY_VERSION;
        self.position_mm = Some(position_mm);
        self.height = Some(height_cm);
        self.last_adjusted_at = Some(at);
        self.adjusted_by = Some(source.as_str().to_string());
    }

    /// Height in centimeters, falling back to the millimeter position
    pub fn height_cm(&self) -> Option<i32> {
        self.height
            .or_else(|| self.position_mm.map(height::mm_to_cm))
    }

    pub fn adjustment_source(&self) -> Option<AdjustmentSource> {
        self.adjusted_by.as_deref().and_then(AdjustmentSource::parse)
    }
}

/// Removes `key` from `bag` if it decodes as `T`; otherwise leaves it there
fn take<T: DeserializeOwned>(bag: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = bag.get(key)?;
    let decoded = T::deserialize(value).ok()?;
    bag.remove(key);
    Some(decoded)
}
