//! Global height envelope
//!
//! Devices report and accept positions in millimeters, users work in
//! centimeters. The conversion factor is exactly 10 (`cm * 10 = mm`).
//! Nothing outside the envelope may ever reach a device.

/// Lowest position a desk may be driven to, in millimeters
pub const MIN_MM: i32 = 680;

/// Highest position a desk may be driven to, in millimeters
pub const MAX_MM: i32 = 1320;

/// Lowest user-facing height, in centimeters
pub const MIN_CM: i32 = 68;

/// Highest user-facing height, in centimeters
pub const MAX_CM: i32 = 132;

/// Converts a user-facing height to a device position
pub fn cm_to_mm(height_cm: i32) -> i32 {
    height_cm.saturating_mul(10)
}

/// Converts a device position to a user-facing height, rounding to the
/// nearest centimeter (halves round up).
pub fn mm_to_cm(position_mm: i32) -> i32 {
    (f64::from(position_mm) / 10.0).round() as i32
}

/// Whether a device position lies inside the envelope (inclusive)
pub fn mm_in_envelope(position_mm: i32) -> bool {
    (MIN_MM..=MAX_MM).contains(&position_mm)
}

/// Whether a user-facing height lies inside the envelope (inclusive)
pub fn cm_in_envelope(height_cm: i32) -> bool {
    (MIN_CM..=MAX_CM).contains(&height_cm)
}
