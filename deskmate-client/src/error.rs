//! Error types for the device client

use thiserror::Error;

/// Result type alias for device client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Everything a device call can fail with
///
/// The set is closed so callers can match exhaustively: `OutOfRange` never
/// touches the network, `Timeout` and `Connectivity` mean the request may not
/// have reached the device, `Rejected` means it did and was refused.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Requested position is outside the global envelope
    #[error("Height {attempted_mm}mm is out of valid range ({min_mm}-{max_mm}mm)")]
    OutOfRange {
        attempted_mm: i32,
        min_mm: i32,
        max_mm: i32,
    },

    /// An attempt exceeded its deadline
    #[error("Device request timed out after {timeout_ms}ms for {target}")]
    Timeout { target: String, timeout_ms: u64 },

    /// The device service could not be reached, or refused a read
    #[error("Unable to reach device service for {target}: {detail}")]
    Connectivity { target: String, detail: String },

    /// The device service received the request and rejected it
    #[error("Device rejected request for {target} (status {status}): {message}")]
    Rejected {
        target: String,
        status: u16,
        message: String,
    },

    /// A success response whose body could not be decoded
    #[error("Invalid response from device service: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Timeout or connectivity: the device may simply be offline
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connectivity { .. })
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}
