//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deskmate_client::ClientError;

use crate::service::{HeightError, OccupancyError, SyncError};
use crate::store::StoreError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// The device service failed or refused the request
    BadGateway(String),
    StoreError(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => {
                tracing::warn!("Device service error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            ApiError::StoreError(err) => {
                tracing::error!("Store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::StoreError(err)
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::OutOfRange { .. } => ApiError::BadRequest(err.to_string()),
            _ => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl From<HeightError> for ApiError {
    fn from(err: HeightError) -> Self {
        match err {
            HeightError::OutOfRange { .. } => ApiError::BadRequest(err.to_string()),
            HeightError::DeskNotFound(id) => ApiError::NotFound(format!("Desk {} not found", id)),
            HeightError::Device(err) => err.into(),
            HeightError::Store(err) => ApiError::StoreError(err),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Device(err) => err.into(),
            SyncError::Store(err) => ApiError::StoreError(err),
        }
    }
}

impl From<OccupancyError> for ApiError {
    fn from(err: OccupancyError) -> Self {
        match err {
            OccupancyError::DeskNotFound(id) => {
                ApiError::NotFound(format!("Desk {} not found", id))
            }
            OccupancyError::ControllerNotFound(id) => {
                ApiError::NotFound(format!("Controller {} not found", id))
            }
            OccupancyError::Store(err) => ApiError::StoreError(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_height_errors_map_to_status() {
        assert_eq!(
            status_of(HeightError::OutOfRange {
                attempted_cm: 200,
                min_cm: 68,
                max_cm: 132
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(HeightError::DeskNotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(HeightError::Device(ClientError::Rejected {
                target: "desk x".to_string(),
                status: 500,
                message: "boom".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(HeightError::Store(StoreError::Unavailable("down".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sync_listing_failure_is_bad_gateway() {
        let err = SyncError::Device(ClientError::Connectivity {
            target: "desk list".to_string(),
            detail: "connection refused".to_string(),
        });
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }
}
