//! Desk API Handlers
//!
//! HTTP endpoints for desk synchronization, height changes and occupancy.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use deskmate_core::dto::desk::{
    OccupancyResponse, OccupancySignal, SetHeightRequest, SetHeightResponse, SyncSummary,
};

use crate::api::AppState;
use crate::api::error::ApiResult;

// =============================================================================
// Synchronization
// =============================================================================

/// POST /api/desks/sync
/// Sync every desk from the device service now
pub async fn sync_all(State(state): State<AppState>) -> ApiResult<Json<SyncSummary>> {
    tracing::info!("Syncing all desks");

    let synced = state.sync.sync_all().await?;
    Ok(Json(SyncSummary { synced }))
}

/// POST /api/desks/{id}/sync
/// Refresh a single desk from the device service
pub async fn sync_desk(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SyncSummary>> {
    tracing::info!("Syncing desk: {}", id);

    state.sync.sync_desk(&id).await?;
    Ok(Json(SyncSummary { synced: 1 }))
}

// =============================================================================
// Height
// =============================================================================

/// PUT /api/desks/{id}/height
/// Move a desk now. An unreachable device still succeeds, with a warning.
pub async fn set_height(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetHeightRequest>,
) -> ApiResult<Json<SetHeightResponse>> {
    tracing::info!("Height change for desk {}: {}cm", id, req.height);

    let response = state.height.set_height(&id, req.height).await?;
    Ok(Json(response))
}

// =============================================================================
// Occupancy
// =============================================================================

/// POST /api/desks/{id}/lock
pub async fn lock_desk(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.occupancy.set_locked(&id, true).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/desks/{id}/unlock
pub async fn unlock_desk(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.occupancy.set_locked(&id, false).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/pico-occupied
/// Presence signal from a desk controller
pub async fn controller_occupied(
    State(state): State<AppState>,
    Json(signal): Json<OccupancySignal>,
) -> ApiResult<Json<OccupancyResponse>> {
    tracing::debug!(
        "Occupancy signal from controller {}: {}",
        signal.id,
        signal.occupied
    );

    let updated = state
        .occupancy
        .controller_occupied(&signal.id, signal.occupied)
        .await?;
    Ok(Json(OccupancyResponse { updated }))
}
