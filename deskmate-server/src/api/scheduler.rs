//! Scheduler API Handlers
//!
//! HTTP endpoints for inspecting and driving the task poller.

use axum::{Json, extract::State};
use chrono::Utc;
use deskmate_core::dto::task::{DueTasks, TickReport};

use crate::api::AppState;
use crate::api::error::ApiResult;

/// GET /api/scheduled-tasks/due
/// List tasks that are due now, IN_PROGRESS first
pub async fn list_due_tasks(State(state): State<AppState>) -> ApiResult<Json<DueTasks>> {
    let due = state.poller.due_tasks(Utc::now()).await?;
    Ok(Json(due))
}

/// POST /api/scheduler/tick
/// Run one poll tick now
pub async fn run_tick(State(state): State<AppState>) -> ApiResult<Json<TickReport>> {
    tracing::info!("Manual poll tick requested");

    let report = state.poller.tick().await?;
    Ok(Json(report))
}
