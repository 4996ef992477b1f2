//! API Module
//!
//! HTTP API layer for the desk scheduler.
//! Each submodule handles endpoints for a specific domain.

pub mod desk;
pub mod error;
pub mod health;
pub mod scheduler;

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::scheduler::TaskPoller;
use crate::service::{DeskSyncService, HeightService, OccupancyService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub poller: Arc<TaskPoller>,
    pub sync: Arc<DeskSyncService>,
    pub height: Arc<HeightService>,
    pub occupancy: Arc<OccupancyService>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Scheduler endpoints
        .route("/api/scheduled-tasks/due", get(scheduler::list_due_tasks))
        .route("/api/scheduler/tick", post(scheduler::run_tick))
        // Desk endpoints
        .route("/api/desks/sync", post(desk::sync_all))
        .route("/api/desks/{id}/sync", post(desk::sync_desk))
        .route("/api/desks/{id}/height", put(desk::set_height))
        .route("/api/desks/{id}/lock", post(desk::lock_desk))
        .route("/api/desks/{id}/unlock", post(desk::unlock_desk))
        // Controller endpoints
        .route("/api/pico-occupied", post(desk::controller_occupied))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
