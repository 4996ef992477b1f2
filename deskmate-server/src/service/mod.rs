//! Service Module
//!
//! Business logic layer for the desk scheduler.
//! Services orchestrate between the device client and the store and contain domain logic.

pub mod actuation;
pub mod executor;
pub mod height;
pub mod occupancy;
pub mod sync;

pub use actuation::{Actuation, DeskActuator};
pub use executor::{ExecutionOutcome, ExecutorError, SkipReason, TaskExecutor};
pub use height::{HeightError, HeightService};
pub use occupancy::{OccupancyError, OccupancyService};
pub use sync::{DeskSyncService, SyncError};
