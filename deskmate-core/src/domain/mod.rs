//! Core domain types
//!
//! This module contains the core domain structures used across DeskMate services.
//! Desks and scheduled tasks are persisted by the server's store; device types
//! mirror what the external device service reports.

pub mod desk;
pub mod device;
pub mod task;
pub mod telemetry;
