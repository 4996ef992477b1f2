//! Data Transfer Objects
//!
//! Request and response bodies exchanged with the device service and with
//! clients of the DeskMate HTTP API.

pub mod desk;
pub mod device;
pub mod task;
