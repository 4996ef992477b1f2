//! DeskMate Core
//!
//! Core types and abstractions shared by the DeskMate services.
//!
//! This crate contains:
//! - Domain types: desks, scheduled tasks, device snapshots and desk telemetry
//! - DTOs: request/response bodies exchanged over HTTP
//! - The global height envelope and cm/mm conversions

pub mod domain;
pub mod dto;
pub mod height;
