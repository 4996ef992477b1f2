//! Scheduler layer
//!
//! Periodically finds due scheduled tasks and hands them to the executor.
//! The poller owns its own start/stop lifecycle and can be single-stepped
//! with [`TaskPoller::tick_at`].

pub mod poller;

pub use poller::{PollerHandle, TaskPoller};
