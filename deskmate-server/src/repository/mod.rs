//! Repository Module
//!
//! Data access layer for the PostgreSQL store.
//! Each repository handles database operations for a specific domain entity.

pub mod desk;
pub mod task;
pub mod user_desk;

// Re-export for convenience
pub use desk as desk_repository;
pub use task as task_repository;
pub use user_desk as user_desk_repository;
