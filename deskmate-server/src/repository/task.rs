//! Scheduled Task Repository
//!
//! Handles all database operations related to scheduled desk tasks.

use chrono::{DateTime, Utc};
use deskmate_core::domain::task::{ScheduledTask, TaskResolution, TaskStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Find tasks in a status that are due, oldest first
pub async fn find_due(
    pool: &PgPool,
    status: TaskStatus,
    now: DateTime<Utc>,
) -> Result<Vec<ScheduledTask>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(
        r#"
        SELECT id, desk_id, user_id, description, new_height, scheduled_at,
               completed_at, status, error_message, warning_message
        FROM scheduled_tasks
        WHERE status = $1 AND scheduled_at <= $2
        ORDER BY scheduled_at ASC
        "#,
    )
    .bind(status.as_str())
    .bind(now)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ScheduledTask::try_from).collect()
}

/// Find a task by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ScheduledTask>, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(
        r#"
        SELECT id, desk_id, user_id, description, new_height, scheduled_at,
               completed_at, status, error_message, warning_message
        FROM scheduled_tasks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(ScheduledTask::try_from).transpose()
}

/// Move a PENDING task to IN_PROGRESS
pub async fn mark_in_progress(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE scheduled_tasks
        SET status = $1
        WHERE id = $2 AND status = $3
        "#,
    )
    .bind(TaskStatus::InProgress.as_str())
    .bind(id)
    .bind(TaskStatus::Pending.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Write the terminal state of an IN_PROGRESS task
pub async fn resolve(
    pool: &PgPool,
    id: Uuid,
    resolution: &TaskResolution,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE scheduled_tasks
        SET status = $1, completed_at = $2, error_message = $3, warning_message = $4
        WHERE id = $5 AND status = $6
        "#,
    )
    .bind(resolution.status.as_str())
    .bind(resolution.completed_at)
    .bind(&resolution.error_message)
    .bind(&resolution.warning_message)
    .bind(id)
    .bind(TaskStatus::InProgress.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    desk_id: String,
    user_id: Uuid,
    description: String,
    new_height: i32,
    scheduled_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    status: String,
    error_message: Option<String>,
    warning_message: Option<String>,
}

impl TryFrom<TaskRow> for ScheduledTask {
    type Error = sqlx::Error;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TaskStatus>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(ScheduledTask {
            id: row.id,
            desk_id: row.desk_id,
            user_id: row.user_id,
            description: row.description,
            new_height: row.new_height,
            scheduled_at: row.scheduled_at,
            completed_at: row.completed_at,
            status,
            error_message: row.error_message,
            warning_message: row.warning_message,
        })
    }
}
