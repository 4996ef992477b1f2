//! Desk Repository
//!
//! Handles all database operations related to desks and their telemetry.

use chrono::{DateTime, Utc};
use deskmate_core::domain::desk::Desk;
use deskmate_core::domain::telemetry::DeskTelemetry;
use sqlx::PgPool;

/// Find a desk by ID
pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Desk>, sqlx::Error> {
    let row = sqlx::query_as::<_, DeskRow>(
        r#"
        SELECT id, controller_id, name, is_locked, is_online, last_data, last_data_at
        FROM desks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Create a desk from a device sync, or refresh an existing one
pub async fn upsert_synced(
    pool: &PgPool,
    id: &str,
    name: &str,
    telemetry: &DeskTelemetry,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO desks (id, name, is_locked, is_online, last_data, last_data_at)
        VALUES ($1, $2, FALSE, TRUE, $3, $4)
        ON CONFLICT (id) DO UPDATE SET
            is_online = TRUE,
            last_data = EXCLUDED.last_data,
            last_data_at = EXCLUDED.last_data_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(telemetry.to_value())
    .bind(at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace telemetry and reachability of a desk
pub async fn write_state(
    pool: &PgPool,
    id: &str,
    telemetry: &DeskTelemetry,
    is_online: bool,
    at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE desks
        SET last_data = $1, is_online = $2, last_data_at = $3
        WHERE id = $4
        "#,
    )
    .bind(telemetry.to_value())
    .bind(is_online)
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Set the lock flag of a single desk
pub async fn set_locked(pool: &PgPool, id: &str, locked: bool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE desks SET is_locked = $1 WHERE id = $2")
        .bind(locked)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Set the lock flag of every desk wired to a controller
pub async fn set_locked_by_controller(
    pool: &PgPool,
    controller_id: &str,
    locked: bool,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE desks SET is_locked = $1 WHERE controller_id = $2")
        .bind(locked)
        .bind(controller_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DeskRow {
    id: String,
    controller_id: Option<String>,
    name: String,
    is_locked: bool,
    is_online: bool,
    last_data: serde_json::Value,
    last_data_at: Option<DateTime<Utc>>,
}

impl From<DeskRow> for Desk {
    fn from(row: DeskRow) -> Self {
        Desk {
            id: row.id,
            controller_id: row.controller_id,
            name: row.name,
            is_locked: row.is_locked,
            is_online: row.is_online,
            last_data: DeskTelemetry::from_value(row.last_data),
            last_data_at: row.last_data_at,
        }
    }
}
