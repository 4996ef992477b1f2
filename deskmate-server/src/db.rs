use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create desks table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS desks (
            id VARCHAR(255) PRIMARY KEY,
            controller_id VARCHAR(255),
            name VARCHAR(255) NOT NULL,
            is_locked BOOLEAN NOT NULL DEFAULT FALSE,
            is_online BOOLEAN NOT NULL DEFAULT FALSE,
            last_data JSONB NOT NULL DEFAULT '{}',
            last_data_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create scheduled tasks table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scheduled_tasks (
            id UUID PRIMARY KEY,
            desk_id VARCHAR(255) NOT NULL REFERENCES desks(id) ON DELETE CASCADE,
            user_id UUID NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            new_height INTEGER NOT NULL,
            scheduled_at TIMESTAMPTZ NOT NULL,
            completed_at TIMESTAMPTZ,
            status VARCHAR(50) NOT NULL,
            error_message TEXT,
            warning_message TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Older databases predate degraded-success warnings
    sqlx::query("ALTER TABLE scheduled_tasks ADD COLUMN IF NOT EXISTS warning_message TEXT")
        .execute(pool)
        .await?;

    // Create user desk links
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_desks (
            user_id UUID NOT NULL,
            desk_id VARCHAR(255) NOT NULL REFERENCES desks(id) ON DELETE CASCADE,
            UNIQUE (user_id, desk_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for the scheduler queries
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_scheduled_tasks_due ON scheduled_tasks(status, scheduled_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_desks_controller_id ON desks(controller_id)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
