//! User Desk Repository
//!
//! Ownership links between users and desks.

use sqlx::PgPool;
use uuid::Uuid;

/// Link a user to a desk. Returns true if the link did not exist yet.
pub async fn ensure(pool: &PgPool, user_id: Uuid, desk_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_desks (user_id, desk_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, desk_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(desk_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
