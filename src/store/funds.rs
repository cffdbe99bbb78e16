//! Fund catalog access. Read-only at runtime.

use crate::{db::DbPool, error::AppError, models::fund::Fund};

/// Fetch a fund by id.
pub async fn get(pool: &DbPool, fund_id: &str) -> Result<Option<Fund>, AppError> {
    let fund = sqlx::query_as::<_, Fund>(
        "SELECT id, name, minimum_amount, category, is_active, created_at FROM funds WHERE id = $1",
    )
    .bind(fund_id)
    .fetch_optional(pool)
    .await?;

    Ok(fund)
}

/// List the funds currently open for subscription.
pub async fn list_active(pool: &DbPool) -> Result<Vec<Fund>, AppError> {
    let funds = sqlx::query_as::<_, Fund>(
        "SELECT id, name, minimum_amount, category, is_active, created_at
         FROM funds WHERE is_active = true ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(funds)
}
