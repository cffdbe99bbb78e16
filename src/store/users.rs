//! User record access.
//!
//! One user exists. The row is created on first use with placeholder
//! identity data and the configured user id; identity fields are never
//! written again afterwards.

use crate::{config::Config, db::DbPool, error::AppError, models::user::User};

// Identity of the seeded single-tenant user.
const DEFAULT_NAME: &str = "Default Client";
const DEFAULT_EMAIL: &str = "client@example.com";
const DEFAULT_PHONE: &str = "+573000000000";
const DEFAULT_DOCUMENT: &str = "1234567890";

/// Fetch the configured user, creating it if this is the first call.
///
/// `ON CONFLICT DO NOTHING` keeps concurrent first calls from racing; the
/// follow-up select always answers with the one row.
pub async fn ensure_default(pool: &DbPool, config: &Config) -> Result<User, AppError> {
    sqlx::query(
        "INSERT INTO users (user_id, name, email, phone, document_number)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(&config.default_user_id)
    .bind(DEFAULT_NAME)
    .bind(DEFAULT_EMAIL)
    .bind(DEFAULT_PHONE)
    .bind(DEFAULT_DOCUMENT)
    .execute(pool)
    .await?;

    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, name, email, phone, document_number, document_type, created_at, updated_at
         FROM users WHERE user_id = $1",
    )
    .bind(&config.default_user_id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}
