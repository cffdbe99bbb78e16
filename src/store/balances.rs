//! Balance record access.
//!
//! The balance row is the most contended record in the system, so every
//! mutation goes through [`update_if`], a compare-and-set on the current
//! amount. Lost updates surface as a `false` return, never as silently
//! overwritten money.

use rust_decimal::Decimal;

use crate::{db::DbPool, error::AppError, models::balance::UserBalance};

/// Fetch the user's balance, creating it with the seed amount on first
/// lookup.
///
/// The insert is `ON CONFLICT DO NOTHING`, so two concurrent first lookups
/// agree on a single row.
pub async fn get_or_create(
    pool: &DbPool,
    user_id: &str,
    seed_balance: Decimal,
) -> Result<UserBalance, AppError> {
    sqlx::query(
        "INSERT INTO user_balances (user_id, available_balance) VALUES ($1, $2)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(seed_balance)
    .execute(pool)
    .await?;

    let balance = sqlx::query_as::<_, UserBalance>(
        "SELECT user_id, available_balance, created_at, updated_at
         FROM user_balances WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(balance)
}

/// Conditionally set the balance to `new_balance`.
///
/// The write only applies while the stored amount still equals `expected`.
/// Returns whether the update won; a `false` means another request moved
/// the balance first and the caller must re-read before retrying.
pub async fn update_if(
    pool: &DbPool,
    user_id: &str,
    new_balance: Decimal,
    expected: Decimal,
) -> Result<bool, AppError> {
    let updated = sqlx::query(
        "UPDATE user_balances
         SET available_balance = $2, updated_at = NOW()
         WHERE user_id = $1 AND available_balance = $3",
    )
    .bind(user_id)
    .bind(new_balance)
    .bind(expected)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(updated == 1)
}
