//! Subscription record access.
//!
//! One row per (user, fund) pair. Activation and deactivation are
//! conditional on the current `active` flag, which is what protects two
//! racing subscribe/cancel calls on the same pair: only one of them can
//! flip the flag.

use rust_decimal::Decimal;

use crate::{db::DbPool, error::AppError, models::subscription::Subscription};

const COLUMNS: &str = "user_id, fund_id, active, subscription_amount, invested_amount, \
                       subscribed_at, cancelled_at, created_at, updated_at";

/// Fetch the subscription record for a (user, fund) pair.
pub async fn get(
    pool: &DbPool,
    user_id: &str,
    fund_id: &str,
) -> Result<Option<Subscription>, AppError> {
    let subscription = sqlx::query_as::<_, Subscription>(&format!(
        "SELECT {COLUMNS} FROM user_funds WHERE user_id = $1 AND fund_id = $2"
    ))
    .bind(user_id)
    .bind(fund_id)
    .fetch_optional(pool)
    .await?;

    Ok(subscription)
}

/// List the user's active subscriptions.
pub async fn list_active(pool: &DbPool, user_id: &str) -> Result<Vec<Subscription>, AppError> {
    let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
        "SELECT {COLUMNS} FROM user_funds
         WHERE user_id = $1 AND active = true ORDER BY subscribed_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(subscriptions)
}

/// Open a subscription: insert a fresh row, or reactivate an inactive one.
///
/// The upsert only touches rows with `active = false`, so a concurrent
/// request that already activated the pair makes this call report `false`
/// instead of double-subscribing.
pub async fn activate(
    pool: &DbPool,
    user_id: &str,
    fund_id: &str,
    amount: Decimal,
) -> Result<bool, AppError> {
    let updated = sqlx::query(
        "INSERT INTO user_funds
             (user_id, fund_id, active, subscription_amount, invested_amount, subscribed_at)
         VALUES ($1, $2, true, $3, $3, NOW())
         ON CONFLICT (user_id, fund_id) DO UPDATE
         SET active = true,
             subscription_amount = EXCLUDED.subscription_amount,
             invested_amount = EXCLUDED.invested_amount,
             subscribed_at = EXCLUDED.subscribed_at,
             cancelled_at = NULL,
             updated_at = NOW()
         WHERE user_funds.active = false",
    )
    .bind(user_id)
    .bind(fund_id)
    .bind(amount)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(updated == 1)
}

/// Close a subscription: flip `active` off, stamp `cancelled_at` and zero
/// the invested amount (the refund moved it back to the balance).
///
/// Conditional on `active = true`; `false` means there was nothing left to
/// cancel by the time the write ran.
pub async fn deactivate(pool: &DbPool, user_id: &str, fund_id: &str) -> Result<bool, AppError> {
    let updated = sqlx::query(
        "UPDATE user_funds
         SET active = false, cancelled_at = NOW(), invested_amount = 0, updated_at = NOW()
         WHERE user_id = $1 AND fund_id = $2 AND active = true",
    )
    .bind(user_id)
    .bind(fund_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(updated == 1)
}
