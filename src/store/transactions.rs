//! Transaction record access.
//!
//! Records are append-only. After the insert exactly two one-shot updates
//! exist: `finalize` moves the status away from PENDING once, and
//! `mark_notification_sent` sets the flag once. Both are conditional so a
//! repeated call cannot rewrite history.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::transaction::{Transaction, TransactionStatus, TransactionType},
};

const COLUMNS: &str = "id, user_id, fund_id, transaction_type, amount, status, \
                       notification_sent, created_at, updated_at";

/// Append a new transaction record with a fresh id.
pub async fn append(
    pool: &DbPool,
    user_id: &str,
    fund_id: &str,
    transaction_type: TransactionType,
    amount: Decimal,
    status: TransactionStatus,
) -> Result<Transaction, AppError> {
    let transaction = sqlx::query_as::<_, Transaction>(&format!(
        "INSERT INTO transactions (id, user_id, fund_id, transaction_type, amount, status)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(fund_id)
    .bind(transaction_type.as_str())
    .bind(amount)
    .bind(status.as_str())
    .fetch_one(pool)
    .await?;

    Ok(transaction)
}

/// Finalize a pending transaction to COMPLETED or FAILED.
///
/// Returns `false` when the record was not pending anymore.
pub async fn finalize(
    pool: &DbPool,
    transaction_id: Uuid,
    status: TransactionStatus,
) -> Result<bool, AppError> {
    let updated = sqlx::query(
        "UPDATE transactions SET status = $2, updated_at = NOW()
         WHERE id = $1 AND status = 'PENDING'",
    )
    .bind(transaction_id)
    .bind(status.as_str())
    .execute(pool)
    .await?
    .rows_affected();

    Ok(updated == 1)
}

/// Record that a notification went out for this transaction.
pub async fn mark_notification_sent(
    pool: &DbPool,
    transaction_id: Uuid,
) -> Result<bool, AppError> {
    let updated = sqlx::query(
        "UPDATE transactions SET notification_sent = true, updated_at = NOW()
         WHERE id = $1 AND notification_sent = false",
    )
    .bind(transaction_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(updated == 1)
}

/// The user's latest transactions, newest first.
pub async fn list_for_user(
    pool: &DbPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Transaction>, AppError> {
    let transactions = sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {COLUMNS} FROM transactions
         WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}
