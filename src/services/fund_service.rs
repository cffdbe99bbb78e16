//! Fund service: orchestration of the subscribe and cancel operations,
//! plus the composite user-facing reads.
//!
//! Every mutating operation runs the same pipeline: load a state snapshot,
//! validate it, apply the conditional store mutations (balance first, then
//! the subscription record), append the transaction, dispatch the
//! notification and finalize the record. A mutation failure after
//! validation leaves a FAILED transaction behind and surfaces the error;
//! there is no multi-step rollback in this system.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::balance::BalanceResponse;
use crate::models::preferences::NotificationChannel;
use crate::models::subscription::ActiveSubscription;
use crate::models::transaction::{
    CancellationReceipt, SubscriptionReceipt, TransactionResponse, TransactionStatus,
    TransactionType,
};
use crate::models::user::User;
use crate::services::{notification, validation};
use crate::store;

/// Placeholder fund name for history rows whose fund vanished from the
/// catalog.
const UNKNOWN_FUND: &str = "Unknown fund";

/// Subscribe the user to a fund, debiting the fund's minimum amount.
pub async fn subscribe(
    pool: &DbPool,
    config: &Config,
    fund_id: &str,
) -> Result<SubscriptionReceipt, AppError> {
    let user = store::users::ensure_default(pool, config).await?;

    // Snapshot the state the rules need.
    let fund = store::funds::get(pool, fund_id).await?;
    let subscription = store::subscriptions::get(pool, &user.user_id, fund_id).await?;
    let balance =
        store::balances::get_or_create(pool, &user.user_id, config.initial_balance).await?;

    let intent =
        validation::validate_subscription(fund, subscription.as_ref(), balance.available_balance)?;

    let new_balance = match debit_with_retry(
        pool,
        config,
        &user.user_id,
        intent.amount,
        balance.available_balance,
    )
    .await
    {
        Ok(new_balance) => new_balance,
        Err(err) => {
            record_failure(
                pool,
                &user.user_id,
                fund_id,
                TransactionType::Subscription,
                intent.amount,
            )
            .await;
            return Err(err);
        }
    };

    match store::subscriptions::activate(pool, &user.user_id, fund_id, intent.amount).await {
        Ok(true) => {}
        Ok(false) => {
            // Another request opened this pair between validation and now.
            record_failure(
                pool,
                &user.user_id,
                fund_id,
                TransactionType::Subscription,
                intent.amount,
            )
            .await;
            return Err(AppError::ConcurrentModification);
        }
        Err(err) => {
            record_failure(
                pool,
                &user.user_id,
                fund_id,
                TransactionType::Subscription,
                intent.amount,
            )
            .await;
            return Err(err);
        }
    }

    let transaction = store::transactions::append(
        pool,
        &user.user_id,
        fund_id,
        TransactionType::Subscription,
        intent.amount,
        TransactionStatus::Pending,
    )
    .await?;

    let (notification_sent, channel) = notify(
        pool,
        config,
        &user,
        TransactionType::Subscription,
        transaction.id,
        &intent.fund.name,
        intent.amount,
        new_balance,
    )
    .await;

    if notification_sent {
        if let Err(err) = store::transactions::mark_notification_sent(pool, transaction.id).await {
            tracing::warn!(transaction_id = %transaction.id, "could not flag notification: {err}");
        }
    }

    store::transactions::finalize(pool, transaction.id, TransactionStatus::Completed).await?;

    tracing::info!(
        fund_id,
        transaction_id = %transaction.id,
        amount = %intent.amount,
        "subscription completed"
    );

    Ok(SubscriptionReceipt {
        transaction_id: transaction.id,
        fund_name: intent.fund.name,
        amount: intent.amount,
        new_balance,
        notification_sent,
        notification_channel: channel.as_str().to_string(),
    })
}

/// Cancel the user's active subscription to a fund, refunding the
/// invested amount in full.
pub async fn cancel(
    pool: &DbPool,
    config: &Config,
    fund_id: &str,
) -> Result<CancellationReceipt, AppError> {
    let user = store::users::ensure_default(pool, config).await?;

    let fund = store::funds::get(pool, fund_id).await?;
    let subscription = store::subscriptions::get(pool, &user.user_id, fund_id).await?;
    let balance =
        store::balances::get_or_create(pool, &user.user_id, config.initial_balance).await?;

    let intent =
        validation::validate_cancellation(fund, subscription.as_ref(), balance.available_balance)?;

    let new_balance = match credit_with_retry(
        pool,
        config,
        &user.user_id,
        intent.refund_amount,
        balance.available_balance,
    )
    .await
    {
        Ok(new_balance) => new_balance,
        Err(err) => {
            record_failure(
                pool,
                &user.user_id,
                fund_id,
                TransactionType::Cancellation,
                intent.refund_amount,
            )
            .await;
            return Err(err);
        }
    };

    match store::subscriptions::deactivate(pool, &user.user_id, fund_id).await {
        Ok(true) => {}
        Ok(false) => {
            record_failure(
                pool,
                &user.user_id,
                fund_id,
                TransactionType::Cancellation,
                intent.refund_amount,
            )
            .await;
            return Err(AppError::ConcurrentModification);
        }
        Err(err) => {
            record_failure(
                pool,
                &user.user_id,
                fund_id,
                TransactionType::Cancellation,
                intent.refund_amount,
            )
            .await;
            return Err(err);
        }
    }

    let transaction = store::transactions::append(
        pool,
        &user.user_id,
        fund_id,
        TransactionType::Cancellation,
        intent.refund_amount,
        TransactionStatus::Pending,
    )
    .await?;

    let (notification_sent, channel) = notify(
        pool,
        config,
        &user,
        TransactionType::Cancellation,
        transaction.id,
        &intent.fund.name,
        intent.refund_amount,
        new_balance,
    )
    .await;

    if notification_sent {
        if let Err(err) = store::transactions::mark_notification_sent(pool, transaction.id).await {
            tracing::warn!(transaction_id = %transaction.id, "could not flag notification: {err}");
        }
    }

    store::transactions::finalize(pool, transaction.id, TransactionStatus::Completed).await?;

    tracing::info!(
        fund_id,
        transaction_id = %transaction.id,
        refund = %intent.refund_amount,
        "cancellation completed"
    );

    Ok(CancellationReceipt {
        transaction_id: transaction.id,
        fund_name: intent.fund.name,
        refund_amount: intent.refund_amount,
        new_balance,
        notification_sent,
        notification_channel: channel.as_str().to_string(),
    })
}

/// The user record, created on first call.
pub async fn get_user(pool: &DbPool, config: &Config) -> Result<User, AppError> {
    store::users::ensure_default(pool, config).await
}

/// Current available balance, seeded on first lookup.
pub async fn get_balance(pool: &DbPool, config: &Config) -> Result<BalanceResponse, AppError> {
    let user = store::users::ensure_default(pool, config).await?;
    let balance =
        store::balances::get_or_create(pool, &user.user_id, config.initial_balance).await?;

    Ok(balance.into())
}

/// The user's active subscriptions, each paired with its fund.
pub async fn get_active_subscriptions(
    pool: &DbPool,
    config: &Config,
) -> Result<Vec<ActiveSubscription>, AppError> {
    let user = store::users::ensure_default(pool, config).await?;
    let subscriptions = store::subscriptions::list_active(pool, &user.user_id).await?;

    let mut entries = Vec::with_capacity(subscriptions.len());
    for subscription in subscriptions {
        match store::funds::get(pool, &subscription.fund_id).await? {
            Some(fund) => entries.push(ActiveSubscription { subscription, fund }),
            None => {
                // Only possible through operator intervention in the catalog.
                tracing::warn!(
                    fund_id = %subscription.fund_id,
                    "active subscription points at a missing fund"
                );
            }
        }
    }

    Ok(entries)
}

/// Latest transactions, newest first, enriched with fund names.
pub async fn get_transaction_history(
    pool: &DbPool,
    config: &Config,
    limit: i64,
) -> Result<Vec<TransactionResponse>, AppError> {
    let user = store::users::ensure_default(pool, config).await?;
    // A negative limit would reach the store as a negative LIMIT.
    let transactions =
        store::transactions::list_for_user(pool, &user.user_id, limit.max(0)).await?;

    let mut entries = Vec::with_capacity(transactions.len());
    for transaction in transactions {
        let fund_name = store::funds::get(pool, &transaction.fund_id)
            .await?
            .map(|fund| fund.name)
            .unwrap_or_else(|| UNKNOWN_FUND.to_string());
        entries.push(TransactionResponse::new(transaction, fund_name));
    }

    Ok(entries)
}

/// Debit `amount` from the balance with one compare-and-set retry.
///
/// The first attempt uses the snapshot the validation ran against. Losing
/// that write means someone moved the balance, so the retry re-reads and
/// re-checks the sufficiency guard before trying again. Losing twice is
/// surfaced as `ConcurrentModification`.
async fn debit_with_retry(
    pool: &DbPool,
    config: &Config,
    user_id: &str,
    amount: Decimal,
    snapshot_balance: Decimal,
) -> Result<Decimal, AppError> {
    let mut expected = snapshot_balance;
    let mut target = expected - amount;

    for attempt in 0..2 {
        if store::balances::update_if(pool, user_id, target, expected).await? {
            return Ok(target);
        }
        if attempt == 0 {
            let latest =
                store::balances::get_or_create(pool, user_id, config.initial_balance).await?;
            if latest.available_balance < amount {
                return Err(AppError::InsufficientBalance);
            }
            expected = latest.available_balance;
            target = expected - amount;
        }
    }

    tracing::error!(user_id, "balance debit lost its compare-and-set twice");
    Err(AppError::ConcurrentModification)
}

/// Credit `amount` back to the balance with one compare-and-set retry.
async fn credit_with_retry(
    pool: &DbPool,
    config: &Config,
    user_id: &str,
    amount: Decimal,
    snapshot_balance: Decimal,
) -> Result<Decimal, AppError> {
    let mut expected = snapshot_balance;
    let mut target = expected + amount;

    for attempt in 0..2 {
        if store::balances::update_if(pool, user_id, target, expected).await? {
            return Ok(target);
        }
        if attempt == 0 {
            let latest =
                store::balances::get_or_create(pool, user_id, config.initial_balance).await?;
            expected = latest.available_balance;
            target = expected + amount;
        }
    }

    tracing::error!(user_id, "balance credit lost its compare-and-set twice");
    Err(AppError::ConcurrentModification)
}

/// Append a FAILED transaction for a mutation that broke after validation.
///
/// Best-effort: the original error is what the caller reports, so a
/// failure here is only logged.
async fn record_failure(
    pool: &DbPool,
    user_id: &str,
    fund_id: &str,
    transaction_type: TransactionType,
    amount: Decimal,
) {
    if let Err(err) = store::transactions::append(
        pool,
        user_id,
        fund_id,
        transaction_type,
        amount,
        TransactionStatus::Failed,
    )
    .await
    {
        tracing::error!(user_id, fund_id, "could not record failed transaction: {err}");
    }
}

/// Resolve the channel, build the message and dispatch it. Never fails;
/// the bool says whether the gateway took the message.
async fn notify(
    pool: &DbPool,
    config: &Config,
    user: &User,
    transaction_type: TransactionType,
    transaction_id: Uuid,
    fund_name: &str,
    amount: Decimal,
    resulting_balance: Decimal,
) -> (bool, NotificationChannel) {
    let preferences = match store::preferences::get(pool, &user.user_id).await {
        Ok(preferences) => preferences,
        Err(err) => {
            tracing::warn!("could not load notification preferences: {err}");
            None
        }
    };

    let channel = notification::resolve_channel(preferences.as_ref(), config.default_channel());
    let message = notification::build_message(
        channel,
        &user.name,
        transaction_type,
        transaction_id,
        fund_name,
        amount,
        resulting_balance,
    );
    let sent = notification::dispatch(config, user, channel, &message, transaction_id).await;

    (sent, channel)
}
