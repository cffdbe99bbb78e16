//! Fund subscription model and API response types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::fund::Fund;

/// A user's association with a fund.
///
/// # Database Table
///
/// Maps to the `user_funds` table, keyed by (`user_id`, `fund_id`). At most
/// one row exists per pair; cancelling flips `active` off and re-subscribing
/// reactivates the same row instead of inserting a duplicate.
///
/// `invested_amount` is the amount debited when the subscription was opened.
/// It is refunded in full on cancellation and zeroed at that moment, so an
/// inactive row never carries stale money.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Subscription {
    pub user_id: String,
    pub fund_id: String,

    /// Whether the subscription is currently open
    pub active: bool,

    /// Amount the user subscribed with
    pub subscription_amount: Decimal,

    /// Amount currently invested; zero on inactive rows
    pub invested_amount: Decimal,

    pub subscribed_at: DateTime<Utc>,

    /// Set when the subscription was last cancelled, cleared on reactivation
    pub cancelled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of the active-subscriptions listing: the subscription record
/// together with the fund it points at.
///
/// ```json
/// {
///   "subscription": { "user_id": "user_default", "fund_id": "1", "active": true, ... },
///   "fund": { "id": "1", "name": "FPV_EL CLIENTE_RECAUDADORA", ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ActiveSubscription {
    pub subscription: Subscription,
    pub fund: Fund,
}
