//! Fund catalog model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// An investment fund from the catalog.
///
/// # Database Table
///
/// Maps to the `funds` table. The catalog is a fixed set of five funds
/// seeded by migration and read-only at runtime; `is_active` is the only
/// flag an operator would ever flip.
///
/// `minimum_amount` is both the entry threshold and the exact amount
/// debited when a subscription is opened.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Fund {
    /// Catalog identifier
    pub id: String,

    /// Display name of the fund
    pub name: String,

    /// Minimum subscription amount in COP
    pub minimum_amount: Decimal,

    /// Fund category: "FPV" (voluntary pension) or "FIC" (collective investment)
    pub category: String,

    /// Whether the fund accepts new subscriptions
    pub is_active: bool,

    /// When the fund was seeded
    pub created_at: DateTime<Utc>,
}
