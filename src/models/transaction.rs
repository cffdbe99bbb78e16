//! Transaction audit records and operation receipts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::balance::format_cop;

/// Type of a balance-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Subscription,
    Cancellation,
}

impl TransactionType {
    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Subscription => "SUBSCRIPTION",
            TransactionType::Cancellation => "CANCELLATION",
        }
    }

    /// Human label used in history listings and notification messages.
    pub fn display(self) -> &'static str {
        match self {
            TransactionType::Subscription => "Subscription",
            TransactionType::Cancellation => "Cancellation",
        }
    }
}

/// Lifecycle state of a transaction record.
///
/// Every record is appended as `Pending` and finalized exactly once, to
/// `Completed` when the operation's store mutations went through or to
/// `Failed` when one of them did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        }
    }
}

/// An immutable audit record of a balance-affecting event.
///
/// # Database Table
///
/// Maps to the `transactions` table. Append-only: after creation only
/// `status` (once, away from PENDING) and `notification_sent` (once, to
/// true) are ever written.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    /// Unique identifier for this transaction
    pub id: Uuid,

    pub user_id: String,
    pub fund_id: String,

    /// "SUBSCRIPTION" or "CANCELLATION"
    pub transaction_type: String,

    /// Amount moved, always positive; direction follows the type
    pub amount: Decimal,

    /// "PENDING", "COMPLETED" or "FAILED"
    pub status: String,

    /// Whether a notification was dispatched for this transaction
    pub notification_sent: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// History entry returned to clients, enriched with the fund name.
///
/// ```json
/// {
///   "id": "770e8400-e29b-41d4-a716-446655440002",
///   "fund_id": "1",
///   "fund_name": "FPV_EL CLIENTE_RECAUDADORA",
///   "transaction_type": "SUBSCRIPTION",
///   "amount": "75000.00",
///   "formatted_amount": "COP $75,000.00",
///   "status": "COMPLETED",
///   "notification_sent": true,
///   "created_at": "2025-08-01T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub fund_id: String,
    pub fund_name: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub formatted_amount: String,
    pub status: String,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl TransactionResponse {
    pub fn new(transaction: Transaction, fund_name: String) -> Self {
        Self {
            id: transaction.id,
            fund_id: transaction.fund_id,
            fund_name,
            transaction_type: transaction.transaction_type,
            formatted_amount: format_cop(transaction.amount),
            amount: transaction.amount,
            status: transaction.status,
            notification_sent: transaction.notification_sent,
            created_at: transaction.created_at,
        }
    }
}

/// Result of a successful subscribe operation.
#[derive(Debug, Serialize)]
pub struct SubscriptionReceipt {
    pub transaction_id: Uuid,
    pub fund_name: String,
    pub amount: Decimal,
    pub new_balance: Decimal,
    pub notification_sent: bool,
    pub notification_channel: String,
}

/// Result of a successful cancel operation.
#[derive(Debug, Serialize)]
pub struct CancellationReceipt {
    pub transaction_id: Uuid,
    pub fund_name: String,
    pub refund_amount: Decimal,
    pub new_balance: Decimal,
    pub notification_sent: bool,
    pub notification_channel: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_and_status_round_trip_their_stored_form() {
        assert_eq!(TransactionType::Subscription.as_str(), "SUBSCRIPTION");
        assert_eq!(TransactionType::Cancellation.as_str(), "CANCELLATION");
        assert_eq!(TransactionStatus::Pending.as_str(), "PENDING");
        assert_eq!(TransactionStatus::Completed.as_str(), "COMPLETED");
        assert_eq!(TransactionStatus::Failed.as_str(), "FAILED");
    }

    #[test]
    fn display_labels_are_readable() {
        assert_eq!(TransactionType::Subscription.display(), "Subscription");
        assert_eq!(TransactionType::Cancellation.display(), "Cancellation");
    }
}
