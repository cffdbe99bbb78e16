//! Validation engine: the business preconditions for every mutating
//! operation.
//!
//! These are pure functions over state snapshots. The caller loads the
//! fund, the existing subscription record and the current balance, hands
//! them in, and gets back either a validated intent (what to debit or
//! refund, and where the balance lands) or the specific rejection. Nothing
//! here touches the store or the transport, which is what makes the rules
//! testable in isolation.

use rust_decimal::Decimal;

use crate::error::AppError;
use crate::models::fund::Fund;
use crate::models::preferences::NotificationChannel;
use crate::models::subscription::Subscription;

/// Validated subscribe intent.
///
/// `amount` is always the fund's minimum subscription amount; the fund
/// rides along because the orchestrator needs its name and id afterwards.
#[derive(Debug, Clone)]
pub struct SubscriptionIntent {
    pub fund: Fund,
    pub amount: Decimal,
    pub resulting_balance: Decimal,
}

/// Validated cancel intent. The refund is exactly the invested amount.
#[derive(Debug, Clone)]
pub struct CancellationIntent {
    pub fund: Fund,
    pub refund_amount: Decimal,
    pub resulting_balance: Decimal,
}

/// Check whether a subscription may be opened.
///
/// Rejections, in order of precedence:
/// `FundNotFound`, `FundInactive`, `DuplicateSubscription` (an active
/// record already exists for the pair), `InsufficientBalance` (available
/// balance below the fund minimum).
pub fn validate_subscription(
    fund: Option<Fund>,
    subscription: Option<&Subscription>,
    available_balance: Decimal,
) -> Result<SubscriptionIntent, AppError> {
    let fund = fund.ok_or(AppError::FundNotFound)?;

    if !fund.is_active {
        return Err(AppError::FundInactive);
    }

    if subscription.is_some_and(|record| record.active) {
        return Err(AppError::DuplicateSubscription);
    }

    if available_balance < fund.minimum_amount {
        return Err(AppError::InsufficientBalance);
    }

    let amount = fund.minimum_amount;
    Ok(SubscriptionIntent {
        amount,
        resulting_balance: available_balance - amount,
        fund,
    })
}

/// Check whether a subscription may be cancelled.
///
/// Rejections: `FundNotFound`, then `NoActiveSubscription` when the pair
/// has no record or only an inactive one.
pub fn validate_cancellation(
    fund: Option<Fund>,
    subscription: Option<&Subscription>,
    available_balance: Decimal,
) -> Result<CancellationIntent, AppError> {
    let fund = fund.ok_or(AppError::FundNotFound)?;

    let subscription = subscription
        .filter(|record| record.active)
        .ok_or(AppError::NoActiveSubscription)?;

    let refund_amount = subscription.invested_amount;
    Ok(CancellationIntent {
        fund,
        refund_amount,
        resulting_balance: available_balance + refund_amount,
    })
}

/// Check a requested notification channel. Idempotent by construction:
/// re-validating the current channel succeeds the same way.
pub fn validate_channel(raw: &str) -> Result<NotificationChannel, AppError> {
    NotificationChannel::parse(raw).ok_or(AppError::InvalidChannel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn fund(minimum: Decimal, active: bool) -> Fund {
        Fund {
            id: "1".to_string(),
            name: "FPV_EL CLIENTE_RECAUDADORA".to_string(),
            minimum_amount: minimum,
            category: "FPV".to_string(),
            is_active: active,
            created_at: Utc::now(),
        }
    }

    fn subscription(active: bool, invested: Decimal) -> Subscription {
        Subscription {
            user_id: "user_default".to_string(),
            fund_id: "1".to_string(),
            active,
            subscription_amount: invested,
            invested_amount: invested,
            subscribed_at: Utc::now(),
            cancelled_at: if active { None } else { Some(Utc::now()) },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn subscription_debits_exactly_the_minimum_amount() {
        let intent =
            validate_subscription(Some(fund(dec!(75000), true)), None, dec!(500000)).unwrap();

        assert_eq!(intent.amount, dec!(75000));
        assert_eq!(intent.resulting_balance, dec!(425000));
    }

    #[test]
    fn subscription_fails_for_unknown_fund() {
        let err = validate_subscription(None, None, dec!(500000)).unwrap_err();
        assert!(matches!(err, AppError::FundNotFound));
    }

    #[test]
    fn subscription_fails_for_inactive_fund() {
        let err =
            validate_subscription(Some(fund(dec!(75000), false)), None, dec!(500000)).unwrap_err();
        assert!(matches!(err, AppError::FundInactive));
    }

    #[test]
    fn subscription_fails_when_already_subscribed() {
        let existing = subscription(true, dec!(75000));
        let err = validate_subscription(Some(fund(dec!(75000), true)), Some(&existing), dec!(500000))
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSubscription));
    }

    #[test]
    fn cancelled_subscription_does_not_block_resubscribing() {
        let cancelled = subscription(false, dec!(0));
        let intent =
            validate_subscription(Some(fund(dec!(75000), true)), Some(&cancelled), dec!(500000))
                .unwrap();
        assert_eq!(intent.resulting_balance, dec!(425000));
    }

    #[test]
    fn subscription_fails_on_insufficient_balance() {
        let err =
            validate_subscription(Some(fund(dec!(125000), true)), None, dec!(100000)).unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance));
    }

    #[test]
    fn exact_minimum_balance_is_enough() {
        let intent =
            validate_subscription(Some(fund(dec!(250000), true)), None, dec!(250000)).unwrap();
        assert_eq!(intent.resulting_balance, dec!(0));
    }

    #[test]
    fn one_peso_short_is_rejected() {
        let err =
            validate_subscription(Some(fund(dec!(75000), true)), None, dec!(74999)).unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance));
    }

    #[test]
    fn fractional_amounts_keep_their_precision() {
        let intent =
            validate_subscription(Some(fund(dec!(75000.50), true)), None, dec!(100000.75)).unwrap();
        assert_eq!(intent.resulting_balance, dec!(25000.25));
    }

    #[test]
    fn cancellation_refunds_the_invested_amount() {
        let existing = subscription(true, dec!(75000));
        let intent =
            validate_cancellation(Some(fund(dec!(75000), true)), Some(&existing), dec!(425000))
                .unwrap();

        assert_eq!(intent.refund_amount, dec!(75000));
        assert_eq!(intent.resulting_balance, dec!(500000));
    }

    #[test]
    fn cancellation_fails_for_unknown_fund() {
        let err = validate_cancellation(None, None, dec!(500000)).unwrap_err();
        assert!(matches!(err, AppError::FundNotFound));
    }

    #[test]
    fn cancellation_fails_without_a_subscription() {
        let err =
            validate_cancellation(Some(fund(dec!(75000), true)), None, dec!(500000)).unwrap_err();
        assert!(matches!(err, AppError::NoActiveSubscription));
    }

    #[test]
    fn cancellation_fails_when_already_cancelled() {
        let cancelled = subscription(false, dec!(0));
        let err =
            validate_cancellation(Some(fund(dec!(75000), true)), Some(&cancelled), dec!(500000))
                .unwrap_err();
        assert!(matches!(err, AppError::NoActiveSubscription));
    }

    #[test]
    fn subscribe_then_cancel_restores_the_original_balance() {
        // The scenario from the service's acceptance checklist:
        // 500000 - 75000 = 425000, then the refund brings it back.
        let open = validate_subscription(Some(fund(dec!(75000), true)), None, dec!(500000)).unwrap();
        assert_eq!(open.resulting_balance, dec!(425000));

        let record = subscription(true, open.amount);
        let close = validate_cancellation(
            Some(fund(dec!(75000), true)),
            Some(&record),
            open.resulting_balance,
        )
        .unwrap();

        assert_eq!(close.refund_amount, dec!(75000));
        assert_eq!(close.resulting_balance, dec!(500000));
    }

    #[test]
    fn channel_validation_accepts_email_and_sms_only() {
        assert_eq!(
            validate_channel("email").unwrap(),
            NotificationChannel::Email
        );
        assert_eq!(validate_channel("sms").unwrap(), NotificationChannel::Sms);
        assert!(matches!(
            validate_channel("push").unwrap_err(),
            AppError::InvalidChannel
        ));
    }
}
