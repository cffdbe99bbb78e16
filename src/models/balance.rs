//! User balance model and COP amount formatting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Available balance of a user.
///
/// # Database Table
///
/// Maps to the `user_balances` table. The row is created lazily with the
/// configured seed balance on first lookup and then mutated by every
/// subscribe (debit) and cancel (credit) through conditional updates.
/// The database enforces that the balance never goes negative.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct UserBalance {
    pub user_id: String,

    /// Current available balance in COP
    pub available_balance: Decimal,

    pub created_at: DateTime<Utc>,

    /// Timestamp of the last balance mutation
    pub updated_at: DateTime<Utc>,
}

/// Response body for the balance endpoint.
///
/// ```json
/// {
///   "user_id": "user_default",
///   "available_balance": "425000.00",
///   "formatted_balance": "COP $425,000.00",
///   "updated_at": "2025-08-01T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user_id: String,
    pub available_balance: Decimal,
    pub formatted_balance: String,
    pub updated_at: DateTime<Utc>,
}

impl From<UserBalance> for BalanceResponse {
    fn from(balance: UserBalance) -> Self {
        Self {
            user_id: balance.user_id,
            formatted_balance: format_cop(balance.available_balance),
            available_balance: balance.available_balance,
            updated_at: balance.updated_at,
        }
    }
}

/// Format an amount for display: `COP $1,234,567.89`.
///
/// Two decimal places, thousands grouped with commas.
pub fn format_cop(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("COP ${sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn formats_thousands_and_decimals() {
        assert_eq!(format_cop(dec!(500000)), "COP $500,000.00");
        assert_eq!(format_cop(dec!(1250000.50)), "COP $1,250,000.50");
        assert_eq!(format_cop(dec!(75000)), "COP $75,000.00");
    }

    #[test]
    fn formats_small_and_zero_amounts() {
        assert_eq!(format_cop(dec!(0)), "COP $0.00");
        assert_eq!(format_cop(dec!(999.9)), "COP $999.90");
        assert_eq!(format_cop(dec!(1000)), "COP $1,000.00");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(format_cop(dec!(123456.789)), "COP $123,456.79");
    }

    #[test]
    fn keeps_the_sign_in_front_of_the_digits() {
        assert_eq!(format_cop(dec!(-1234.5)), "COP $-1,234.50");
    }
}
