//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Two families of errors exist:
///
/// - **Validation errors**: the client asked for something the current state
///   does not allow (unknown fund, inactive fund, duplicate subscription,
///   insufficient balance, no active subscription, invalid channel). These
///   map to 4xx responses with a specific reason code.
/// - **Persistence errors**: the store rejected or failed a write. A
///   conditional write that keeps losing its compare-and-set maps to
///   `ConcurrentModification`; anything else from sqlx maps to `Database`
///   and is reported to the client with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested fund id does not exist in the catalog.
    #[error("The requested fund does not exist")]
    FundNotFound,

    /// Fund exists but is not open for subscriptions.
    #[error("The fund is not available for subscriptions")]
    FundInactive,

    /// An active subscription to this fund already exists.
    #[error("An active subscription to this fund already exists")]
    DuplicateSubscription,

    /// Available balance is below the fund's minimum subscription amount.
    #[error("Insufficient balance to subscribe to this fund")]
    InsufficientBalance,

    /// Cancellation requested for a fund without an active subscription.
    #[error("No active subscription to this fund")]
    NoActiveSubscription,

    /// Notification channel is not one of "email" or "sms".
    #[error("Notification channel must be \"email\" or \"sms\"")]
    InvalidChannel,

    /// A conditional write lost its compare-and-set twice in a row.
    #[error("The record was modified concurrently, please retry")]
    ConcurrentModification,
}

/// Convert AppError into an HTTP response.
///
/// All errors share the response envelope used by the success path:
///
/// ```json
/// {
///   "success": false,
///   "error": "reason_code",
///   "message": "Human-readable error message"
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::FundNotFound => (StatusCode::NOT_FOUND, "fund_not_found", self.to_string()),
            AppError::FundInactive => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "fund_inactive",
                self.to_string(),
            ),
            AppError::DuplicateSubscription => (
                StatusCode::CONFLICT,
                "duplicate_subscription",
                self.to_string(),
            ),
            AppError::InsufficientBalance => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_balance",
                self.to_string(),
            ),
            AppError::NoActiveSubscription => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "no_active_subscription",
                self.to_string(),
            ),
            AppError::InvalidChannel => {
                (StatusCode::BAD_REQUEST, "invalid_channel", self.to_string())
            }
            AppError::ConcurrentModification => (
                StatusCode::CONFLICT,
                "concurrent_modification",
                self.to_string(),
            ),
            AppError::Database(ref err) => {
                // Full context stays in the log, never in the response.
                tracing::error!("database error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_client_statuses() {
        let cases = [
            (AppError::FundNotFound, StatusCode::NOT_FOUND),
            (AppError::FundInactive, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::DuplicateSubscription, StatusCode::CONFLICT),
            (AppError::InsufficientBalance, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::NoActiveSubscription, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::InvalidChannel, StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn concurrency_conflict_is_a_conflict() {
        assert_eq!(
            AppError::ConcurrentModification.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn database_errors_hide_details() {
        let response = AppError::Database(sqlx::Error::PoolClosed).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
