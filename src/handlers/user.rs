//! User-scoped HTTP handlers: balance, subscriptions, history and
//! notification preferences.
//!
//! - GET /api/user               - user info
//! - GET /api/user/balance       - available balance
//! - GET /api/user/funds         - active subscriptions
//! - GET /api/user/transactions  - transaction history (?limit=N)
//! - GET /api/user/notifications - notification preferences
//! - PUT /api/user/notifications - update the preferred channel
//!
//! The service is single-tenant, so no path carries a user id; every
//! handler operates on the configured default user.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    AppState,
    error::AppError,
    models::balance::BalanceResponse,
    models::preferences::{PreferencesResponse, UpdatePreferencesRequest},
    models::subscription::ActiveSubscription,
    models::transaction::TransactionResponse,
    models::user::User,
    response::ApiResponse,
    services::{fund_service, notification},
};

/// Query parameters for the transaction history listing.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Maximum entries to return, newest first.
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    10
}

/// The system's user record.
pub async fn get_user(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = fund_service::get_user(&state.pool, &state.config).await?;
    let message = format!("User {}", user.name);

    Ok(Json(ApiResponse::ok(user, message)))
}

/// Current available balance.
pub async fn get_balance(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BalanceResponse>>, AppError> {
    let balance = fund_service::get_balance(&state.pool, &state.config).await?;

    Ok(Json(ApiResponse::ok(balance, "Balance retrieved")))
}

/// Funds the user is currently subscribed to, with the subscription record
/// for each.
pub async fn get_active_funds(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ActiveSubscription>>>, AppError> {
    let entries = fund_service::get_active_subscriptions(&state.pool, &state.config).await?;
    let message = format!("Found {} active funds", entries.len());

    Ok(Json(ApiResponse::ok(entries, message)))
}

/// Transaction history, newest first.
pub async fn get_transactions(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, AppError> {
    let entries =
        fund_service::get_transaction_history(&state.pool, &state.config, params.limit).await?;
    let message = format!("Found {} transactions", entries.len());

    Ok(Json(ApiResponse::ok(entries, message)))
}

/// Current notification preferences (the configured default when the user
/// never set any).
pub async fn get_preferences(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PreferencesResponse>>, AppError> {
    let preferences = notification::get_preferences(&state.pool, &state.config).await?;
    let message = format!("Notification channel: {}", preferences.channel);

    Ok(Json(ApiResponse::ok(preferences, message)))
}

/// Update the preferred notification channel.
///
/// # Request Body
///
/// ```json
/// { "channel": "sms" }
/// ```
///
/// # Errors
///
/// 400 when the channel is not "email" or "sms"; the stored preference is
/// left untouched in that case.
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<ApiResponse<PreferencesResponse>>, AppError> {
    let preferences =
        notification::update_preferences(&state.pool, &state.config, &request.channel).await?;
    let message = format!("Preferences updated to {}", preferences.channel);

    Ok(Json(ApiResponse::ok(preferences, message)))
}
