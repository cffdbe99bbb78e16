//! Fund catalog and subscription HTTP handlers.
//!
//! - GET  /api/funds                     - list funds open for subscription
//! - GET  /api/funds/{fund_id}           - fund details
//! - POST /api/funds/{fund_id}/subscribe - open a subscription
//! - POST /api/funds/{fund_id}/cancel    - cancel a subscription

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::AppError,
    models::fund::Fund,
    models::transaction::{CancellationReceipt, SubscriptionReceipt},
    response::ApiResponse,
    services::fund_service,
    store,
};

/// List all funds currently open for subscription.
pub async fn list_funds(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Fund>>>, AppError> {
    let funds = store::funds::list_active(&state.pool).await?;
    let message = format!("Found {} available funds", funds.len());

    Ok(Json(ApiResponse::ok(funds, message)))
}

/// Fund details by id.
///
/// # Response
///
/// - **200 OK**: the fund
/// - **404**: unknown fund id
pub async fn get_fund(
    State(state): State<AppState>,
    Path(fund_id): Path<String>,
) -> Result<Json<ApiResponse<Fund>>, AppError> {
    let fund = store::funds::get(&state.pool, &fund_id)
        .await?
        .ok_or(AppError::FundNotFound)?;

    Ok(Json(ApiResponse::ok(fund, "Fund found")))
}

/// Subscribe to a fund.
///
/// The debited amount is always the fund's minimum subscription amount.
///
/// # Response (201 Created)
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "transaction_id": "770e8400-e29b-41d4-a716-446655440002",
///     "fund_name": "FPV_EL CLIENTE_RECAUDADORA",
///     "amount": "75000.00",
///     "new_balance": "425000.00",
///     "notification_sent": true,
///     "notification_channel": "email"
///   },
///   "message": "Successfully subscribed to FPV_EL CLIENTE_RECAUDADORA"
/// }
/// ```
///
/// # Errors
///
/// 404 unknown fund, 422 inactive fund or insufficient balance,
/// 409 duplicate subscription or concurrent modification.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(fund_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<SubscriptionReceipt>>), AppError> {
    let receipt = fund_service::subscribe(&state.pool, &state.config, &fund_id).await?;
    let message = format!("Successfully subscribed to {}", receipt.fund_name);

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(receipt, message))))
}

/// Cancel an active subscription, refunding the invested amount.
///
/// # Errors
///
/// 404 unknown fund, 422 no active subscription,
/// 409 concurrent modification.
pub async fn cancel(
    State(state): State<AppState>,
    Path(fund_id): Path<String>,
) -> Result<Json<ApiResponse<CancellationReceipt>>, AppError> {
    let receipt = fund_service::cancel(&state.pool, &state.config, &fund_id).await?;
    let message = format!("Successfully cancelled {}", receipt.fund_name);

    Ok(Json(ApiResponse::ok(receipt, message)))
}
