//! Loan endpoint handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::ApiResult;
use crate::loan::model::AutopayPeriod;
use crate::loan::LoanView;

/// Create a new loan. The response carries both secret keys; the caller
/// keeps the lender key and hands the borrower key to the counter-party.
pub async fn create_loan(State(app_state): State<AppState>) -> ApiResult<Json<LoanView>> {
    let view = app_state.loan_service.create_loan().await?;
    Ok(Json(view))
}

/// Get a loan by either secret key. Missed autopay ticks are replayed
/// before the view is built.
pub async fn get_loan(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<LoanView>> {
    let view = app_state.loan_service.get_loan(&key).await?;
    Ok(Json(view))
}

/// Request to reconfigure the recurring payment
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAutopayRequest {
    pub period: Option<AutopayPeriod>,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub amount: f64,
}

/// Configure autopay on a loan (lender only).
pub async fn update_autopay(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<UpdateAutopayRequest>,
) -> ApiResult<Json<LoanView>> {
    let view = app_state
        .loan_service
        .update_autopay(&key, request.period, request.value, request.amount)
        .await?;
    Ok(Json(view))
}
