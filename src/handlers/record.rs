//! Record endpoint handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::loan::{LoanView, RecordView};

/// Request to post a new record
#[derive(Debug, Deserialize)]
pub struct PostRecordRequest {
    pub memo: String,
    pub amount: f64,
}

impl PostRecordRequest {
    /// Validate request
    pub fn validate(&self) -> Result<(), String> {
        if self.memo.trim().is_empty() {
            return Err("memo is required".to_string());
        }
        if !self.amount.is_finite() {
            return Err("amount must be a finite number".to_string());
        }
        Ok(())
    }
}

/// Post a new record to the loan resolved from `key`.
pub async fn post_record(
    State(app_state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<PostRecordRequest>,
) -> ApiResult<Json<LoanView>> {
    request.validate().map_err(ApiError::Validation)?;
    let view = app_state
        .loan_service
        .post_record(&key, &request.memo, request.amount)
        .await?;
    Ok(Json(view))
}

/// Get a single record with the viewer's permissions.
pub async fn get_record(
    State(app_state): State<AppState>,
    Path((key, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<RecordView>> {
    let record = app_state.loan_service.get_record(&key, id).await?;
    Ok(Json(record))
}

/// Approve a pending record (counter-party only).
pub async fn approve_record(
    State(app_state): State<AppState>,
    Path((key, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<LoanView>> {
    let view = app_state.loan_service.approve_record(&key, id).await?;
    Ok(Json(view))
}

/// Delete a record (lender only).
pub async fn delete_record(
    State(app_state): State<AppState>,
    Path((key, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<LoanView>> {
    let view = app_state.loan_service.delete_record(&key, id).await?;
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_request_requires_memo() {
        let request = PostRecordRequest {
            memo: "   ".to_string(),
            amount: 10.0,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn post_request_rejects_non_finite_amount() {
        let request = PostRecordRequest {
            memo: "gas".to_string(),
            amount: f64::NAN,
        };
        assert!(request.validate().is_err());

        let request = PostRecordRequest {
            memo: "gas".to_string(),
            amount: f64::INFINITY,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn post_request_accepts_negative_amounts() {
        let request = PostRecordRequest {
            memo: "repayment".to_string(),
            amount: -120.5,
        };
        assert!(request.validate().is_ok());
    }
}
