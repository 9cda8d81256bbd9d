//! Key-scoped loan session
//!
//! Binds a loan to the key it was looked up with, resolves the viewer's
//! role, and applies the permission-gated mutations. This is the only
//! place role resolution happens.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;
use crate::loan::autopay;
use crate::loan::model::{AutopayConfig, AutopayPeriod, Loan, Poster};
use crate::loan::permissions::record_permissions;
use crate::loan::view::LoanView;

/// A loan paired with the viewer's resolved role.
#[derive(Debug, Clone)]
pub struct LoanSession {
    pub loan: Loan,
    key: Option<String>,
    pub is_lender: bool,
}

impl LoanSession {
    /// Resolve the viewer role from the presented key.
    ///
    /// NOTE: an absent key resolves as lender. A freshly created loan
    /// has no requesting key and is presented from the lender's side;
    /// callers granting borrower-restricted access must always pass the
    /// real key.
    pub fn new(loan: Loan, key: Option<String>) -> Self {
        let is_lender = match &key {
            None => true,
            Some(k) => *k == loan.lender_key,
        };
        Self { loan, key, is_lender }
    }

    /// Post a record as the current viewer. Always appends; approval of
    /// the new record depends solely on the viewer's role.
    pub fn post(&mut self, memo: &str, amount: f64, now: DateTime<Utc>) -> Uuid {
        let poster = if self.is_lender {
            Poster::Lender
        } else {
            Poster::Borrower
        };
        self.loan.post(poster, memo, amount, now, now)
    }

    /// Approve a pending record posted by the counter-party.
    pub fn approve(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<(), ApiError> {
        let perms = record_permissions(self.is_lender, self.loan.record(id));
        let record = self
            .loan
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ApiError::RecordNotFound(id))?;
        if !perms.can_approve {
            return Err(ApiError::PermissionDenied("approve"));
        }
        record.approved = true;
        record.approved_on = Some(now);
        Ok(())
    }

    /// Remove a record. Lender-only, per the permission policy.
    pub fn delete(&mut self, id: Uuid) -> Result<(), ApiError> {
        let perms = record_permissions(self.is_lender, self.loan.record(id));
        if self.loan.record(id).is_none() {
            return Err(ApiError::RecordNotFound(id));
        }
        if !perms.can_delete {
            return Err(ApiError::PermissionDenied("delete"));
        }
        self.loan.records.retain(|r| r.id != id);
        Ok(())
    }

    /// Reconfigure the recurring payment. Lender-only; re-anchors
    /// `last_event` at the midnight preceding `now` so the first tick
    /// lands one full period out.
    pub fn update_autopay(
        &mut self,
        period: Option<AutopayPeriod>,
        value: i64,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        if !self.is_lender {
            return Err(ApiError::PermissionDenied("configure autopay on"));
        }
        match period {
            Some(AutopayPeriod::Daily) if value < 1 => {
                return Err(ApiError::Validation(
                    "daily autopay requires a day interval of at least 1".to_string(),
                ))
            }
            Some(AutopayPeriod::Weekly) if !(0..=6).contains(&value) => {
                return Err(ApiError::Validation(
                    "weekly autopay requires a weekday between 0 and 6".to_string(),
                ))
            }
            _ => {}
        }
        if !amount.is_finite() {
            return Err(ApiError::Validation("autopay amount must be finite".to_string()));
        }

        self.loan.autopay = AutopayConfig {
            last_event: autopay::midnight_utc(now),
            period,
            value,
            amount,
        };
        Ok(())
    }

    /// Replay missed autopay ticks. Returns how many records were posted.
    pub fn catch_up(&mut self, now: DateTime<Utc>) -> usize {
        autopay::catch_up(&mut self.loan, now)
    }

    /// Role-scoped projection of the loan for the current viewer.
    pub fn view(&self) -> LoanView {
        LoanView::project(&self.loan, self.key.as_deref(), self.is_lender)
    }
}
