//! Loan service layer - business logic for the loan ledger
//!
//! Every key-resolved operation runs as load -> autopay catch-up ->
//! mutate -> compare-and-swap save. A version conflict means another
//! writer committed in between; the whole computation is recomputed from
//! the fresh state, which also keeps autopay catch-up exactly-once (two
//! racing readers cannot both commit records for the same tick).

use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{ApiError, ApiResult};
use crate::keygen;
use crate::loan::model::AutopayPeriod;
use crate::loan::{Loan, LoanSession, LoanView, RecordView};
use crate::store::{LoanStore, StoreError};

/// Attempts before a key-generation collision loop is reported as an
/// error rather than retried.
const MAX_KEYGEN_ATTEMPTS: u32 = 32;

/// Save retries on version conflict before giving up.
const MAX_SAVE_RETRIES: u32 = 4;

/// Loan service wiring the store and clock behind the HTTP handlers.
#[derive(Clone)]
pub struct LoanService {
    store: LoanStore,
    clock: Arc<dyn Clock>,
}

impl LoanService {
    pub fn new(store: LoanStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Create a new loan with two fresh unique keys. The response view
    /// is keyless and therefore carries both keys, so the creator can
    /// hand one to the counter-party.
    pub async fn create_loan(&self) -> ApiResult<LoanView> {
        let lender_key = self.generate_unique_key().await?;
        let borrower_key = self.generate_unique_key().await?;
        let loan = Loan::new(lender_key, borrower_key, self.clock.now());
        let versioned = self.store.insert(loan).await;

        tracing::info!(loan_id = %versioned.loan.id, "Created loan");
        Ok(LoanSession::new(versioned.loan, None).view())
    }

    /// Resolve a loan by key, replaying any missed autopay ticks first.
    pub async fn get_loan(&self, key: &str) -> ApiResult<LoanView> {
        self.with_loan(key, |_| Ok(())).await
    }

    /// Post a record as the viewer resolved from `key`.
    pub async fn post_record(&self, key: &str, memo: &str, amount: f64) -> ApiResult<LoanView> {
        let now = self.clock.now();
        self.with_loan(key, move |session| {
            session.post(memo, amount, now);
            Ok(())
        })
        .await
    }

    /// Fetch a single record, annotated with the viewer's permissions.
    pub async fn get_record(&self, key: &str, id: Uuid) -> ApiResult<RecordView> {
        // Read path still runs catch-up, matching the loan lookup.
        let view = self.get_loan(key).await?;
        view.records
            .into_iter()
            .find(|r| r.record.id == id)
            .ok_or(ApiError::RecordNotFound(id))
    }

    /// Approve a pending record as the viewer resolved from `key`.
    pub async fn approve_record(&self, key: &str, id: Uuid) -> ApiResult<LoanView> {
        let now = self.clock.now();
        self.with_loan(key, move |session| session.approve(id, now))
            .await
    }

    /// Delete a record as the viewer resolved from `key`.
    pub async fn delete_record(&self, key: &str, id: Uuid) -> ApiResult<LoanView> {
        self.with_loan(key, move |session| session.delete(id)).await
    }

    /// Reconfigure autopay (lender-only).
    pub async fn update_autopay(
        &self,
        key: &str,
        period: Option<AutopayPeriod>,
        value: i64,
        amount: f64,
    ) -> ApiResult<LoanView> {
        let now = self.clock.now();
        self.with_loan(key, move |session| {
            session.update_autopay(period, value, amount, now)
        })
        .await
    }

    /// Load the loan for `key`, run autopay catch-up, apply `mutate`,
    /// and save if anything changed. On a version conflict the entire
    /// computation is retried against the fresh state; business failures
    /// from `mutate` abort without saving.
    async fn with_loan<F>(&self, key: &str, mutate: F) -> ApiResult<LoanView>
    where
        F: Fn(&mut LoanSession) -> Result<(), ApiError>,
    {
        for _ in 0..=MAX_SAVE_RETRIES {
            let versioned = self
                .store
                .find_by_either_key(key)
                .await
                .ok_or_else(|| ApiError::LoanNotFound(key.to_string()))?;
            let before = versioned.loan.clone();

            let mut session = LoanSession::new(versioned.loan, Some(key.to_string()));
            let posted = session.catch_up(self.clock.now());
            if posted > 0 {
                tracing::info!(loan_id = %session.loan.id, posted, "Autopay catch-up posted records");
            }
            mutate(&mut session)?;

            if session.loan == before {
                return Ok(session.view());
            }

            match self.store.save(session.loan.clone(), versioned.version).await {
                Ok(_) => return Ok(session.view()),
                Err(StoreError::VersionConflict) => {
                    tracing::debug!(loan_id = %session.loan.id, "Save conflict, retrying");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(ApiError::Store("save retries exhausted".to_string()))
    }

    /// Generate a key no existing loan uses, with a bounded retry loop.
    async fn generate_unique_key(&self) -> ApiResult<String> {
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            let key = keygen::random_key();
            if !self.store.key_exists(&key).await {
                return Ok(key);
            }
        }
        Err(ApiError::KeyGenerationExhausted(MAX_KEYGEN_ATTEMPTS))
    }
}
