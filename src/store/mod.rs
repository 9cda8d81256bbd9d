//! In-memory loan store
//!
//! Loans are looked up by either secret key and saved with a
//! compare-and-swap version check. Concurrent writers to the same loan
//! both load, mutate, and save; the version check makes the second save
//! fail instead of silently clobbering the first, and the service layer
//! retries its (idempotent) computation on conflict.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::loan::Loan;

/// Store failure modes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("loan version conflict, reload and retry")]
    VersionConflict,

    #[error("loan {0} does not exist")]
    UnknownLoan(Uuid),
}

/// A loan together with the store revision it was loaded at.
#[derive(Debug, Clone)]
pub struct VersionedLoan {
    pub loan: Loan,
    pub version: u64,
}

#[derive(Default)]
struct Inner {
    loans: HashMap<Uuid, (u64, Loan)>,
    // Secret key -> loan id, covering both keys of every loan.
    keys: HashMap<String, Uuid>,
}

/// Shared in-memory loan store.
#[derive(Clone, Default)]
pub struct LoanStore {
    inner: Arc<RwLock<Inner>>,
}

impl LoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created loan at version 1.
    pub async fn insert(&self, loan: Loan) -> VersionedLoan {
        let mut inner = self.inner.write().await;
        inner.keys.insert(loan.lender_key.clone(), loan.id);
        inner.keys.insert(loan.borrower_key.clone(), loan.id);
        inner.loans.insert(loan.id, (1, loan.clone()));
        VersionedLoan { loan, version: 1 }
    }

    /// Find a loan by either of its secret keys.
    pub async fn find_by_either_key(&self, key: &str) -> Option<VersionedLoan> {
        let inner = self.inner.read().await;
        let id = inner.keys.get(key)?;
        let (version, loan) = inner.loans.get(id)?;
        Some(VersionedLoan {
            loan: loan.clone(),
            version: *version,
        })
    }

    /// Whether any loan already uses this secret key.
    pub async fn key_exists(&self, key: &str) -> bool {
        self.inner.read().await.keys.contains_key(key)
    }

    /// Save a loan, succeeding only if the stored version still matches
    /// `expected_version`. Returns the new version on success.
    pub async fn save(&self, loan: Loan, expected_version: u64) -> Result<VersionedLoan, StoreError> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .loans
            .get_mut(&loan.id)
            .ok_or(StoreError::UnknownLoan(loan.id))?;
        if entry.0 != expected_version {
            return Err(StoreError::VersionConflict);
        }
        entry.0 += 1;
        entry.1 = loan.clone();
        let version = entry.0;
        Ok(VersionedLoan { loan, version })
    }
}
