//! Role-scoped loan projection
//!
//! The wire shape of a loan depends on the viewer: records carry that
//! viewer's permissions, and only the viewer's own secret key is echoed
//! back (labeled generically as `key`). A keyless view — the creation
//! response — exposes both keys so the creator can hand one to the
//! counter-party. Internal identifiers never leave the server.

use serde::Serialize;

use crate::loan::model::{AutopayConfig, Loan, Record};
use crate::loan::permissions::{record_permissions, RecordPermissions};

/// A record annotated with the viewer's permissions.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    #[serde(flatten)]
    pub record: Record,
    pub permissions: RecordPermissions,
}

/// The viewer-facing shape of a loan.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub is_lender: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lender_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrower_key: Option<String>,
    pub total: f64,
    pub autopay: AutopayConfig,
    pub records: Vec<RecordView>,
}

impl LoanView {
    /// Project a loan for a viewer. Records are ordered newest-first.
    pub fn project(loan: &Loan, key: Option<&str>, is_lender: bool) -> Self {
        let mut records: Vec<RecordView> = loan
            .records
            .iter()
            .map(|record| RecordView {
                record: record.clone(),
                permissions: record_permissions(is_lender, Some(record)),
            })
            .collect();
        records.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));

        let (key, lender_key, borrower_key) = match key {
            Some(_) if is_lender => (Some(loan.lender_key.clone()), None, None),
            Some(_) => (Some(loan.borrower_key.clone()), None, None),
            None => (
                None,
                Some(loan.lender_key.clone()),
                Some(loan.borrower_key.clone()),
            ),
        };

        Self {
            is_lender,
            key,
            lender_key,
            borrower_key,
            total: loan.total(),
            autopay: loan.autopay.clone(),
            records,
        }
    }
}
