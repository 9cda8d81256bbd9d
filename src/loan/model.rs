//! Loan and record models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::loan::autopay;

/// Who created a record.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Poster {
    Lender,
    Borrower,
    Autopay,
}

/// A single ledger entry. Immutable once approved; only the approval
/// fields ever change after creation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub poster: Poster,
    pub approved: bool,
    pub memo: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_on: Option<DateTime<Utc>>,
}

impl Record {
    /// Build a new record. A record posted by a party acting in its own
    /// authoritative role (or by autopay) is approved at creation, with
    /// `approved_on` set to `now`; otherwise it awaits counter-party
    /// approval.
    pub fn new(
        poster: Poster,
        memo: impl Into<String>,
        amount: f64,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        // Lender-posted records are self-approved; autopay records are
        // pre-approved. Borrower posts wait for the lender.
        let approved = !matches!(poster, Poster::Borrower);
        Self {
            id: Uuid::new_v4(),
            poster,
            approved,
            memo: memo.into(),
            amount,
            created_at,
            approved_on: approved.then_some(now),
        }
    }
}

/// Autopay schedule period.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AutopayPeriod {
    Daily,
    Weekly,
}

/// Recurring-payment configuration.
///
/// `last_event` is always truncated to 00:00:00 UTC and only ever moves
/// forward. For `Daily`, `value` is the number of days between ticks;
/// for `Weekly`, the target weekday (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutopayConfig {
    pub last_event: DateTime<Utc>,
    pub period: Option<AutopayPeriod>,
    pub value: i64,
    pub amount: f64,
}

impl AutopayConfig {
    /// Disabled autopay anchored at the midnight preceding `now`.
    pub fn disabled(now: DateTime<Utc>) -> Self {
        Self {
            last_event: autopay::midnight_utc(now),
            period: None,
            value: 0,
            amount: 0.0,
        }
    }
}

/// The shared two-party ledger aggregate.
///
/// `id` is the store key and never leaves the server; the two secret
/// keys are the only external identifiers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Loan {
    pub id: Uuid,
    pub lender_key: String,
    pub borrower_key: String,
    pub records: Vec<Record>,
    pub autopay: AutopayConfig,
}

impl Loan {
    /// Create an empty loan with the given secret keys.
    pub fn new(lender_key: String, borrower_key: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            lender_key,
            borrower_key,
            records: Vec::new(),
            autopay: AutopayConfig::disabled(now),
        }
    }

    /// Running balance: the sum of approved record amounts. Unapproved
    /// records never contribute.
    pub fn total(&self) -> f64 {
        self.records
            .iter()
            .filter(|r| r.approved)
            .map(|r| r.amount)
            .sum()
    }

    /// Look up a record by id.
    pub fn record(&self, id: Uuid) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Append a new record. Never touches existing records.
    pub fn post(
        &mut self,
        poster: Poster,
        memo: impl Into<String>,
        amount: f64,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Uuid {
        let record = Record::new(poster, memo, amount, created_at, now);
        let id = record.id;
        self.records.push(record);
        id
    }
}
