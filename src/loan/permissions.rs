//! Record permission policy
//!
//! Pure mapping from (viewer role, record) to what the viewer may do.
//! Approval is strictly cross-party: each side signs off on the other's
//! postings. Deletion is a lender-only power over every record.

use serde::Serialize;

use crate::loan::model::{Poster, Record};

/// What the current viewer may do with a record.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordPermissions {
    pub can_approve: bool,
    pub can_delete: bool,
}

/// Compute the viewer's permissions for a record.
///
/// A missing record grants nothing. Autopay records are created approved
/// and therefore never approvable.
pub fn record_permissions(viewer_is_lender: bool, record: Option<&Record>) -> RecordPermissions {
    let Some(record) = record else {
        return RecordPermissions {
            can_approve: false,
            can_delete: false,
        };
    };

    let can_approve = !record.approved
        && match record.poster {
            Poster::Borrower => viewer_is_lender,
            Poster::Lender => !viewer_is_lender,
            Poster::Autopay => false,
        };

    RecordPermissions {
        can_approve,
        can_delete: viewer_is_lender,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::model::Record;
    use chrono::{TimeZone, Utc};

    fn record(poster: Poster) -> Record {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        Record::new(poster, "memo", 10.0, now, now)
    }

    #[test]
    fn lender_can_delete_any_record() {
        for poster in [Poster::Lender, Poster::Borrower, Poster::Autopay] {
            let perms = record_permissions(true, Some(&record(poster)));
            assert!(perms.can_delete, "lender should delete {poster:?} records");
        }
    }

    #[test]
    fn borrower_can_never_delete() {
        for poster in [Poster::Lender, Poster::Borrower, Poster::Autopay] {
            let perms = record_permissions(false, Some(&record(poster)));
            assert!(!perms.can_delete);
        }
    }

    #[test]
    fn approval_is_cross_party_only() {
        let pending = record(Poster::Borrower);
        assert!(record_permissions(true, Some(&pending)).can_approve);
        assert!(!record_permissions(false, Some(&pending)).can_approve);

        let lender_posted = record(Poster::Lender);
        // Already approved at creation, so no one may approve it.
        assert!(!record_permissions(false, Some(&lender_posted)).can_approve);
        assert!(!record_permissions(true, Some(&lender_posted)).can_approve);
    }

    #[test]
    fn unapproved_lender_record_is_borrower_approvable() {
        let mut r = record(Poster::Lender);
        r.approved = false;
        r.approved_on = None;
        assert!(record_permissions(false, Some(&r)).can_approve);
        assert!(!record_permissions(true, Some(&r)).can_approve);
    }

    #[test]
    fn approved_records_are_not_approvable() {
        let mut r = record(Poster::Borrower);
        r.approved = true;
        assert!(!record_permissions(true, Some(&r)).can_approve);
    }

    #[test]
    fn autopay_records_are_never_approvable() {
        let r = record(Poster::Autopay);
        assert!(!record_permissions(true, Some(&r)).can_approve);
        assert!(!record_permissions(false, Some(&r)).can_approve);
    }

    #[test]
    fn missing_record_grants_nothing() {
        let perms = record_permissions(true, None);
        assert!(!perms.can_approve);
        assert!(!perms.can_delete);
    }
}
