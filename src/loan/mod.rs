//! Loan ledger domain: data model, permission policy, autopay scheduler,
//! and the key-scoped session facade.

pub mod autopay;
pub mod model;
pub mod permissions;
pub mod session;
pub mod view;

pub use model::{AutopayConfig, AutopayPeriod, Loan, Poster, Record};
pub use permissions::{record_permissions, RecordPermissions};
pub use session::LoanSession;
pub use view::{LoanView, RecordView};
