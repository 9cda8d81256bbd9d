//! Application state shared across handlers

use std::sync::Arc;

use crate::loan_service::LoanService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub loan_service: Arc<LoanService>,
}

impl AppState {
    pub fn new(loan_service: Arc<LoanService>) -> Self {
        Self { loan_service }
    }
}
