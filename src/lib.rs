//! Lendr Backend Library
//!
//! This library exports the core modules for the lendr loan-ledger server.

pub mod app_state;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod keygen;
pub mod loan;
pub mod loan_service;
pub mod middleware;
pub mod routes;
pub mod store;
