//! HTTP middleware

pub mod tracing;

pub use tracing::request_tracing;
