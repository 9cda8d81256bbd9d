//! Route definitions for the lendr API
//!
//! The versioned API is mounted at both `/api/v1` and `/api/current`.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::app_state::AppState;
use crate::handlers;

/// One version of the loan/record API.
fn v1_routes() -> Router<AppState> {
    Router::new()
        .route("/loan/create", post(handlers::create_loan))
        .route("/loan/:key", get(handlers::get_loan))
        .route("/loan/:key/autopay", patch(handlers::update_autopay))
        .route("/loan/:key/record", post(handlers::post_record))
        .route(
            "/loan/:key/record/:id",
            get(handlers::get_record)
                .patch(handlers::approve_record)
                .delete(handlers::delete_record),
        )
}

/// The full API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", v1_routes())
        .nest("/api/current", v1_routes())
}
