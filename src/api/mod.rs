//! HTTP API module
//!
//! Thin axum layer over the ledger engine. Handlers translate JSON bodies
//! into engine calls and wrap every outcome in the
//! `{"success": ..., "data" | "error": ...}` envelope; error variants map
//! onto stable status codes in [`error`].
//!
//! # Components
//!
//! - `error` - Envelope types and the error-to-status mapping
//! - `handlers` - One handler per endpoint

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::core::LedgerEngine;

pub use error::{ApiData, ApiError};

/// Build the API router over a shared engine
pub fn router(engine: Arc<LedgerEngine>) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/user/:id",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/api/user/:id/friends", get(handlers::list_friends))
        .route(
            "/api/user/:id/friend/:friend_id",
            post(handlers::create_friendship),
        )
        .route("/api/transactions", post(handlers::create_transaction))
        .route("/api/transaction/:id", post(handlers::resolve_transaction))
        .with_state(engine)
}
