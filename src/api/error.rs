//! Response envelope and error mapping for the HTTP API
//!
//! Every endpoint answers with the same envelope shape: successes carry
//! `{"success": true, "data": ...}`, failures
//! `{"success": false, "error": "..."}`. This module owns the envelope
//! types and the mapping from ledger errors onto status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::types::LedgerError;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiData<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiData<T> {
    /// Wrap a payload in the success envelope
    pub fn new(data: T) -> Self {
        ApiData {
            success: true,
            data,
        }
    }
}

/// Ledger error carried to the HTTP boundary
///
/// Converts from [`LedgerError`] so handlers can use `?` directly, and
/// renders as the failure envelope with a stable status code:
///
/// - 404 — user or transaction not found, unknown party
/// - 400 — insufficient funds, already resolved, invalid amount
/// - 401 — password mismatch
/// - 500 — storage, hashing, or arithmetic failures
#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::UserNotFound { .. }
            | LedgerError::TransactionNotFound { .. }
            | LedgerError::UnknownParty { .. } => StatusCode::NOT_FOUND,
            LedgerError::InsufficientFunds { .. }
            | LedgerError::AlreadyResolved { .. }
            | LedgerError::InvalidAmount { .. } => StatusCode::BAD_REQUEST,
            LedgerError::Credential => StatusCode::UNAUTHORIZED,
            LedgerError::Hashing { .. }
            | LedgerError::BalanceOverflow { .. }
            | LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = Json(json!({
            "success": false,
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
