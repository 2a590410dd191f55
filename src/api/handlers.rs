//! Request handlers, one per endpoint
//!
//! Handlers stay thin: extract, call the engine, wrap in the envelope.
//! All domain rules live in the engine and below.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::core::LedgerEngine;
use crate::types::{
    Friendship, NewTransaction, NewUser, Transaction, TransactionId, UserId, UserProfile,
    UserSummary,
};

use super::error::{ApiData, ApiError};

/// Body of the get-user endpoint; the password is verified per request
#[derive(Debug, Deserialize)]
pub struct PasswordBody {
    pub password: String,
}

/// Body of the resolve-transaction endpoint
#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub accepted: bool,
}

/// `GET /api/users`
pub async fn list_users(
    State(engine): State<Arc<LedgerEngine>>,
) -> Result<Json<ApiData<Vec<UserSummary>>>, ApiError> {
    Ok(Json(ApiData::new(engine.list_users()?)))
}

/// `POST /api/users`
pub async fn create_user(
    State(engine): State<Arc<LedgerEngine>>,
    Json(new_user): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiData<UserProfile>>), ApiError> {
    let profile = engine.create_user(&new_user)?;
    Ok((StatusCode::CREATED, Json(ApiData::new(profile))))
}

/// `GET /api/user/{id}`
pub async fn get_user(
    State(engine): State<Arc<LedgerEngine>>,
    Path(id): Path<UserId>,
    Json(body): Json<PasswordBody>,
) -> Result<Json<ApiData<UserProfile>>, ApiError> {
    Ok(Json(ApiData::new(engine.fetch_user(id, &body.password)?)))
}

/// `DELETE /api/user/{id}`
pub async fn delete_user(
    State(engine): State<Arc<LedgerEngine>>,
    Path(id): Path<UserId>,
) -> Result<Json<ApiData<UserProfile>>, ApiError> {
    Ok(Json(ApiData::new(engine.delete_user(id)?)))
}

/// `GET /api/user/{id}/friends`
pub async fn list_friends(
    State(engine): State<Arc<LedgerEngine>>,
    Path(id): Path<UserId>,
) -> Result<Json<ApiData<Vec<UserSummary>>>, ApiError> {
    Ok(Json(ApiData::new(engine.friends_of(id)?)))
}

/// `POST /api/user/{id}/friend/{friend_id}`
pub async fn create_friendship(
    State(engine): State<Arc<LedgerEngine>>,
    Path((user_id, friend_id)): Path<(UserId, UserId)>,
) -> Result<(StatusCode, Json<ApiData<Friendship>>), ApiError> {
    let friendship = engine.befriend(user_id, friend_id)?;
    Ok((StatusCode::CREATED, Json(ApiData::new(friendship))))
}

/// `POST /api/transactions`
pub async fn create_transaction(
    State(engine): State<Arc<LedgerEngine>>,
    Json(new_tx): Json<NewTransaction>,
) -> Result<(StatusCode, Json<ApiData<Transaction>>), ApiError> {
    let tx = engine.initiate_transaction(&new_tx)?;
    Ok((StatusCode::CREATED, Json(ApiData::new(tx))))
}

/// `POST /api/transaction/{id}`
pub async fn resolve_transaction(
    State(engine): State<Arc<LedgerEngine>>,
    Path(id): Path<TransactionId>,
    Json(body): Json<ResolveBody>,
) -> Result<Json<ApiData<Transaction>>, ApiError> {
    Ok(Json(ApiData::new(
        engine.resolve_transaction(id, body.accepted)?,
    )))
}
