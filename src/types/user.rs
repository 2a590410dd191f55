//! User-related types for the peer-to-peer ledger
//!
//! This module defines the user record and the reduced views of it that the
//! API exposes (summaries without balances, profiles with transaction
//! history).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// User identifier
///
/// Surrogate key assigned by the ledger store on insertion.
pub type UserId = i64;

/// A stored user
///
/// The balance invariant: `balance` equals the initial balance supplied at
/// creation, plus all accepted incoming transfers, minus all accepted
/// outgoing transfers. Only the balance transfer engine mutates it.
///
/// The password hash is an opaque PHC string owned by the credential
/// service; it is never serialized into API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// Surrogate key assigned by the store
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Handle; the core enforces no uniqueness
    pub username: String,

    /// Contact address used for notification intents
    pub email: String,

    /// Signed decimal balance
    pub balance: Decimal,

    /// Opaque credential hash, excluded from serialization
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Reduce to the public summary (no balance, email, or credentials)
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
        }
    }
}

/// Public view of a user, safe to list to anyone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub username: String,
}

/// A user together with their transaction history
///
/// Shape of the get-user, create-user, and delete-user response payloads.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,

    /// Every transaction where the user is sender or receiver, by id
    pub transactions: Vec<Transaction>,
}

/// Parameters for a user that has not been persisted yet
///
/// Doubles as the JSON body of the create-user endpoint. Carries the
/// plaintext password; the engine hashes it before anything is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub balance: Decimal,
    pub password: String,
}
