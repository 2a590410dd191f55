//! Error types for the peer-to-peer ledger
//!
//! This module defines all errors that can occur while operating on the
//! ledger. Every variant carries enough context to produce a useful message
//! at the API boundary.
//!
//! # Error Categories
//!
//! - **Lookup errors**: user or transaction absent
//! - **Referential errors**: an insert references a nonexistent party
//! - **Lifecycle errors**: insufficient funds, resolving a settled
//!   transaction, non-positive amounts
//! - **Credential errors**: password mismatch or hashing failure
//! - **Storage errors**: SQLite failures and arithmetic overflow while
//!   adjusting balances

use rust_decimal::Decimal;
use thiserror::Error;

use super::transaction::{TransactionId, TransactionStatus};
use super::user::UserId;

/// Main error type for the ledger
///
/// All operations on the store, the transfer engine, and the lifecycle
/// manager report failures through this enum. The API layer maps each
/// variant onto a stable HTTP status code.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No user row exists for the given id
    ///
    /// Also produced when a dangling reference (left behind by a user
    /// deletion) is followed back to the users table.
    #[error("User {user} not found")]
    UserNotFound {
        /// The id that resolved to nothing
        user: UserId,
    },

    /// No transaction row exists for the given id
    #[error("Transaction {tx} not found")]
    TransactionNotFound {
        /// The id that resolved to nothing
        tx: TransactionId,
    },

    /// An insert referenced a user that does not exist
    ///
    /// Raised at the storage boundary when creating a transaction or a
    /// friendship whose party is absent.
    #[error("Operation references unknown user {user}")]
    UnknownParty {
        /// The missing party
        user: UserId,
    },

    /// Sender balance below the requested amount
    ///
    /// Checked against the stored balance at creation time, and re-checked
    /// inside the settling unit when a pending request is accepted.
    #[error(
        "Insufficient funds for user {user}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        /// The sender
        user: UserId,
        /// Stored balance at check time
        available: Decimal,
        /// Amount the transaction asked for
        requested: Decimal,
    },

    /// A resolution was attempted on a transaction already settled
    ///
    /// `Accepted` and `Declined` are terminal; the stored state and the
    /// balances are left untouched.
    #[error("Transaction {tx} is already {status}")]
    AlreadyResolved {
        /// The transaction whose state is terminal
        tx: TransactionId,
        /// The terminal state it is in
        status: TransactionStatus,
    },

    /// Transaction amount was zero or negative
    #[error("Invalid transaction amount {amount}: must be positive")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Password did not match the stored hash
    #[error("Incorrect password")]
    Credential,

    /// Password hashing or hash parsing failed
    ///
    /// Internal failure of the credential service, not a mismatch.
    #[error("Credential processing failed: {message}")]
    Hashing {
        /// Description from the hashing backend
        message: String,
    },

    /// Adjusting a balance overflowed the decimal range
    ///
    /// The enclosing storage transaction is rolled back, so no partial
    /// transfer becomes visible.
    #[error("Arithmetic overflow adjusting balance of user {user}")]
    BalanceOverflow {
        /// The user whose balance update overflowed
        user: UserId,
    },

    /// Underlying SQLite failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a UserNotFound error
    pub fn user_not_found(user: UserId) -> Self {
        LedgerError::UserNotFound { user }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(tx: TransactionId) -> Self {
        LedgerError::TransactionNotFound { tx }
    }

    /// Create an UnknownParty error
    pub fn unknown_party(user: UserId) -> Self {
        LedgerError::UnknownParty { user }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(user: UserId, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            user,
            available,
            requested,
        }
    }

    /// Create an AlreadyResolved error
    pub fn already_resolved(tx: TransactionId, status: TransactionStatus) -> Self {
        LedgerError::AlreadyResolved { tx, status }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create a BalanceOverflow error
    pub fn balance_overflow(user: UserId) -> Self {
        LedgerError::BalanceOverflow { user }
    }
}
