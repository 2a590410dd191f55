//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `user`: User-related types and identifiers
//! - `transaction`: Transaction-related types and the settlement state machine
//! - `friendship`: Friend-edge types
//! - `error`: Error types for the ledger

pub mod error;
pub mod friendship;
pub mod transaction;
pub mod user;

pub use error::LedgerError;
pub use friendship::Friendship;
pub use transaction::{NewTransaction, Transaction, TransactionId, TransactionStatus};
pub use user::{NewUser, User, UserId, UserProfile, UserSummary};
