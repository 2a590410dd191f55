//! Peer-to-Peer Balance Transfer Ledger
//! # Overview
//!
//! This library provides a peer-to-peer money ledger: users hold a balance,
//! befriend each other, and move funds through transactions that carry an
//! explicit accept/decline lifecycle, served over an HTTP JSON API.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (User, Transaction, Friendship, errors)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::store`] - Durable SQLite-backed ledger of users,
//!     transactions, and friendships
//!   - [`core::engine`] - Transaction lifecycle orchestration
//! - [`credentials`] - Password hashing and verification
//! - [`notify`] - Best-effort notification delivery (SMTP or log-only)
//! - [`api`] - axum HTTP layer exposing the core operations
//!
//! # Transaction Lifecycle
//!
//! A transaction is created in one of two shapes:
//!
//! - **Payment**: accepted at creation; the balance transfer settles inside
//!   the same atomic unit that stores the record
//! - **Request**: pending at creation; funds move only when the receiver of
//!   the request later accepts it
//!
//! `Accepted` and `Declined` are terminal states. A declined or pending
//! transaction never moves funds, and every settled transfer debits the
//! sender and credits the receiver by the same amount, so the sum of all
//! balances is invariant.

// Module declarations
pub mod api;
pub mod cli;
pub mod core;
pub mod credentials;
pub mod notify;
pub mod types;

pub use crate::core::{LedgerEngine, LedgerStore};
pub use crate::types::{
    Friendship, LedgerError, NewTransaction, NewUser, Transaction, TransactionId,
    TransactionStatus, User, UserId, UserProfile, UserSummary,
};
