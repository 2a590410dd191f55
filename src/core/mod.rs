//! Core business logic module
//!
//! This module contains the ledger's consistency core:
//! - `store` - Durable SQLite-backed ledger of users, transactions, and
//!   friendships
//! - `transfer` - Atomic balance transfer between two users
//! - `engine` - Transaction lifecycle orchestration (creation,
//!   accept/decline resolution, notification intents)

pub mod engine;
pub mod store;
pub(crate) mod transfer;

pub use engine::LedgerEngine;
pub use store::LedgerStore;
