//! Transaction lifecycle manager
//!
//! This module provides the [`LedgerEngine`] that orchestrates the two-phase
//! life of a transaction on top of the ledger store, and fronts the user,
//! credential, and friendship operations for the API layer.
//!
//! The engine enforces the business rules:
//! - Both parties must exist before a transaction is created
//! - Amounts must be positive, and the sender's stored balance must cover
//!   the amount at creation time
//! - A payment settles inside the same atomic unit that stores it; a
//!   request moves no funds until explicitly accepted
//! - `Accepted` and `Declined` are terminal: resolving twice fails and
//!   leaves state and balances untouched
//!
//! Notification delivery is best-effort: failures are logged and swallowed,
//! never rolled into the caller's result.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::store::LedgerStore;
use crate::credentials;
use crate::notify::Notifier;
use crate::types::{
    Friendship, LedgerError, NewTransaction, NewUser, Transaction, TransactionId,
    TransactionStatus, User, UserId, UserProfile, UserSummary,
};

/// Orchestrates transaction lifecycle and user operations
///
/// Owns the ledger store behind a mutex (all storage access is serialized)
/// and a notifier for transaction-creation intents. One engine is shared
/// across the API via `Arc`; construction happens once at startup and the
/// store closes when the engine drops at shutdown.
pub struct LedgerEngine {
    store: Mutex<LedgerStore>,
    notifier: Box<dyn Notifier>,
}

impl LedgerEngine {
    /// Create an engine over an opened store
    pub fn new(store: LedgerStore, notifier: Box<dyn Notifier>) -> Self {
        LedgerEngine {
            store: Mutex::new(store),
            notifier,
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Create a user, hashing the supplied password first
    ///
    /// # Errors
    ///
    /// Returns `Hashing` if the password cannot be hashed, or a storage
    /// error from the insert.
    pub fn create_user(&self, new_user: &NewUser) -> Result<UserProfile, LedgerError> {
        let password_hash = credentials::hash_password(&new_user.password)?;
        let mut store = self.store_guard();
        let user = store.create_user(new_user, &password_hash)?;
        info!(user = user.id, username = %user.username, "user created");
        Ok(UserProfile {
            user,
            transactions: Vec::new(),
        })
    }

    /// Fetch a user and their transaction history, verifying the password
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the id is unknown and `Credential` if the
    /// password does not match.
    pub fn fetch_user(&self, id: UserId, password: &str) -> Result<UserProfile, LedgerError> {
        let store = self.store_guard();
        let user = store.get_user(id)?;
        credentials::verify_password(password, &user.password_hash)?;
        let transactions = store.transactions_for_user(id)?;
        Ok(UserProfile { user, transactions })
    }

    /// Delete a user, returning the removed row and its history
    ///
    /// Transactions and friend edges referencing the user are left behind
    /// as dangling references.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the id is unknown.
    pub fn delete_user(&self, id: UserId) -> Result<UserProfile, LedgerError> {
        let mut store = self.store_guard();
        let user = store.delete_user(id)?;
        let transactions = store.transactions_for_user(id)?;
        info!(user = id, "user deleted");
        Ok(UserProfile { user, transactions })
    }

    /// List every user as a public summary
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn list_users(&self) -> Result<Vec<UserSummary>, LedgerError> {
        self.store_guard().list_users()
    }

    // ------------------------------------------------------------------
    // Friendships
    // ------------------------------------------------------------------

    /// List a user's friends
    ///
    /// An unknown user simply has no friends; no existence check is made.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn friends_of(&self, id: UserId) -> Result<Vec<UserSummary>, LedgerError> {
        self.store_guard().friends_of(id)
    }

    /// Create a symmetric friendship
    ///
    /// # Errors
    ///
    /// Returns `UnknownParty` if either user does not exist.
    pub fn befriend(&self, user_id: UserId, friend_id: UserId) -> Result<Friendship, LedgerError> {
        self.store_guard().create_friendship(user_id, friend_id)
    }

    // ------------------------------------------------------------------
    // Transaction lifecycle
    // ------------------------------------------------------------------

    /// Create a transaction: an immediate payment, a request, or (rarely) a
    /// record declined from the start
    ///
    /// Resolution order: both parties are resolved first, then the amount
    /// must be positive, then the amount must not exceed the sender's
    /// stored balance. Only then is anything persisted. A payment settles
    /// in the same atomic unit that stores it; every other initial state
    /// moves no funds.
    ///
    /// A notification intent is emitted for payments and requests;
    /// delivery failure is logged and does not affect the result.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if either party is absent, `InvalidAmount`
    /// for non-positive amounts, and `InsufficientFunds` if the sender's
    /// balance does not cover the amount — in which case no transaction
    /// record is created.
    pub fn initiate_transaction(
        &self,
        new_tx: &NewTransaction,
    ) -> Result<Transaction, LedgerError> {
        let mut store = self.store_guard();
        let sender = store.get_user(new_tx.sender_id)?;
        let receiver = store.get_user(new_tx.receiver_id)?;

        if new_tx.amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(new_tx.amount));
        }
        if new_tx.amount > sender.balance {
            return Err(LedgerError::insufficient_funds(
                sender.id,
                sender.balance,
                new_tx.amount,
            ));
        }

        let now = Utc::now();
        let tx = match new_tx.status {
            TransactionStatus::Accepted => store.settle_new_transaction(new_tx, now)?,
            TransactionStatus::Pending | TransactionStatus::Declined => {
                store.create_transaction(new_tx, now)?
            }
        };
        drop(store);

        info!(
            transaction = tx.id,
            sender = tx.sender_id,
            receiver = tx.receiver_id,
            amount = %tx.amount,
            status = %tx.status,
            "transaction created"
        );
        self.notify_created(&sender, &receiver, &tx);
        Ok(tx)
    }

    /// Resolve a pending transaction with an accept/decline decision
    ///
    /// Accepting re-checks the sender's live balance and settles inside
    /// one atomic unit; if funds have drained since creation the
    /// transaction stays pending. Declining moves no funds. Either outcome
    /// re-stamps the timestamp.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` for an unknown id, `AlreadyResolved`
    /// if the stored state is terminal, and `InsufficientFunds` when an
    /// accept fails its re-check.
    pub fn resolve_transaction(
        &self,
        id: TransactionId,
        accepted: bool,
    ) -> Result<Transaction, LedgerError> {
        let mut store = self.store_guard();
        let tx = store.get_transaction(id)?;
        if tx.status.is_terminal() {
            return Err(LedgerError::already_resolved(id, tx.status));
        }

        let now = Utc::now();
        let updated = if accepted {
            store.accept_pending(&tx, now)?
        } else {
            store.update_transaction_status(id, TransactionStatus::Declined, now)?
        };

        info!(transaction = id, status = %updated.status, "transaction resolved");
        Ok(updated)
    }

    fn notify_created(&self, sender: &User, receiver: &User, tx: &Transaction) {
        let subject = match tx.status {
            TransactionStatus::Pending => {
                format!("{} has requested ${} from you", sender.name, tx.amount)
            }
            TransactionStatus::Accepted => format!("{} paid you ${}", sender.name, tx.amount),
            TransactionStatus::Declined => return,
        };

        if let Err(e) = self
            .notifier
            .send(&sender.email, &receiver.email, &subject, &tx.message)
        {
            warn!(transaction = tx.id, error = %e, "notification delivery failed");
        }
    }

    fn store_guard(&self) -> MutexGuard<'_, LedgerStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
