//! Ledger store
//!
//! SQLite-backed persistence for users, transactions, and friend edges; the
//! single source of truth for balances. The store enforces referential
//! integrity for inserts in code (party-existence checks inside the
//! inserting unit) rather than through SQLite foreign keys, so deleting a
//! user leaves dangling transaction and friendship rows behind: they stay
//! queryable by id while the referenced user resolves to not-found.
//!
//! # Atomic units
//!
//! Every mutating operation runs inside a SQLite transaction. The composite
//! operations used by the lifecycle manager — [`LedgerStore::settle_new_transaction`]
//! and [`LedgerStore::accept_pending`] — combine the record write and the
//! balance transfer in one unit so a crash cannot leave a transaction marked
//! accepted without the corresponding balance change, or vice versa.
//!
//! Decimals are stored as TEXT and parsed on the way out; timestamps are
//! stored in RFC 3339 form.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::core::transfer;
use crate::types::{
    Friendship, LedgerError, NewTransaction, NewUser, Transaction, TransactionId,
    TransactionStatus, User, UserId, UserSummary,
};

/// Durable record of users, transactions, and friendships
///
/// Owns a single SQLite connection. Callers that need concurrent access
/// serialize through a mutex in the application state; the store itself is
/// strictly sequential.
pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    /// Open (or create) the ledger database at the given path
    ///
    /// Creates the schema on first use. The returned store holds the
    /// connection until dropped at shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema cannot
    /// be created.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(LedgerStore { conn })
    }

    /// Open a private in-memory ledger, used by tests
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(LedgerStore { conn })
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a new user and return the stored row with its assigned id
    ///
    /// The store performs no validation of the initial balance sign;
    /// callers supply a valid balance.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the insert fails.
    pub fn create_user(
        &mut self,
        new_user: &NewUser,
        password_hash: &str,
    ) -> Result<User, LedgerError> {
        self.conn.execute(
            "INSERT INTO users (name, username, balance, password_hash, email)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new_user.name,
                new_user.username,
                new_user.balance.to_string(),
                password_hash,
                new_user.email,
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        Ok(User {
            id,
            name: new_user.name.clone(),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            balance: new_user.balance,
            password_hash: password_hash.to_string(),
        })
    }

    /// Fetch a user by id
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if no row exists.
    pub fn get_user(&self, id: UserId) -> Result<User, LedgerError> {
        fetch_user(&self.conn, id)
    }

    /// List every user as a public summary, ordered by id
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn list_users(&self) -> Result<Vec<UserSummary>, LedgerError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, username FROM users ORDER BY id")?;
        let rows = stmt.query_map([], row_to_summary)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Delete a user and return the removed row
    ///
    /// Does not cascade: transactions and friend edges referencing the user
    /// remain in place as dangling references.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if no row exists.
    pub fn delete_user(&mut self, id: UserId) -> Result<User, LedgerError> {
        let user = fetch_user(&self.conn, id)?;
        self.conn
            .execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Insert a transaction record without moving funds
    ///
    /// Used for requests (and for transactions created already declined).
    ///
    /// # Errors
    ///
    /// Returns `UnknownParty` if either the sender or receiver does not
    /// exist at insert time.
    pub fn create_transaction(
        &mut self,
        new_tx: &NewTransaction,
        timestamp: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let unit = self.conn.transaction()?;
        let tx = insert_transaction(&unit, new_tx, timestamp)?;
        unit.commit()?;
        Ok(tx)
    }

    /// Insert an immediately-accepted transaction and settle it
    ///
    /// The record insert and the balance transfer execute in one atomic
    /// unit: either the stored transaction and both balance updates become
    /// visible together, or none of them do.
    ///
    /// # Errors
    ///
    /// Returns `UnknownParty` if either party is missing, or any transfer
    /// error; the unit is rolled back in every failure case.
    pub fn settle_new_transaction(
        &mut self,
        new_tx: &NewTransaction,
        timestamp: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let unit = self.conn.transaction()?;
        let tx = insert_transaction(&unit, new_tx, timestamp)?;
        transfer::transfer(&unit, tx.sender_id, tx.receiver_id, tx.amount)?;
        unit.commit()?;
        Ok(tx)
    }

    /// Fetch a transaction by id
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if no row exists.
    pub fn get_transaction(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        fetch_transaction(&self.conn, id)
    }

    /// Every transaction where the user is sender or receiver, ordered by id
    ///
    /// Dangling references are served as stored: the rows survive deletion
    /// of either party.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn transactions_for_user(&self, user: UserId) -> Result<Vec<Transaction>, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, sender_id, receiver_id, amount, message, accepted
             FROM transactions
             WHERE sender_id = ?1 OR receiver_id = ?1
             ORDER BY id",
        )?;
        let rows = stmt.query_map([user], row_to_transaction)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Overwrite a transaction's settlement state and timestamp
    ///
    /// The store does not itself reject a second transition; the lifecycle
    /// manager enforces the terminal-state invariant before calling in.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if no row exists.
    pub fn update_transaction_status(
        &mut self,
        id: TransactionId,
        status: TransactionStatus,
        timestamp: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let unit = self.conn.transaction()?;
        let tx = set_status(&unit, id, status, timestamp)?;
        unit.commit()?;
        Ok(tx)
    }

    /// Accept a pending transaction: re-check funds, settle, mark accepted
    ///
    /// All three steps share one atomic unit. The sufficiency re-check runs
    /// against the live sender balance, closing the window in which the
    /// creation-time check could have gone stale; on failure the unit rolls
    /// back and the transaction stays pending.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` if the sender's live balance is below
    /// the amount, `UserNotFound` if a party row has since been deleted, or
    /// any transfer/storage error.
    pub fn accept_pending(
        &mut self,
        tx: &Transaction,
        timestamp: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let unit = self.conn.transaction()?;

        let available = transfer::read_balance(&unit, tx.sender_id)?;
        if available < tx.amount {
            return Err(LedgerError::insufficient_funds(
                tx.sender_id,
                available,
                tx.amount,
            ));
        }

        transfer::transfer(&unit, tx.sender_id, tx.receiver_id, tx.amount)?;
        let updated = set_status(&unit, tx.id, TransactionStatus::Accepted, timestamp)?;
        unit.commit()?;
        Ok(updated)
    }

    /// Atomically decrement the sender and increment the receiver balance
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if either row is missing; nothing is written
    /// in that case.
    pub fn apply_balance_delta(
        &mut self,
        sender: UserId,
        receiver: UserId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let unit = self.conn.transaction()?;
        transfer::transfer(&unit, sender, receiver, amount)?;
        unit.commit()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Friendships
    // ------------------------------------------------------------------

    /// Create a symmetric friendship between two users
    ///
    /// Both directed edges are inserted in one atomic unit. The returned
    /// row describes the `(user_id, friend_id)` direction.
    ///
    /// # Errors
    ///
    /// Returns `UnknownParty` if either user does not exist.
    pub fn create_friendship(
        &mut self,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<Friendship, LedgerError> {
        let unit = self.conn.transaction()?;
        ensure_party(&unit, user_id)?;
        ensure_party(&unit, friend_id)?;

        unit.execute(
            "INSERT INTO friendships (user_id, friend_id) VALUES (?1, ?2)",
            params![friend_id, user_id],
        )?;
        unit.execute(
            "INSERT INTO friendships (user_id, friend_id) VALUES (?1, ?2)",
            params![user_id, friend_id],
        )?;
        let id = unit.last_insert_rowid();
        unit.commit()?;

        Ok(Friendship {
            id,
            user_id,
            friend_id,
        })
    }

    /// List a user's friends as public summaries
    ///
    /// Joins through the live users table, so friends deleted since the
    /// edge was created simply disappear from the listing.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn friends_of(&self, user: UserId) -> Result<Vec<UserSummary>, LedgerError> {
        let mut stmt = self.conn.prepare(
            "SELECT u.id, u.name, u.username
             FROM friendships f
             JOIN users u ON u.id = f.friend_id
             WHERE f.user_id = ?1
             ORDER BY f.id",
        )?;
        let rows = stmt.query_map([user], row_to_summary)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// Create the schema if it does not exist yet
///
/// Party references are checked by store code inside the inserting unit, so
/// the schema declares no foreign keys: user deletion must be able to leave
/// dangling rows behind.
pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            username TEXT NOT NULL,
            balance TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            email TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY,
            timestamp TEXT NOT NULL,
            sender_id INTEGER NOT NULL,
            receiver_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            message TEXT NOT NULL,
            accepted BOOLEAN
        );
        CREATE TABLE IF NOT EXISTS friendships (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            friend_id INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_transactions_sender ON transactions (sender_id);
        CREATE INDEX IF NOT EXISTS idx_transactions_receiver ON transactions (receiver_id);
        CREATE INDEX IF NOT EXISTS idx_friendships_user ON friendships (user_id);",
    )
}

/// Parse a TEXT column into a `Decimal`, preserving the column index in the
/// conversion error
pub(crate) fn decimal_from_text(idx: usize, text: &str) -> rusqlite::Result<Decimal> {
    text.parse().map_err(|e: rust_decimal::Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn fetch_user(conn: &Connection, id: UserId) -> Result<User, LedgerError> {
    conn.query_row(
        "SELECT id, name, username, balance, password_hash, email
         FROM users WHERE id = ?1",
        [id],
        row_to_user,
    )
    .optional()?
    .ok_or_else(|| LedgerError::user_not_found(id))
}

fn fetch_transaction(conn: &Connection, id: TransactionId) -> Result<Transaction, LedgerError> {
    conn.query_row(
        "SELECT id, timestamp, sender_id, receiver_id, amount, message, accepted
         FROM transactions WHERE id = ?1",
        [id],
        row_to_transaction,
    )
    .optional()?
    .ok_or_else(|| LedgerError::transaction_not_found(id))
}

fn insert_transaction(
    unit: &rusqlite::Transaction<'_>,
    new_tx: &NewTransaction,
    timestamp: DateTime<Utc>,
) -> Result<Transaction, LedgerError> {
    ensure_party(unit, new_tx.sender_id)?;
    ensure_party(unit, new_tx.receiver_id)?;

    unit.execute(
        "INSERT INTO transactions (timestamp, sender_id, receiver_id, amount, message, accepted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            timestamp,
            new_tx.sender_id,
            new_tx.receiver_id,
            new_tx.amount.to_string(),
            new_tx.message,
            Option::<bool>::from(new_tx.status),
        ],
    )?;
    let id = unit.last_insert_rowid();

    Ok(Transaction {
        id,
        timestamp,
        sender_id: new_tx.sender_id,
        receiver_id: new_tx.receiver_id,
        amount: new_tx.amount,
        message: new_tx.message.clone(),
        status: new_tx.status,
    })
}

fn set_status(
    unit: &rusqlite::Transaction<'_>,
    id: TransactionId,
    status: TransactionStatus,
    timestamp: DateTime<Utc>,
) -> Result<Transaction, LedgerError> {
    let updated = unit.execute(
        "UPDATE transactions SET accepted = ?2, timestamp = ?3 WHERE id = ?1",
        params![id, Option::<bool>::from(status), timestamp],
    )?;
    if updated == 0 {
        return Err(LedgerError::transaction_not_found(id));
    }
    fetch_transaction(unit, id)
}

fn ensure_party(conn: &Connection, user: UserId) -> Result<(), LedgerError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        [user],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(LedgerError::unknown_party(user))
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let balance_text: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        balance: decimal_from_text(3, &balance_text)?,
        password_hash: row.get(4)?,
        email: row.get(5)?,
    })
}

fn row_to_summary(row: &Row<'_>) -> rusqlite::Result<UserSummary> {
    Ok(UserSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
    })
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let amount_text: String = row.get(4)?;
    let accepted: Option<bool> = row.get(6)?;
    Ok(Transaction {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        sender_id: row.get(2)?,
        receiver_id: row.get(3)?,
        amount: decimal_from_text(4, &amount_text)?,
        message: row.get(5)?,
        status: accepted.into(),
    })
}
