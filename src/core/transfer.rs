//! Balance transfer engine
//!
//! The sole path by which user balances change. A transfer reads both
//! balances and writes both new values against a single SQLite transaction
//! handle, so callers decide the enclosing atomic unit: either both updates
//! become visible on commit or neither does.
//!
//! No balance-sufficiency check happens here; the lifecycle manager gates
//! creation-time sufficiency, and the store re-checks inside the settling
//! unit when accepting a pending request. Transfers are only invoked after
//! both parties were confirmed to exist, so a missing user at this layer
//! rolls the unit back as a lookup error.

use rusqlite::OptionalExtension;
use rust_decimal::Decimal;

use crate::core::store::decimal_from_text;
use crate::types::{LedgerError, UserId};

/// Move `amount` from `sender` to `receiver` within the given unit
///
/// Debits the sender and credits the receiver using checked decimal
/// arithmetic. A transfer to oneself leaves the balance untouched: the debit
/// and credit cancel, and writing them as two sequential updates would
/// otherwise let the second write clobber the first.
///
/// # Errors
///
/// Returns an error if either user row is missing, if a balance adjustment
/// overflows, or if SQLite fails. The caller's unit is not committed, so no
/// partial transfer survives.
pub(crate) fn transfer(
    unit: &rusqlite::Transaction<'_>,
    sender: UserId,
    receiver: UserId,
    amount: Decimal,
) -> Result<(), LedgerError> {
    if sender == receiver {
        // Net delta is zero; still verify the row exists
        read_balance(unit, sender)?;
        return Ok(());
    }

    let sender_balance = read_balance(unit, sender)?;
    let receiver_balance = read_balance(unit, receiver)?;

    let debited = sender_balance
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::balance_overflow(sender))?;
    let credited = receiver_balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::balance_overflow(receiver))?;

    write_balance(unit, sender, debited)?;
    write_balance(unit, receiver, credited)?;

    Ok(())
}

/// Read a user's stored balance within the given unit
///
/// # Errors
///
/// Returns `UserNotFound` if the row is absent, or a storage error if the
/// stored text is not a valid decimal.
pub(crate) fn read_balance(
    unit: &rusqlite::Transaction<'_>,
    user: UserId,
) -> Result<Decimal, LedgerError> {
    let text: Option<String> = unit
        .query_row("SELECT balance FROM users WHERE id = ?1", [user], |row| {
            row.get(0)
        })
        .optional()?;

    let text = text.ok_or_else(|| LedgerError::user_not_found(user))?;
    Ok(decimal_from_text(0, &text)?)
}

fn write_balance(
    unit: &rusqlite::Transaction<'_>,
    user: UserId,
    balance: Decimal,
) -> Result<(), LedgerError> {
    unit.execute(
        "UPDATE users SET balance = ?2 WHERE id = ?1",
        rusqlite::params![user, balance.to_string()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store;
    use rusqlite::Connection;

    fn connection_with_users(balances: &[(UserId, &str)]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        store::init_schema(&conn).unwrap();
        for (id, balance) in balances {
            conn.execute(
                "INSERT INTO users (id, name, username, balance, password_hash, email)
                 VALUES (?1, 'u', 'u', ?2, 'hash', 'u@example.com')",
                rusqlite::params![id, balance],
            )
            .unwrap();
        }
        conn
    }

    fn balance_of(conn: &Connection, user: UserId) -> Decimal {
        let text: String = conn
            .query_row("SELECT balance FROM users WHERE id = ?1", [user], |row| {
                row.get(0)
            })
            .unwrap();
        text.parse().unwrap()
    }

    #[test]
    fn test_transfer_moves_funds_both_ways() {
        let mut conn = connection_with_users(&[(1, "100"), (2, "50")]);
        let unit = conn.transaction().unwrap();
        transfer(&unit, 1, 2, Decimal::new(30, 0)).unwrap();
        unit.commit().unwrap();

        assert_eq!(balance_of(&conn, 1), Decimal::new(70, 0));
        assert_eq!(balance_of(&conn, 2), Decimal::new(80, 0));
    }

    #[test]
    fn test_transfer_conserves_total() {
        let mut conn = connection_with_users(&[(1, "12.34"), (2, "87.66")]);
        let before = balance_of(&conn, 1) + balance_of(&conn, 2);

        let unit = conn.transaction().unwrap();
        transfer(&unit, 1, 2, Decimal::new(999, 2)).unwrap();
        unit.commit().unwrap();

        let after = balance_of(&conn, 1) + balance_of(&conn, 2);
        assert_eq!(before, after);
    }

    #[test]
    fn test_transfer_permits_negative_sender_balance() {
        // Sufficiency is gated earlier; the engine itself never refuses
        let mut conn = connection_with_users(&[(1, "10"), (2, "0")]);
        let unit = conn.transaction().unwrap();
        transfer(&unit, 1, 2, Decimal::new(25, 0)).unwrap();
        unit.commit().unwrap();

        assert_eq!(balance_of(&conn, 1), Decimal::new(-15, 0));
        assert_eq!(balance_of(&conn, 2), Decimal::new(25, 0));
    }

    #[test]
    fn test_transfer_to_self_is_a_no_op() {
        let mut conn = connection_with_users(&[(1, "100")]);
        let unit = conn.transaction().unwrap();
        transfer(&unit, 1, 1, Decimal::new(30, 0)).unwrap();
        unit.commit().unwrap();

        assert_eq!(balance_of(&conn, 1), Decimal::new(100, 0));
    }

    #[test]
    fn test_transfer_fails_for_missing_receiver() {
        let mut conn = connection_with_users(&[(1, "100")]);
        let unit = conn.transaction().unwrap();
        let err = transfer(&unit, 1, 9, Decimal::new(30, 0)).unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound { user: 9 }));
        drop(unit);

        // Nothing committed
        assert_eq!(balance_of(&conn, 1), Decimal::new(100, 0));
    }
}
