//! Transaction-related types for the peer-to-peer ledger
//!
//! This module defines the transaction record, its settlement state machine,
//! and the identifier types used throughout the system.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Transaction identifier
///
/// Surrogate key assigned by the ledger store on insertion.
pub type TransactionId = i64;

/// Settlement state of a transaction
///
/// A transaction is created either as a **payment** (`Accepted` from the
/// start, funds move immediately) or as a **request** (`Pending`, funds move
/// only on a later explicit accept). `Accepted` and `Declined` are terminal:
/// once a transaction leaves `Pending` no further transition is permitted.
///
/// On the wire and in the database this is the classic optional boolean:
/// `null` = pending, `true` = accepted, `false` = declined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum TransactionStatus {
    /// Decision still open; no funds have moved
    #[default]
    Pending,

    /// Settled; the balance transfer has been applied
    Accepted,

    /// Rejected; no funds ever move
    Declined,
}

impl TransactionStatus {
    /// Whether this state permits no further transitions
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Map an accept/decline decision onto the terminal state it produces
    pub fn from_decision(accepted: bool) -> Self {
        if accepted {
            TransactionStatus::Accepted
        } else {
            TransactionStatus::Declined
        }
    }
}

impl From<Option<bool>> for TransactionStatus {
    fn from(accepted: Option<bool>) -> Self {
        match accepted {
            None => TransactionStatus::Pending,
            Some(true) => TransactionStatus::Accepted,
            Some(false) => TransactionStatus::Declined,
        }
    }
}

impl From<TransactionStatus> for Option<bool> {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => None,
            TransactionStatus::Accepted => Some(true),
            TransactionStatus::Declined => Some(false),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Accepted => "accepted",
            TransactionStatus::Declined => "declined",
        };
        write!(f, "{}", label)
    }
}

/// A stored transaction between two users
///
/// The `timestamp` is set when the transaction is created and overwritten
/// when a pending transaction is resolved. `amount` is always positive;
/// direction is carried by the sender/receiver pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// Surrogate key assigned by the store
    pub id: TransactionId,

    /// Creation time, replaced by the resolution time once resolved
    pub timestamp: DateTime<Utc>,

    /// The user whose balance is debited on settlement
    pub sender_id: UserId,

    /// The user whose balance is credited on settlement
    pub receiver_id: UserId,

    /// Transferred amount; strictly positive
    pub amount: Decimal,

    /// Free-form note attached by the sender
    pub message: String,

    /// Settlement state, serialized as the tri-state `accepted` field
    #[serde(rename = "accepted")]
    pub status: TransactionStatus,
}

/// Parameters for a transaction that has not been persisted yet
///
/// Doubles as the JSON body of the create-transaction endpoint, which is why
/// the settlement state deserializes from the `accepted` field and defaults
/// to `Pending` when the field is absent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub amount: Decimal,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "accepted")]
    pub status: TransactionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_round_trips_through_option_bool() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Accepted,
            TransactionStatus::Declined,
        ] {
            let wire: Option<bool> = status.into();
            assert_eq!(TransactionStatus::from(wire), status);
        }
    }

    #[test]
    fn test_pending_is_not_terminal() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Accepted.is_terminal());
        assert!(TransactionStatus::Declined.is_terminal());
    }

    #[test]
    fn test_from_decision() {
        assert_eq!(
            TransactionStatus::from_decision(true),
            TransactionStatus::Accepted
        );
        assert_eq!(
            TransactionStatus::from_decision(false),
            TransactionStatus::Declined
        );
    }

    #[test]
    fn test_new_transaction_defaults_to_pending_without_accepted_field() {
        let body = json!({
            "sender_id": 1,
            "receiver_id": 2,
            "amount": "12.50",
            "message": "lunch"
        });
        let new_tx: NewTransaction = serde_json::from_value(body).unwrap();
        assert_eq!(new_tx.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_new_transaction_accepts_tri_state_field() {
        let paid: NewTransaction = serde_json::from_value(json!({
            "sender_id": 1,
            "receiver_id": 2,
            "amount": 30,
            "message": "",
            "accepted": true
        }))
        .unwrap();
        assert_eq!(paid.status, TransactionStatus::Accepted);

        let requested: NewTransaction = serde_json::from_value(json!({
            "sender_id": 1,
            "receiver_id": 2,
            "amount": 30,
            "message": "",
            "accepted": null
        }))
        .unwrap();
        assert_eq!(requested.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_transaction_serializes_status_as_accepted_field() {
        let tx = Transaction {
            id: 7,
            timestamp: Utc::now(),
            sender_id: 1,
            receiver_id: 2,
            amount: Decimal::new(3000, 2),
            message: "rent".to_string(),
            status: TransactionStatus::Pending,
        };
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["accepted"], serde_json::Value::Null);
        assert_eq!(value["sender_id"], 1);
    }
}
