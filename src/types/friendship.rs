//! Friend-edge types
//!
//! Friendships are stored as directed edges; the registry inserts both
//! directions together so the relation stays symmetric. None of the balance
//! logic consults this relation.

use serde::Serialize;

use super::user::UserId;

/// A single direction of a symmetric friendship
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Friendship {
    pub id: i64,
    pub user_id: UserId,
    pub friend_id: UserId,
}
