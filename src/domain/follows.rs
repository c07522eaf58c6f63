//! Subscription graph invariants.

use crate::domain::error::DomainError;

/// A validated follower → author pair.
///
/// Construction rejects self-subscriptions; uniqueness of the pair is left to
/// storage, which owns the full edge set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FollowEdge {
    user_id: i64,
    author_id: i64,
}

impl FollowEdge {
    pub fn new(user_id: i64, author_id: i64) -> Result<Self, DomainError> {
        if user_id == author_id {
            return Err(DomainError::invariant("an author cannot follow themselves"));
        }
        Ok(Self { user_id, author_id })
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn author_id(&self) -> i64 {
        self.author_id
    }
}
