//! Mapping of externally authenticated identities onto local authors.

use std::sync::Arc;

use thiserror::Error;

use crate::application::repos::{AuthorsRepo, RepoError};
use crate::domain::entities::AuthorRecord;

pub const MAX_USERNAME_LENGTH: usize = 150;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity `{0}` is not a valid username")]
    InvalidUsername(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct AuthorService {
    authors: Arc<dyn AuthorsRepo>,
}

impl AuthorService {
    pub fn new(authors: Arc<dyn AuthorsRepo>) -> Self {
        Self { authors }
    }

    /// Resolve the author behind an authenticated username, creating it on first use.
    pub async fn resolve_identity(&self, username: &str) -> Result<AuthorRecord, IdentityError> {
        let username = username.trim();
        if !is_valid_username(username) {
            return Err(IdentityError::InvalidUsername(username.to_string()));
        }
        Ok(self.authors.ensure_author(username).await?)
    }
}

/// Letters, digits and `@ . + - _`, at most [`MAX_USERNAME_LENGTH`] characters.
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LENGTH
        && username
            .chars()
            .all(|ch| ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_provider_style_usernames() {
        assert!(is_valid_username("leo"));
        assert!(is_valid_username("user.name+tag@example"));
        assert!(is_valid_username("Лев_Толстой"));
    }

    #[test]
    fn rejects_blank_and_unsafe_usernames() {
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("two words"));
        assert!(!is_valid_username("../etc"));
        assert!(!is_valid_username(&"a".repeat(MAX_USERNAME_LENGTH + 1)));
    }
}
