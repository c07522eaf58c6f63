//! Author subscriptions.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::repos::{AuthorsRepo, FollowsRepo, RepoError};
use crate::domain::entities::AuthorRecord;
use crate::domain::follows::FollowEdge;

#[derive(Debug, Error)]
pub enum FollowError {
    #[error("unknown author `{0}`")]
    UnknownAuthor(String),
    #[error("an author cannot follow themselves")]
    InvalidSelfFollow,
    #[error("already following this author")]
    AlreadyFollowing,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct FollowService {
    authors: Arc<dyn AuthorsRepo>,
    follows: Arc<dyn FollowsRepo>,
}

impl FollowService {
    pub fn new(authors: Arc<dyn AuthorsRepo>, follows: Arc<dyn FollowsRepo>) -> Self {
        Self { authors, follows }
    }

    /// Subscribe `follower_id` to `author_id`.
    ///
    /// A repeated call leaves the single stored edge in place and reports
    /// [`FollowError::AlreadyFollowing`].
    pub async fn follow(&self, follower_id: i64, author_id: i64) -> Result<(), FollowError> {
        let edge =
            FollowEdge::new(follower_id, author_id).map_err(|_| FollowError::InvalidSelfFollow)?;

        if self.authors.find_by_id(author_id).await?.is_none() {
            return Err(FollowError::UnknownAuthor(author_id.to_string()));
        }

        // The author can vanish between the lookup and the insert.
        let inserted = match self.follows.insert_follow(edge).await {
            Ok(inserted) => inserted,
            Err(RepoError::InvalidInput { .. }) => {
                return Err(FollowError::UnknownAuthor(author_id.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        if !inserted {
            return Err(FollowError::AlreadyFollowing);
        }

        info!(
            target = "yatube::follow",
            follower_id, author_id, "author followed"
        );
        Ok(())
    }

    /// Remove the subscription if present. Returns whether an edge was removed.
    pub async fn unfollow(&self, follower_id: i64, author_id: i64) -> Result<bool, FollowError> {
        let removed = self.follows.delete_follow(follower_id, author_id).await?;
        debug!(
            target = "yatube::follow",
            follower_id, author_id, removed, "author unfollowed"
        );
        Ok(removed)
    }

    pub async fn is_following(
        &self,
        follower_id: i64,
        author_id: i64,
    ) -> Result<bool, FollowError> {
        if follower_id == author_id {
            return Ok(false);
        }
        Ok(self.follows.follow_exists(follower_id, author_id).await?)
    }

    pub async fn feed_authors_for(&self, user_id: i64) -> Result<Vec<AuthorRecord>, FollowError> {
        Ok(self.follows.list_followed_authors(user_id).await?)
    }

    pub async fn follow_username(
        &self,
        follower: &AuthorRecord,
        username: &str,
    ) -> Result<AuthorRecord, FollowError> {
        let author = self.resolve(username).await?;
        self.follow(follower.id, author.id).await?;
        Ok(author)
    }

    pub async fn unfollow_username(
        &self,
        follower: &AuthorRecord,
        username: &str,
    ) -> Result<AuthorRecord, FollowError> {
        let author = self.resolve(username).await?;
        self.unfollow(follower.id, author.id).await?;
        Ok(author)
    }

    async fn resolve(&self, username: &str) -> Result<AuthorRecord, FollowError> {
        self.authors
            .find_by_username(username)
            .await?
            .ok_or_else(|| FollowError::UnknownAuthor(username.to_string()))
    }
}
