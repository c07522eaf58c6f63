//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::PageWindow;
use crate::domain::entities::{
    AuthorRecord, CommentEntry, CommentRecord, GroupRecord, PostEntry, PostRecord,
};
use crate::domain::follows::FollowEdge;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Which posts a feed listing covers. Every scope orders by
/// `created_at DESC, id DESC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostListScope {
    All,
    Group(i64),
    Author(i64),
    /// Posts by every author the given user follows at query time.
    FollowedBy(i64),
}

#[derive(Debug, Clone)]
pub struct CreateGroupParams {
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CreatePostParams {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdatePostParams {
    pub id: i64,
    pub text: String,
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
}

#[async_trait]
pub trait AuthorsRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthorRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<AuthorRecord>, RepoError>;

    /// Return the author for `username`, creating the mirror row on first sight.
    async fn ensure_author(&self, username: &str) -> Result<AuthorRecord, RepoError>;
}

#[async_trait]
pub trait GroupsRepo: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError>;

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError>;

    async fn find_group_by_id(&self, id: i64) -> Result<Option<GroupRecord>, RepoError>;
}

#[async_trait]
pub trait GroupsWriteRepo: Send + Sync {
    async fn create_group(&self, params: CreateGroupParams) -> Result<GroupRecord, RepoError>;

    /// Delete a group; its posts stay and lose their group reference.
    async fn delete_group(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn count_posts(&self, scope: PostListScope) -> Result<u64, RepoError>;

    async fn list_posts(
        &self,
        scope: PostListScope,
        window: PageWindow,
    ) -> Result<Vec<PostEntry>, RepoError>;

    async fn find_post(&self, id: i64) -> Result<Option<PostEntry>, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError>;

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError>;

    /// Delete a post together with its comments.
    async fn delete_post(&self, id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    /// Comments on a post, oldest first.
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentEntry>, RepoError>;

    async fn create_comment(&self, params: CreateCommentParams)
    -> Result<CommentRecord, RepoError>;
}

#[async_trait]
pub trait FollowsRepo: Send + Sync {
    /// Store the edge. Returns `false` when it already existed; no second row is written.
    async fn insert_follow(&self, edge: FollowEdge) -> Result<bool, RepoError>;

    /// Remove the edge. Returns `false` when there was nothing to remove.
    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;

    async fn follow_exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError>;

    async fn list_followed_authors(&self, user_id: i64) -> Result<Vec<AuthorRecord>, RepoError>;

    async fn count_followers(&self, author_id: i64) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
