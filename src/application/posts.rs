//! Post authoring: create, edit, delete and comment.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{
    CommentsRepo, CreateCommentParams, CreatePostParams, GroupsRepo, PostsRepo, PostsWriteRepo,
    RepoError, UpdatePostParams,
};
use crate::domain::entities::{AuthorRecord, CommentRecord, GroupRecord, PostEntry, PostRecord};
use crate::domain::posts::normalize_text;

pub const REQUIRED_FIELD_MESSAGE: &str = "This field is required.";
pub const INVALID_GROUP_MESSAGE: &str = "Select a valid group.";

/// Raw post form values as submitted.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    pub text: String,
    /// Group id as text; empty means "no group".
    pub group: Option<String>,
}

/// Per-field validation messages for the post form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub text: Option<String>,
    pub group: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.group.is_none()
    }
}

#[derive(Debug, Error)]
pub enum PostError {
    #[error("post {0} not found")]
    NotFound(i64),
    #[error("post {post_id} belongs to another author")]
    NotAuthor { post_id: i64 },
    #[error("post form is invalid")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

struct ValidPost {
    text: String,
    group_id: Option<i64>,
}

#[derive(Clone)]
pub struct PostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
    comments: Arc<dyn CommentsRepo>,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
        comments: Arc<dyn CommentsRepo>,
    ) -> Self {
        Self {
            reader,
            writer,
            groups,
            comments,
        }
    }

    /// Groups offered by the post form.
    pub async fn group_choices(&self) -> Result<Vec<GroupRecord>, PostError> {
        Ok(self.groups.list_groups().await?)
    }

    pub async fn create(
        &self,
        author: &AuthorRecord,
        input: PostInput,
    ) -> Result<PostRecord, PostError> {
        let valid = self.validate(input).await?;
        let post = self
            .writer
            .create_post(CreatePostParams {
                author_id: author.id,
                text: valid.text,
                group_id: valid.group_id,
                image: None,
            })
            .await?;

        info!(
            target = "yatube::posts",
            post_id = post.id,
            author = %author.username,
            "post created"
        );
        Ok(post)
    }

    /// Load a post its author is about to edit.
    pub async fn load_for_edit(
        &self,
        editor: &AuthorRecord,
        post_id: i64,
    ) -> Result<PostEntry, PostError> {
        let entry = self
            .reader
            .find_post(post_id)
            .await?
            .ok_or(PostError::NotFound(post_id))?;

        if !entry.post.is_authored_by(editor.id) {
            return Err(PostError::NotAuthor { post_id });
        }
        Ok(entry)
    }

    pub async fn edit(
        &self,
        editor: &AuthorRecord,
        post_id: i64,
        input: PostInput,
    ) -> Result<PostRecord, PostError> {
        self.load_for_edit(editor, post_id).await?;
        let valid = self.validate(input).await?;

        let post = self
            .writer
            .update_post(UpdatePostParams {
                id: post_id,
                text: valid.text,
                group_id: valid.group_id,
            })
            .await
            .map_err(|err| match err {
                RepoError::NotFound => PostError::NotFound(post_id),
                other => PostError::Repo(other),
            })?;

        info!(target = "yatube::posts", post_id, "post updated");
        Ok(post)
    }

    pub async fn delete(&self, editor: &AuthorRecord, post_id: i64) -> Result<(), PostError> {
        self.load_for_edit(editor, post_id).await?;
        self.writer.delete_post(post_id).await?;
        info!(target = "yatube::posts", post_id, "post deleted");
        Ok(())
    }

    /// Attach a comment to a post. Blank text stores nothing and yields `None`.
    pub async fn comment(
        &self,
        author: &AuthorRecord,
        post_id: i64,
        text: &str,
    ) -> Result<Option<CommentRecord>, PostError> {
        if self.reader.find_post(post_id).await?.is_none() {
            return Err(PostError::NotFound(post_id));
        }

        let Some(text) = normalize_text(text) else {
            return Ok(None);
        };

        let comment = self
            .comments
            .create_comment(CreateCommentParams {
                post_id,
                author_id: author.id,
                text,
            })
            .await?;
        Ok(Some(comment))
    }

    async fn validate(&self, input: PostInput) -> Result<ValidPost, PostError> {
        let mut errors = FieldErrors::default();

        let text = normalize_text(&input.text);
        if text.is_none() {
            errors.text = Some(REQUIRED_FIELD_MESSAGE.to_string());
        }

        let group_id = match input.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let found = match raw.parse::<i64>() {
                    Ok(id) => self.groups.find_group_by_id(id).await?.map(|group| group.id),
                    Err(_) => None,
                };
                if found.is_none() {
                    errors.group = Some(INVALID_GROUP_MESSAGE.to_string());
                }
                found
            }
        };

        match text {
            Some(text) if errors.is_empty() => Ok(ValidPost { text, group_id }),
            _ => Err(PostError::Invalid(errors)),
        }
    }
}
