use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{CreateGroupParams, GroupsRepo, GroupsWriteRepo, RepoError};
use crate::domain::entities::GroupRecord;
use crate::domain::slug::{SlugError, derive_slug, validate_slug};

pub const MAX_TITLE_LENGTH: usize = 200;

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("group title must not be empty")]
    EmptyTitle,
    #[error("group title exceeds {MAX_TITLE_LENGTH} characters")]
    TitleTooLong,
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("group slug `{0}` is already taken")]
    DuplicateSlug(String),
    #[error("group `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateGroupCommand {
    pub title: String,
    pub slug: Option<String>,
    pub description: String,
}

#[derive(Clone)]
pub struct GroupService {
    reader: Arc<dyn GroupsRepo>,
    writer: Arc<dyn GroupsWriteRepo>,
}

impl GroupService {
    pub fn new(reader: Arc<dyn GroupsRepo>, writer: Arc<dyn GroupsWriteRepo>) -> Self {
        Self { reader, writer }
    }

    pub async fn list(&self) -> Result<Vec<GroupRecord>, GroupError> {
        Ok(self.reader.list_groups().await?)
    }

    pub async fn create(&self, command: CreateGroupCommand) -> Result<GroupRecord, GroupError> {
        let title = command.title.trim().to_string();
        if title.is_empty() {
            return Err(GroupError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(GroupError::TitleTooLong);
        }

        let slug = match command.slug {
            Some(slug) => {
                let slug = slug.trim().to_string();
                validate_slug(&slug)?;
                slug
            }
            None => derive_slug(&title)?,
        };

        if self.reader.find_group_by_slug(&slug).await?.is_some() {
            return Err(GroupError::DuplicateSlug(slug));
        }

        let group = self
            .writer
            .create_group(CreateGroupParams {
                title,
                slug: slug.clone(),
                description: command.description.trim().to_string(),
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => GroupError::DuplicateSlug(slug),
                other => GroupError::Repo(other),
            })?;

        info!(target = "yatube::groups", slug = %group.slug, "group created");
        Ok(group)
    }

    /// Remove a group by slug; posts filed under it become ungrouped.
    pub async fn delete(&self, slug: &str) -> Result<GroupRecord, GroupError> {
        let group = self
            .reader
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| GroupError::NotFound(slug.to_string()))?;

        self.writer.delete_group(group.id).await?;
        info!(target = "yatube::groups", slug = %group.slug, "group deleted");
        Ok(group)
    }
}
