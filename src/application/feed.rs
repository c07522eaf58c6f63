//! Feed composition: paginated post listings and single-post detail.

use std::num::NonZeroU32;
use std::sync::Arc;

use thiserror::Error;

use crate::application::pagination::{Page, PageNumber, PageWindow};
use crate::application::repos::{
    AuthorsRepo, CommentsRepo, FollowsRepo, GroupsRepo, PostListScope, PostsRepo, RepoError,
};
use crate::domain::entities::{AuthorRecord, CommentEntry, GroupRecord, PostEntry};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("unknown group `{0}`")]
    UnknownGroup(String),
    #[error("unknown author `{0}`")]
    UnknownAuthor(String),
    #[error("post {0} not found")]
    PostNotFound(i64),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct GroupFeed {
    pub group: GroupRecord,
    pub page: Page<PostEntry>,
}

pub struct ProfileFeed {
    pub author: AuthorRecord,
    pub page: Page<PostEntry>,
    pub follower_count: u64,
    /// `None` when the viewer is anonymous or looking at their own profile.
    pub viewer_follows: Option<bool>,
}

impl ProfileFeed {
    pub fn post_count(&self) -> u64 {
        self.page.window.total
    }
}

pub struct PostDetail {
    pub entry: PostEntry,
    pub comments: Vec<CommentEntry>,
    pub author_post_count: u64,
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    authors: Arc<dyn AuthorsRepo>,
    groups: Arc<dyn GroupsRepo>,
    comments: Arc<dyn CommentsRepo>,
    follows: Arc<dyn FollowsRepo>,
    page_size: NonZeroU32,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        authors: Arc<dyn AuthorsRepo>,
        groups: Arc<dyn GroupsRepo>,
        comments: Arc<dyn CommentsRepo>,
        follows: Arc<dyn FollowsRepo>,
        page_size: NonZeroU32,
    ) -> Self {
        Self {
            posts,
            authors,
            groups,
            comments,
            follows,
            page_size,
        }
    }

    pub fn page_size(&self) -> NonZeroU32 {
        self.page_size
    }

    pub async fn global_feed(&self, page: PageNumber) -> Result<Page<PostEntry>, FeedError> {
        self.paginate(PostListScope::All, page).await
    }

    pub async fn group_feed(&self, slug: &str, page: PageNumber) -> Result<GroupFeed, FeedError> {
        let group = self
            .groups
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| FeedError::UnknownGroup(slug.to_string()))?;

        let page = self.paginate(PostListScope::Group(group.id), page).await?;
        Ok(GroupFeed { group, page })
    }

    pub async fn profile_feed(
        &self,
        username: &str,
        viewer: Option<&AuthorRecord>,
        page: PageNumber,
    ) -> Result<ProfileFeed, FeedError> {
        let author = self
            .authors
            .find_by_username(username)
            .await?
            .ok_or_else(|| FeedError::UnknownAuthor(username.to_string()))?;

        let page = self.paginate(PostListScope::Author(author.id), page).await?;
        let follower_count = self.follows.count_followers(author.id).await?;
        let viewer_follows = match viewer {
            Some(viewer) if viewer.id != author.id => {
                Some(self.follows.follow_exists(viewer.id, author.id).await?)
            }
            _ => None,
        };

        Ok(ProfileFeed {
            author,
            page,
            follower_count,
            viewer_follows,
        })
    }

    /// Posts by the authors `user` follows, resolved against the current edge set.
    pub async fn personalized_feed(
        &self,
        user: &AuthorRecord,
        page: PageNumber,
    ) -> Result<Page<PostEntry>, FeedError> {
        self.paginate(PostListScope::FollowedBy(user.id), page)
            .await
    }

    pub async fn post_detail(&self, id: i64) -> Result<PostDetail, FeedError> {
        let entry = self
            .posts
            .find_post(id)
            .await?
            .ok_or(FeedError::PostNotFound(id))?;

        let comments = self.comments.list_comments(id).await?;
        let author_post_count = self
            .posts
            .count_posts(PostListScope::Author(entry.author.id))
            .await?;

        Ok(PostDetail {
            entry,
            comments,
            author_post_count,
        })
    }

    async fn paginate(
        &self,
        scope: PostListScope,
        page: PageNumber,
    ) -> Result<Page<PostEntry>, FeedError> {
        let total = self.posts.count_posts(scope).await?;
        let window = PageWindow::resolve(total, self.page_size, page);
        let items = if window.expected_len() == 0 {
            Vec::new()
        } else {
            self.posts.list_posts(scope, window).await?
        };
        Ok(Page::new(items, window))
    }
}
