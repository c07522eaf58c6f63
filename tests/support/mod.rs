#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime, macros::datetime};
use tokio::sync::Mutex;

use yatube::application::authors::AuthorService;
use yatube::application::feed::FeedService;
use yatube::application::follow::FollowService;
use yatube::application::pagination::{DEFAULT_PAGE_SIZE, PageWindow};
use yatube::application::posts::PostService;
use yatube::application::repos::{
    AuthorsRepo, CommentsRepo, CreateCommentParams, CreateGroupParams, CreatePostParams,
    FollowsRepo, GroupsRepo, GroupsWriteRepo, HealthRepo, PostListScope, PostsRepo,
    PostsWriteRepo, RepoError, UpdatePostParams,
};
use yatube::cache::PageCache;
use yatube::config::AuthSettings;
use yatube::domain::entities::{
    AuthorRecord, CommentEntry, CommentRecord, FollowRecord, GroupRecord, PostEntry, PostRecord,
};
use yatube::domain::follows::FollowEdge;
use yatube::infra::http::HttpState;

#[derive(Default)]
struct Tables {
    authors: Vec<AuthorRecord>,
    groups: Vec<GroupRecord>,
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    follows: Vec<FollowRecord>,
    next_id: i64,
    ticks: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps so ordering never depends on wall time.
    fn now(&mut self) -> OffsetDateTime {
        self.ticks += 1;
        datetime!(2024-03-01 9:00 UTC) + Duration::minutes(self.ticks)
    }

    fn entry(&self, post: &PostRecord) -> Option<PostEntry> {
        let author = self.authors.iter().find(|a| a.id == post.author_id)?.clone();
        let group = post
            .group_id
            .and_then(|id| self.groups.iter().find(|g| g.id == id).cloned());
        Some(PostEntry {
            post: post.clone(),
            author,
            group,
        })
    }

    fn in_scope(&self, post: &PostRecord, scope: PostListScope) -> bool {
        match scope {
            PostListScope::All => true,
            PostListScope::Group(id) => post.group_id == Some(id),
            PostListScope::Author(id) => post.author_id == id,
            PostListScope::FollowedBy(user) => self
                .follows
                .iter()
                .any(|f| f.user_id == user && f.author_id == post.author_id),
        }
    }
}

/// In-memory stand-in for every repository trait.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn add_author(&self, username: &str) -> AuthorRecord {
        let mut tables = self.tables.lock().await;
        let author = AuthorRecord {
            id: tables.next_id(),
            username: username.to_string(),
            created_at: tables.now(),
        };
        tables.authors.push(author.clone());
        author
    }

    pub async fn add_group(&self, title: &str, slug: &str) -> GroupRecord {
        let mut tables = self.tables.lock().await;
        let group = GroupRecord {
            id: tables.next_id(),
            title: title.to_string(),
            slug: slug.to_string(),
            description: format!("All about {title}"),
        };
        tables.groups.push(group.clone());
        group
    }

    pub async fn add_post(&self, author: &AuthorRecord, text: &str, group_id: Option<i64>) -> PostRecord {
        self.create_post(CreatePostParams {
            author_id: author.id,
            text: text.to_string(),
            group_id,
            image: None,
        })
        .await
        .expect("in-memory insert")
    }

    pub async fn add_follow(&self, user: &AuthorRecord, author: &AuthorRecord) {
        let edge = FollowEdge::new(user.id, author.id).expect("distinct authors");
        self.insert_follow(edge).await.expect("in-memory insert");
    }

    pub async fn posts(&self) -> Vec<PostRecord> {
        self.tables.lock().await.posts.clone()
    }

    pub async fn comments(&self) -> Vec<CommentRecord> {
        self.tables.lock().await.comments.clone()
    }

    pub async fn follow_count(&self) -> usize {
        self.tables.lock().await.follows.len()
    }
}

#[async_trait]
impl AuthorsRepo for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<AuthorRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.authors.iter().find(|a| a.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AuthorRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.authors.iter().find(|a| a.id == id).cloned())
    }

    async fn ensure_author(&self, username: &str) -> Result<AuthorRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        if let Some(author) = tables.authors.iter().find(|a| a.username == username) {
            return Ok(author.clone());
        }
        let author = AuthorRecord {
            id: tables.next_id(),
            username: username.to_string(),
            created_at: tables.now(),
        };
        tables.authors.push(author.clone());
        Ok(author)
    }
}

#[async_trait]
impl GroupsRepo for InMemoryStore {
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError> {
        let mut groups = self.tables.lock().await.groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn find_group_by_id(&self, id: i64) -> Result<Option<GroupRecord>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }
}

#[async_trait]
impl GroupsWriteRepo for InMemoryStore {
    async fn create_group(&self, params: CreateGroupParams) -> Result<GroupRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        if tables.groups.iter().any(|g| g.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "groups_slug_key".to_string(),
            });
        }
        let group = GroupRecord {
            id: tables.next_id(),
            title: params.title,
            slug: params.slug,
            description: params.description,
        };
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn delete_group(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.groups.len();
        tables.groups.retain(|g| g.id != id);
        if tables.groups.len() == before {
            return Err(RepoError::NotFound);
        }
        for post in tables.posts.iter_mut().filter(|p| p.group_id == Some(id)) {
            post.group_id = None;
        }
        Ok(())
    }
}

#[async_trait]
impl PostsRepo for InMemoryStore {
    async fn count_posts(&self, scope: PostListScope) -> Result<u64, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.posts.iter().filter(|p| tables.in_scope(p, scope)).count() as u64)
    }

    async fn list_posts(
        &self,
        scope: PostListScope,
        window: PageWindow,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let tables = self.tables.lock().await;
        let mut posts: Vec<&PostRecord> = tables
            .posts
            .iter()
            .filter(|p| tables.in_scope(p, scope))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.limit() as usize)
            .filter_map(|p| tables.entry(p))
            .collect())
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostEntry>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| tables.entry(p)))
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryStore {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let post = PostRecord {
            id: tables.next_id(),
            text: params.text,
            author_id: params.author_id,
            group_id: params.group_id,
            image: params.image,
            created_at: tables.now(),
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == params.id)
            .ok_or(RepoError::NotFound)?;
        post.text = params.text;
        post.group_id = params.group_id;
        Ok(post.clone())
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Err(RepoError::NotFound);
        }
        tables.comments.retain(|c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentsRepo for InMemoryStore {
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter_map(|c| {
                let author = tables.authors.iter().find(|a| a.id == c.author_id)?;
                Some(CommentEntry {
                    comment: c.clone(),
                    author: author.clone(),
                })
            })
            .collect())
    }

    async fn create_comment(
        &self,
        params: CreateCommentParams,
    ) -> Result<CommentRecord, RepoError> {
        let mut tables = self.tables.lock().await;
        let comment = CommentRecord {
            id: tables.next_id(),
            post_id: params.post_id,
            author_id: params.author_id,
            text: params.text,
            created_at: tables.now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl FollowsRepo for InMemoryStore {
    async fn insert_follow(&self, edge: FollowEdge) -> Result<bool, RepoError> {
        let mut tables = self.tables.lock().await;
        let exists = tables
            .follows
            .iter()
            .any(|f| f.user_id == edge.user_id() && f.author_id == edge.author_id());
        if exists {
            return Ok(false);
        }
        let known = |id: i64| tables.authors.iter().any(|a| a.id == id);
        if !known(edge.user_id()) || !known(edge.author_id()) {
            return Err(RepoError::InvalidInput {
                message: "follows references a missing author".to_string(),
            });
        }
        let record = FollowRecord {
            id: tables.next_id(),
            user_id: edge.user_id(),
            author_id: edge.author_id(),
            created_at: tables.now(),
        };
        tables.follows.push(record);
        Ok(true)
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let mut tables = self.tables.lock().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() != before)
    }

    async fn follow_exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn list_followed_authors(&self, user_id: i64) -> Result<Vec<AuthorRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut authors: Vec<AuthorRecord> = tables
            .follows
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter_map(|f| tables.authors.iter().find(|a| a.id == f.author_id).cloned())
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(authors)
    }

    async fn count_followers(&self, author_id: i64) -> Result<u64, RepoError> {
        let tables = self.tables.lock().await;
        Ok(tables.follows.iter().filter(|f| f.author_id == author_id).count() as u64)
    }
}

#[async_trait]
impl HealthRepo for InMemoryStore {
    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

pub fn feed_service(store: &Arc<InMemoryStore>) -> FeedService {
    FeedService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        DEFAULT_PAGE_SIZE,
    )
}

pub fn follow_service(store: &Arc<InMemoryStore>) -> FollowService {
    FollowService::new(store.clone(), store.clone())
}

pub fn post_service(store: &Arc<InMemoryStore>) -> PostService {
    PostService::new(store.clone(), store.clone(), store.clone(), store.clone())
}

pub fn http_state(store: &Arc<InMemoryStore>, cache: Option<Arc<PageCache>>) -> HttpState {
    HttpState {
        feed: Arc::new(feed_service(store)),
        posts: Arc::new(post_service(store)),
        follows: Arc::new(follow_service(store)),
        authors: Arc::new(AuthorService::new(store.clone())),
        health: store.clone(),
        auth: AuthSettings::default(),
        cache,
    }
}
