use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::{
    application::{
        pagination::PageWindow,
        repos::{
            CreatePostParams, PostListScope, PostsRepo, PostsWriteRepo, RepoError,
            UpdatePostParams,
        },
    },
    domain::entities::{AuthorRecord, GroupRecord, PostEntry, PostRecord},
};

use super::{PostgresRepositories, map_sqlx_error};

const POST_ENTRY_SELECT: &str = "SELECT p.id, p.text, p.author_id, p.group_id, p.image, p.created_at, \
    a.username AS author_username, a.created_at AS author_created_at, \
    g.title AS group_title, g.slug AS group_slug, g.description AS group_description \
    FROM posts p \
    INNER JOIN authors a ON a.id = p.author_id \
    LEFT JOIN groups g ON g.id = p.group_id";

const POST_ORDER: &str = " ORDER BY p.created_at DESC, p.id DESC";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    text: String,
    author_id: i64,
    group_id: Option<i64>,
    image: Option<String>,
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            author_id: row.author_id,
            group_id: row.group_id,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostEntryRow {
    id: i64,
    text: String,
    author_id: i64,
    group_id: Option<i64>,
    image: Option<String>,
    created_at: OffsetDateTime,
    author_username: String,
    author_created_at: OffsetDateTime,
    group_title: Option<String>,
    group_slug: Option<String>,
    group_description: Option<String>,
}

impl From<PostEntryRow> for PostEntry {
    fn from(row: PostEntryRow) -> Self {
        let group = match (row.group_id, row.group_title, row.group_slug) {
            (Some(id), Some(title), Some(slug)) => Some(GroupRecord {
                id,
                title,
                slug,
                description: row.group_description.unwrap_or_default(),
            }),
            _ => None,
        };

        Self {
            post: PostRecord {
                id: row.id,
                text: row.text,
                author_id: row.author_id,
                group_id: row.group_id,
                image: row.image,
                created_at: row.created_at,
            },
            author: AuthorRecord {
                id: row.author_id,
                username: row.author_username,
                created_at: row.author_created_at,
            },
            group,
        }
    }
}

fn to_i64(value: u64, what: &str) -> Result<i64, RepoError> {
    i64::try_from(value).map_err(|_| RepoError::InvalidInput {
        message: format!("{what} exceeds supported range"),
    })
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn count_posts(&self, scope: PostListScope) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        Self::push_scope_conditions(&mut qb, scope);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }

    async fn list_posts(
        &self,
        scope: PostListScope,
        window: PageWindow,
    ) -> Result<Vec<PostEntry>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_ENTRY_SELECT);
        Self::push_scope_conditions(&mut qb, scope);
        qb.push(POST_ORDER);
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(window.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(to_i64(window.offset(), "page offset")?);

        let rows = qb
            .build_query_as::<PostEntryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostEntry::from).collect())
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostEntry>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_ENTRY_SELECT);
        qb.push(" WHERE p.id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<PostEntryRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostEntry::from))
    }
}

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (text, author_id, group_id, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, text, author_id, group_id, image, created_at
            "#,
        )
        .bind(&params.text)
        .bind(params.author_id)
        .bind(params.group_id)
        .bind(params.image.as_deref())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET text = $2, group_id = $3
            WHERE id = $1
            RETURNING id, text, author_id, group_id, image, created_at
            "#,
        )
        .bind(params.id)
        .bind(&params.text)
        .bind(params.group_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(PostRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
