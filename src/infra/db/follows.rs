use async_trait::async_trait;

use crate::{
    application::repos::{FollowsRepo, RepoError},
    domain::{entities::AuthorRecord, follows::FollowEdge},
};

use super::{PostgresRepositories, authors::AuthorRow, map_sqlx_error};

#[async_trait]
impl FollowsRepo for PostgresRepositories {
    async fn insert_follow(&self, edge: FollowEdge) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(edge.user_id())
        .bind(edge.author_id())
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn follow_exists(&self, user_id: i64, author_id: i64) -> Result<bool, RepoError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)
    }

    async fn list_followed_authors(&self, user_id: i64) -> Result<Vec<AuthorRecord>, RepoError> {
        let rows = sqlx::query_as::<_, AuthorRow>(
            r#"
            SELECT a.id, a.username, a.created_at
            FROM follows f
            INNER JOIN authors a ON a.id = f.author_id
            WHERE f.user_id = $1
            ORDER BY a.username
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(AuthorRecord::from).collect())
    }

    async fn count_followers(&self, author_id: i64) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }
}
