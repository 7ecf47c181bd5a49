use super::FollowRepository;
use crate::domain::Follow;
use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL repository for follow edges
///
/// Uniqueness and the no-self-follow rule are also enforced by the table
/// (primary key on the ordered pair, CHECK constraint).
#[derive(Clone)]
pub struct PgFollowRepository {
    pool: PgPool,
}

impl PgFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FollowRepository for PgFollowRepository {
    async fn insert_if_absent(&self, edge: &Follow) -> Result<bool> {
        let inserted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO follows (followed_id, author_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (followed_id, author_id) DO NOTHING
            RETURNING followed_id
            "#,
        )
        .bind(edge.followed_id)
        .bind(edge.author_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to insert follow")?;

        Ok(inserted.is_some())
    }

    async fn delete_if_present(&self, edge: &Follow) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE followed_id = $1 AND author_id = $2
            "#,
        )
        .bind(edge.followed_id)
        .bind(edge.author_id)
        .execute(&self.pool)
        .await
        .context("Failed to delete follow")?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn exists(&self, edge: &Follow) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows
                WHERE followed_id = $1 AND author_id = $2
            )
            "#,
        )
        .bind(edge.followed_id)
        .bind(edge.author_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check follow")?;

        Ok(exists)
    }

    async fn follower_ids(&self, followed_id: Uuid) -> Result<Vec<Uuid>> {
        sqlx::query_scalar(
            r#"
            SELECT author_id FROM follows
            WHERE followed_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(followed_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list followers")
    }

    async fn following_ids(&self, author_id: Uuid) -> Result<Vec<Uuid>> {
        sqlx::query_scalar(
            r#"
            SELECT followed_id FROM follows
            WHERE author_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list following")
    }

    async fn count_followers(&self, followed_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE followed_id = $1")
                .bind(followed_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to count followers")?;
        Ok(count)
    }

    async fn count_following(&self, author_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count following")?;
        Ok(count)
    }
}
