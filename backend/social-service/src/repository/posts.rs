use super::{PostFilter, PostRepository, PostSelection, PostSort};
use crate::domain::{NewPost, PostRecord};
use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// PostgreSQL repository for posts
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: &NewPost) -> Result<Uuid> {
        let (id,) = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO posts (id, title, body, created_date, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.created_date)
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert post")?;

        Ok(id)
    }

    async fn update_content(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, body = $2
            WHERE id = $3 AND author_id = $4
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn delete(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .context("Failed to delete post")?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn select(&self, selection: &PostSelection) -> Result<Vec<PostRecord>> {
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT id, title, body, created_date, author_id, ");

        match &selection.filter {
            PostFilter::Text(term) => {
                query
                    .push("ts_rank(search_vector, plainto_tsquery('english', ")
                    .push_bind(term.clone())
                    .push(")) AS score FROM posts WHERE search_vector @@ plainto_tsquery('english', ")
                    .push_bind(term.clone())
                    .push(")");
            }
            PostFilter::Id(id) => {
                query
                    .push("NULL::real AS score FROM posts WHERE id = ")
                    .push_bind(*id);
            }
            PostFilter::Author(author_id) => {
                query
                    .push("NULL::real AS score FROM posts WHERE author_id = ")
                    .push_bind(*author_id);
            }
            PostFilter::Authors(author_ids) => {
                query
                    .push("NULL::real AS score FROM posts WHERE author_id = ANY(")
                    .push_bind(author_ids.clone())
                    .push(")");
            }
        }

        if let Some(PostSort::Newest) = selection.sort {
            query.push(" ORDER BY created_date DESC");
        }

        query
            .build_query_as::<PostRecord>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to select posts")
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM posts
            WHERE author_id = $1
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count posts")?;

        Ok(count)
    }
}
