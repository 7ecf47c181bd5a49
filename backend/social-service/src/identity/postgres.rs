use super::IdentityDirectory;
use crate::domain::Identity;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Read-only view of the identity service's `users` table
#[derive(Clone)]
pub struct PgIdentityDirectory {
    pool: PgPool,
}

impl PgIdentityDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IdentityDirectory for PgIdentityDirectory {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>> {
        sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, email
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up user by username")
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, email
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up user by id")
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Identity>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let identities = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, email
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to batch look up users")?;

        Ok(identities.into_iter().map(|i| (i.id, i)).collect())
    }
}
