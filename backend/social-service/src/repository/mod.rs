//! Storage seams for posts and follow edges
//!
//! Both traits are implemented by PostgreSQL (source of truth in production) and
//! by in-memory maps (local runs, tests). Writes that guard an invariant are
//! single conditional operations so concurrent callers cannot slip between a
//! check and the write.

use crate::domain::{Follow, NewPost, PostRecord};
use anyhow::Result;
use uuid::Uuid;

pub mod follows;
pub mod memory;
pub mod posts;

pub use follows::PgFollowRepository;
pub use memory::{InMemoryFollowRepository, InMemoryPostRepository};
pub use posts::PgPostRepository;

/// Base match stage of a post query
#[derive(Debug, Clone, PartialEq)]
pub enum PostFilter {
    Id(Uuid),
    Author(Uuid),
    Authors(Vec<Uuid>),
    /// Full-text match; results carry a relevance score
    Text(String),
}

/// Base sort stage applied by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSort {
    Newest,
}

/// What a repository read should return
#[derive(Debug, Clone, PartialEq)]
pub struct PostSelection {
    pub filter: PostFilter,
    pub sort: Option<PostSort>,
}

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a validated post, returning its new id
    async fn insert(&self, post: &NewPost) -> Result<Uuid>;

    /// Replace title/body if `author_id` still owns the post; returns false if nothing matched
    async fn update_content(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<bool>;

    /// Delete if `author_id` still owns the post; returns false if nothing matched
    async fn delete(&self, post_id: Uuid, author_id: Uuid) -> Result<bool>;

    async fn select(&self, selection: &PostSelection) -> Result<Vec<PostRecord>>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<i64>;
}

#[async_trait::async_trait]
pub trait FollowRepository: Send + Sync {
    /// Insert the edge unless it already exists; returns true if a new edge was written
    async fn insert_if_absent(&self, edge: &Follow) -> Result<bool>;

    /// Remove the edge; returns true if an edge was removed
    async fn delete_if_present(&self, edge: &Follow) -> Result<bool>;

    async fn exists(&self, edge: &Follow) -> Result<bool>;

    /// Ids of everyone following `followed_id`, in storage order
    async fn follower_ids(&self, followed_id: Uuid) -> Result<Vec<Uuid>>;

    /// Ids of everyone `author_id` follows, in storage order
    async fn following_ids(&self, author_id: Uuid) -> Result<Vec<Uuid>>;

    async fn count_followers(&self, followed_id: Uuid) -> Result<i64>;

    async fn count_following(&self, author_id: Uuid) -> Result<i64>;
}
