//! Content store
//!
//! Writes go through the sanitize/validate pipeline in [`PostDraft`]; every read
//! goes through the [`ViewComposer`] so ownership is only ever exposed as the
//! visitor-relative `is_visitor_owner` flag.

use crate::domain::post_draft::TRY_AGAIN_LATER;
use crate::domain::{parse_ref, PostDraft, PostView, RawPostInput};
use crate::error::{ServiceError, ServiceResult};
use crate::identity::IdentityDirectory;
use crate::repository::PostRepository;
use crate::services::view_composer::{PostQuery, ViewComposer, ViewStage};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Result of an ownership-checked update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Success,
    /// Validation messages; the stored post is unchanged
    Failure(Vec<String>),
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    identities: Arc<dyn IdentityDirectory>,
    composer: ViewComposer,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        identities: Arc<dyn IdentityDirectory>,
        composer: ViewComposer,
    ) -> Self {
        Self {
            posts,
            identities,
            composer,
        }
    }

    /// Sanitize, validate and persist a new post
    pub async fn create(&self, raw: &RawPostInput, author_id: &str) -> ServiceResult<Uuid> {
        let new_post = PostDraft::sanitize(raw, parse_ref(author_id))
            .validate()
            .map_err(ServiceError::Validation)?;

        match self.posts.insert(&new_post).await {
            Ok(id) => {
                info!(post_id = %id, author_id = %new_post.author_id, "post created");
                Ok(id)
            }
            Err(e) => {
                error!(error = %e, "failed to insert post");
                Err(ServiceError::Validation(vec![TRY_AGAIN_LATER.to_string()]))
            }
        }
    }

    /// Resolve `post_id` as seen by `requester`, rejecting unless they own it
    async fn owned_post_id(&self, post_id: &str, requester: Uuid) -> ServiceResult<Uuid> {
        match self.composer.single(post_id, Some(requester)).await {
            Ok(view) if view.is_visitor_owner => Ok(view.id),
            Ok(_) | Err(ServiceError::NotFound(_)) => {
                warn!(post_id, requester = %requester, "rejected post mutation by non-owner");
                Err(ServiceError::Forbidden)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn update(
        &self,
        raw: &RawPostInput,
        requester: Uuid,
        post_id: &str,
    ) -> ServiceResult<UpdateOutcome> {
        let post_id = self.owned_post_id(post_id, requester).await?;

        let post = match PostDraft::sanitize(raw, Some(requester)).validate() {
            Ok(post) => post,
            Err(messages) => return Ok(UpdateOutcome::Failure(messages)),
        };

        let updated = self
            .posts
            .update_content(post_id, requester, &post.title, &post.body)
            .await?;
        if !updated {
            return Err(ServiceError::NotFound("Post not found".into()));
        }

        info!(post_id = %post_id, "post updated");
        Ok(UpdateOutcome::Success)
    }

    pub async fn delete(&self, post_id: &str, requester: Uuid) -> ServiceResult<()> {
        let post_id = self.owned_post_id(post_id, requester).await?;

        if !self.posts.delete(post_id, requester).await? {
            return Err(ServiceError::NotFound("Post not found".into()));
        }

        info!(post_id = %post_id, "post deleted");
        Ok(())
    }

    pub async fn find_by_id(&self, post_id: &str, visitor: Option<Uuid>) -> ServiceResult<PostView> {
        self.composer.single(post_id, visitor).await
    }

    /// Author's posts, newest first, without visitor context
    pub async fn find_by_author(&self, author_id: Uuid) -> ServiceResult<Vec<PostView>> {
        self.composer
            .compose(&PostQuery::by_author(author_id).newest_first())
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> ServiceResult<Vec<PostView>> {
        let author = self
            .identities
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound("sorry, invalid user".into()))?;

        self.find_by_author(author.id).await
    }

    /// Full-text search ordered by descending relevance
    pub async fn search(&self, term: Option<&str>) -> ServiceResult<Vec<PostView>> {
        let term = term.map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Err(ServiceError::InvalidInput(
                "search term must be a non-empty string".into(),
            ));
        }

        self.composer
            .compose(&PostQuery::text(term).then(ViewStage::SortByRelevance))
            .await
    }

    pub async fn feed(&self, visitor: Uuid) -> ServiceResult<Vec<PostView>> {
        self.composer.feed(visitor).await
    }

    pub async fn count_by_author(&self, author_id: Uuid) -> ServiceResult<i64> {
        Ok(self.posts.count_by_author(author_id).await?)
    }
}
