//! View composer
//!
//! The one read-side join behind every post and follow-list query. A
//! [`PostQuery`] names the base match/sort, the visitor (if any) and trailing
//! stages that run after the identity join. Composed views never expose the
//! stored author id.

use crate::domain::{parse_ref, Identity, PostRecord, PostView, UserSummary};
use crate::error::{ServiceError, ServiceResult};
use crate::identity::IdentityDirectory;
use crate::repository::{FollowRepository, PostFilter, PostRepository, PostSelection, PostSort};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Stages applied to composed views, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStage {
    /// Highest relevance score first; unscored views sink
    SortByRelevance,
    SortByNewest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostQuery {
    selection: PostSelection,
    visitor: Option<Uuid>,
    stages: Vec<ViewStage>,
}

impl PostQuery {
    pub fn matching(filter: PostFilter) -> Self {
        Self {
            selection: PostSelection { filter, sort: None },
            visitor: None,
            stages: Vec::new(),
        }
    }

    pub fn by_id(post_id: Uuid) -> Self {
        Self::matching(PostFilter::Id(post_id))
    }

    pub fn by_author(author_id: Uuid) -> Self {
        Self::matching(PostFilter::Author(author_id))
    }

    pub fn by_authors(author_ids: Vec<Uuid>) -> Self {
        Self::matching(PostFilter::Authors(author_ids))
    }

    pub fn text(term: impl Into<String>) -> Self {
        Self::matching(PostFilter::Text(term.into()))
    }

    /// Ask the store for newest-first order
    pub fn newest_first(mut self) -> Self {
        self.selection.sort = Some(PostSort::Newest);
        self
    }

    pub fn visited_by(mut self, visitor: Option<Uuid>) -> Self {
        self.visitor = visitor;
        self
    }

    pub fn then(mut self, stage: ViewStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn selection(&self) -> &PostSelection {
        &self.selection
    }
}

fn apply_stage(views: &mut [PostView], stage: ViewStage) {
    match stage {
        ViewStage::SortByRelevance => views.sort_by(|a, b| match (a.score, b.score) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        ViewStage::SortByNewest => views.sort_by(|a, b| b.created_date.cmp(&a.created_date)),
    }
}

#[derive(Clone)]
pub struct ViewComposer {
    posts: Arc<dyn PostRepository>,
    follows: Arc<dyn FollowRepository>,
    identities: Arc<dyn IdentityDirectory>,
}

impl ViewComposer {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        follows: Arc<dyn FollowRepository>,
        identities: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            posts,
            follows,
            identities,
        }
    }

    /// Resolve identities in one batch; lookup failures degrade to "unknown"
    async fn resolve(&self, ids: &[Uuid]) -> HashMap<Uuid, Identity> {
        match self.identities.find_by_ids(ids).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, count = ids.len(), "identity lookup failed, rendering unknown users");
                HashMap::new()
            }
        }
    }

    async fn summaries(&self, ids: Vec<Uuid>) -> Vec<UserSummary> {
        let found = self.resolve(&ids).await;
        ids.iter()
            .map(|id| self.identities.summarize(found.get(id)))
            .collect()
    }

    fn enrich(
        &self,
        record: PostRecord,
        authors: &HashMap<Uuid, Identity>,
        visitor: Option<Uuid>,
    ) -> PostView {
        PostView {
            id: record.id,
            title: record.title,
            body: record.body,
            created_date: record.created_date,
            author: self.identities.summarize(authors.get(&record.author_id)),
            is_visitor_owner: visitor == Some(record.author_id),
            score: record.score,
        }
    }

    /// Run a query: store read, one identity join, then trailing stages
    pub async fn compose(&self, query: &PostQuery) -> ServiceResult<Vec<PostView>> {
        let records = self.posts.select(&query.selection).await.map_err(|e| {
            warn!(error = %e, "post query failed");
            ServiceError::from(e)
        })?;

        let mut author_ids: Vec<Uuid> = records.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors = self.resolve(&author_ids).await;

        let mut views: Vec<PostView> = records
            .into_iter()
            .map(|record| self.enrich(record, &authors, query.visitor))
            .collect();

        for stage in &query.stages {
            apply_stage(&mut views, *stage);
        }

        debug!(count = views.len(), "composed post views");
        Ok(views)
    }

    /// Single post as seen by `visitor`
    pub async fn single(&self, post_id: &str, visitor: Option<Uuid>) -> ServiceResult<PostView> {
        let post_id =
            parse_ref(post_id).ok_or_else(|| ServiceError::NotFound("Invalid ID".into()))?;

        self.compose(&PostQuery::by_id(post_id).visited_by(visitor))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound("Post not found".into()))
    }

    /// Posts from everyone the visitor follows, newest first
    pub async fn feed(&self, visitor: Uuid) -> ServiceResult<Vec<PostView>> {
        let following = self.follows.following_ids(visitor).await?;
        if following.is_empty() {
            return Ok(Vec::new());
        }

        self.compose(
            &PostQuery::by_authors(following)
                .newest_first()
                .visited_by(Some(visitor)),
        )
        .await
    }

    pub async fn followers_of(&self, id: Uuid) -> ServiceResult<Vec<UserSummary>> {
        let ids = self.follows.follower_ids(id).await?;
        Ok(self.summaries(ids).await)
    }

    pub async fn following_of(&self, id: Uuid) -> ServiceResult<Vec<UserSummary>> {
        let ids = self.follows.following_ids(id).await?;
        Ok(self.summaries(ids).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn view(score: Option<f32>, age_minutes: i64) -> PostView {
        PostView {
            id: Uuid::new_v4(),
            title: "t".into(),
            body: "b".into(),
            created_date: Utc::now() - Duration::minutes(age_minutes),
            author: UserSummary {
                username: "u".into(),
                avatar: "a".into(),
            },
            is_visitor_owner: false,
            score,
        }
    }

    #[test]
    fn test_relevance_stage_orders_descending() {
        let mut views = vec![view(Some(0.2), 0), view(None, 0), view(Some(0.9), 0)];
        apply_stage(&mut views, ViewStage::SortByRelevance);
        let scores: Vec<_> = views.iter().map(|v| v.score).collect();
        assert_eq!(scores, vec![Some(0.9), Some(0.2), None]);
    }

    #[test]
    fn test_newest_stage() {
        let mut views = vec![view(None, 10), view(None, 1), view(None, 5)];
        let newest = views[1].id;
        apply_stage(&mut views, ViewStage::SortByNewest);
        assert_eq!(views[0].id, newest);
    }

    #[test]
    fn test_query_builder() {
        let visitor = Uuid::new_v4();
        let query = PostQuery::text("hello")
            .visited_by(Some(visitor))
            .then(ViewStage::SortByRelevance);
        assert_eq!(query.selection().filter, PostFilter::Text("hello".into()));
        assert_eq!(query.selection().sort, None);
        assert_eq!(query.stages, vec![ViewStage::SortByRelevance]);
        assert_eq!(query.visitor, Some(visitor));

        let query = PostQuery::by_author(visitor).newest_first();
        assert_eq!(query.selection().sort, Some(PostSort::Newest));
    }
}
