//! Relationship store
//!
//! Follow edges are keyed on the ordered pair (follower, followed). The
//! pre-checks collect every applicable problem so callers can report them
//! together; the final write is a single conditional operation, so a
//! concurrent duplicate or double delete still resolves to the right message.

use crate::domain::{Follow, Identity, UserSummary};
use crate::error::{ServiceError, ServiceResult};
use crate::identity::IdentityDirectory;
use crate::repository::FollowRepository;
use crate::services::view_composer::ViewComposer;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub const USER_DOES_NOT_EXIST: &str = "User does not exist.";
pub const ALREADY_FOLLOWING: &str = "You already follow this user.";
pub const NOT_FOLLOWING: &str = "You do not follow this user.";
pub const CANNOT_FOLLOW_SELF: &str = "You cannot follow yourself.";

/// Which direction a follow mutation goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeChange {
    Add,
    Remove,
}

#[derive(Clone)]
pub struct FollowService {
    follows: Arc<dyn FollowRepository>,
    identities: Arc<dyn IdentityDirectory>,
    composer: ViewComposer,
}

impl FollowService {
    pub fn new(
        follows: Arc<dyn FollowRepository>,
        identities: Arc<dyn IdentityDirectory>,
        composer: ViewComposer,
    ) -> Self {
        Self {
            follows,
            identities,
            composer,
        }
    }

    /// Resolve the target and run the pre-checks for `change`
    async fn prepare(
        &self,
        followed_username: &str,
        author_id: Uuid,
        change: EdgeChange,
    ) -> ServiceResult<Follow> {
        let target: Option<Identity> = self.identities.find_by_username(followed_username).await?;
        let Some(target) = target else {
            return Err(ServiceError::Validation(vec![USER_DOES_NOT_EXIST.to_string()]));
        };

        let edge = Follow::new(target.id, author_id);
        let mut errors = Vec::new();

        let exists = self.follows.exists(&edge).await?;
        match change {
            EdgeChange::Add if exists => errors.push(ALREADY_FOLLOWING.to_string()),
            EdgeChange::Remove if !exists => errors.push(NOT_FOLLOWING.to_string()),
            _ => {}
        }
        if edge.is_self_follow() {
            errors.push(CANNOT_FOLLOW_SELF.to_string());
        }

        if errors.is_empty() {
            Ok(edge)
        } else {
            Err(ServiceError::Validation(errors))
        }
    }

    pub async fn create(&self, followed_username: &str, author_id: Uuid) -> ServiceResult<()> {
        let edge = self
            .prepare(followed_username, author_id, EdgeChange::Add)
            .await?;

        if !self.follows.insert_if_absent(&edge).await? {
            return Err(ServiceError::Validation(vec![ALREADY_FOLLOWING.to_string()]));
        }

        info!(follower = %author_id, followed = %edge.followed_id, "follow created");
        Ok(())
    }

    pub async fn delete(&self, followed_username: &str, author_id: Uuid) -> ServiceResult<()> {
        let edge = self
            .prepare(followed_username, author_id, EdgeChange::Remove)
            .await?;

        if !self.follows.delete_if_present(&edge).await? {
            return Err(ServiceError::Validation(vec![NOT_FOLLOWING.to_string()]));
        }

        info!(follower = %author_id, followed = %edge.followed_id, "follow removed");
        Ok(())
    }

    /// False for anonymous visitors
    pub async fn is_following(&self, followed_id: Uuid, visitor: Option<Uuid>) -> ServiceResult<bool> {
        match visitor {
            Some(visitor) => Ok(self.follows.exists(&Follow::new(followed_id, visitor)).await?),
            None => Ok(false),
        }
    }

    pub async fn get_followers(&self, id: Uuid) -> ServiceResult<Vec<UserSummary>> {
        self.composer.followers_of(id).await
    }

    pub async fn get_following(&self, id: Uuid) -> ServiceResult<Vec<UserSummary>> {
        self.composer.following_of(id).await
    }

    pub async fn count_followers(&self, id: Uuid) -> ServiceResult<i64> {
        Ok(self.follows.count_followers(id).await?)
    }

    pub async fn count_following(&self, id: Uuid) -> ServiceResult<i64> {
        Ok(self.follows.count_following(id).await?)
    }
}
