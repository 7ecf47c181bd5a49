use crate::domain::{ProfileCounts, ProfileView};
use crate::error::{ServiceError, ServiceResult};
use crate::identity::IdentityDirectory;
use crate::services::{FollowService, PostService};
use actix_middleware::AuthContext;
use std::sync::Arc;

/// Profile header shared by the posts/followers/following pages
#[derive(Clone)]
pub struct ProfileService {
    identities: Arc<dyn IdentityDirectory>,
    posts: PostService,
    follows: FollowService,
}

impl ProfileService {
    pub fn new(
        identities: Arc<dyn IdentityDirectory>,
        posts: PostService,
        follows: FollowService,
    ) -> Self {
        Self {
            identities,
            posts,
            follows,
        }
    }

    pub async fn summary(&self, username: &str, auth: &AuthContext) -> ServiceResult<ProfileView> {
        let profile = self
            .identities
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound("sorry, invalid user".into()))?;

        let visitor = auth.visitor_id();
        let (is_following, post_count, follower_count, following_count) = tokio::try_join!(
            self.follows.is_following(profile.id, visitor),
            self.posts.count_by_author(profile.id),
            self.follows.count_followers(profile.id),
            self.follows.count_following(profile.id),
        )?;

        Ok(ProfileView {
            avatar: self.identities.derive_avatar(&profile.email),
            username: profile.username,
            is_visitors_profile: visitor == Some(profile.id),
            is_following,
            counts: ProfileCounts {
                post_count,
                follower_count,
                following_count,
            },
        })
    }

    /// Resolve a username to the id the follow lists are keyed on
    pub async fn resolve_id(&self, username: &str) -> ServiceResult<uuid::Uuid> {
        self.identities
            .find_by_username(username)
            .await?
            .map(|identity| identity.id)
            .ok_or_else(|| ServiceError::NotFound("sorry, invalid user".into()))
    }
}
