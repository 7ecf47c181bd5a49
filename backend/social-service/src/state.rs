use crate::identity::{IdentityDirectory, InMemoryIdentityDirectory, PgIdentityDirectory};
use crate::repository::{
    FollowRepository, InMemoryFollowRepository, InMemoryPostRepository, PgFollowRepository,
    PgPostRepository, PostRepository,
};
use crate::services::{FollowService, PostService, ProfileService, ViewComposer};
use crate::websocket::ChatRelay;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared state handed to every handler and WebSocket session
#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub follows: FollowService,
    pub profiles: ProfileService,
    pub relay: ChatRelay,
}

impl AppState {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        follows: Arc<dyn FollowRepository>,
        identities: Arc<dyn IdentityDirectory>,
    ) -> Self {
        let composer = ViewComposer::new(posts.clone(), follows.clone(), identities.clone());
        let post_service = PostService::new(posts, identities.clone(), composer.clone());
        let follow_service = FollowService::new(follows, identities.clone(), composer);
        let profiles = ProfileService::new(identities, post_service.clone(), follow_service.clone());

        Self {
            posts: post_service,
            follows: follow_service,
            profiles,
            relay: ChatRelay::new(),
        }
    }

    /// PostgreSQL-backed stores sharing one pool
    pub fn with_postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgPostRepository::new(pool.clone())),
            Arc::new(PgFollowRepository::new(pool.clone())),
            Arc::new(PgIdentityDirectory::new(pool)),
        )
    }

    /// In-memory stores; returns the directory so callers can seed identities
    pub fn in_memory() -> (Self, Arc<InMemoryIdentityDirectory>) {
        let identities = Arc::new(InMemoryIdentityDirectory::new());
        let state = Self::new(
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryFollowRepository::new()),
            identities.clone(),
        );
        (state, identities)
    }
}
