#![allow(dead_code)]

use actix_middleware::{AuthContext, SessionClaims, SessionUser};
use jsonwebtoken::{encode, EncodingKey, Header};
use social_service::domain::Identity;
use social_service::identity::{gravatar_url, InMemoryIdentityDirectory};
use social_service::state::AppState;
use std::sync::Arc;
use uuid::Uuid;

pub const SECRET: &[u8] = b"social-service-test-secret";

pub struct Fixture {
    pub state: AppState,
    pub identities: Arc<InMemoryIdentityDirectory>,
}

impl Fixture {
    pub fn new() -> Self {
        let (state, identities) = AppState::in_memory();
        Self { state, identities }
    }

    /// Seed an identity and return it
    pub async fn user(&self, username: &str) -> Identity {
        let identity = Identity {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
        };
        self.identities.insert(identity.clone()).await;
        identity
    }
}

pub fn session_user(identity: &Identity) -> SessionUser {
    SessionUser {
        id: identity.id,
        username: identity.username.clone(),
        avatar: gravatar_url(&identity.email),
    }
}

pub fn auth(identity: &Identity) -> AuthContext {
    AuthContext::authenticated(session_user(identity))
}

/// Signed session token for `identity`, valid for an hour
pub fn token_for(identity: &Identity) -> String {
    let claims = SessionClaims {
        sub: identity.id.to_string(),
        username: identity.username.clone(),
        avatar: gravatar_url(&identity.email),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET))
        .expect("failed to sign test token")
}
