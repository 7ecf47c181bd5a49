//! Session authentication middleware
//!
//! Resolves the caller from a bearer token (or the `token` query parameter, which
//! WebSocket clients use because browsers cannot set headers on an upgrade) and
//! stores an [`AuthContext`] in the request extensions.
//!
//! Unlike a hard auth gate, a missing or invalid token yields an anonymous context.
//! Routes that need a logged-in user extract [`SessionUser`] instead, which rejects
//! with 401.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub const UNAUTHORIZED_MESSAGE: &str = "You must be logged in to perform that action.";

/// Identity carried by a logged-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
}

/// Per-request (or per-connection) authentication context
///
/// Built once from the session layer and passed explicitly to whatever needs the
/// caller's identity.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    user: Option<SessionUser>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn visitor_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// Claims expected in a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub username: String,
    pub avatar: String,
    pub exp: usize,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("malformed user id in session")]
    MalformedUserId,
}

/// Verification keys for session tokens (HS256)
#[derive(Clone)]
pub struct SessionKeys {
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validate a token and turn its claims into a session user
    pub fn resolve(&self, token: &str) -> Result<SessionUser, SessionError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)?;
        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| SessionError::MalformedUserId)?;

        Ok(SessionUser {
            id,
            username: data.claims.username,
            avatar: data.claims.avatar,
        })
    }
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    from_header.or_else(|| {
        web::Query::<TokenQuery>::from_query(req.query_string())
            .ok()
            .and_then(|q| q.into_inner().token)
    })
}

/// Session authentication middleware
#[derive(Clone)]
pub struct SessionAuth {
    keys: Arc<SessionKeys>,
}

impl SessionAuth {
    pub fn new(keys: SessionKeys) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service,
            keys: self.keys.clone(),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: S,
    keys: Arc<SessionKeys>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let context = match extract_token(&req) {
            Some(token) => match self.keys.resolve(&token) {
                Ok(user) => AuthContext::authenticated(user),
                Err(e) => {
                    tracing::debug!(error = %e, "session token rejected, continuing anonymously");
                    AuthContext::anonymous()
                }
            },
            None => AuthContext::anonymous(),
        };

        req.extensions_mut().insert(context);

        let fut = self.service.call(req);
        Box::pin(async move { fut.await })
    }
}

impl actix_web::FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let context = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default();
        ready(Ok(context))
    }
}

/// 401 with the same JSON body shape the services use for their errors
fn unauthorized() -> Error {
    let response = actix_web::HttpResponse::Unauthorized().json(serde_json::json!({
        "error": UNAUTHORIZED_MESSAGE,
        "status": 401,
    }));
    actix_web::error::InternalError::from_response(UNAUTHORIZED_MESSAGE, response).into()
}

impl actix_web::FromRequest for SessionUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req
            .extensions()
            .get::<AuthContext>()
            .and_then(|ctx| ctx.user().cloned())
        {
            Some(user) => ready(Ok(user)),
            None => ready(Err(unauthorized())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App, HttpResponse};
    use jsonwebtoken::{EncodingKey, Header};

    const SECRET: &[u8] = b"test-secret";

    fn token_for(sub: &str, exp_offset_secs: i64) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            username: "alice".to_string(),
            avatar: "https://gravatar.com/avatar/abc?s=128".to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset_secs) as usize,
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    async fn whoami(ctx: AuthContext) -> HttpResponse {
        match ctx.user() {
            Some(user) => HttpResponse::Ok().body(user.username.clone()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    async fn private(user: SessionUser) -> HttpResponse {
        HttpResponse::Ok().body(user.id.to_string())
    }

    #[::core::prelude::v1::test]
    fn test_resolve_valid_token() {
        let id = Uuid::new_v4();
        let keys = SessionKeys::from_secret(SECRET);
        let user = keys.resolve(&token_for(&id.to_string(), 3600)).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
    }

    #[::core::prelude::v1::test]
    fn test_resolve_rejects_expired_and_malformed() {
        let keys = SessionKeys::from_secret(SECRET);
        assert!(matches!(
            keys.resolve(&token_for(&Uuid::new_v4().to_string(), -3600)),
            Err(SessionError::InvalidToken(_))
        ));
        assert!(matches!(
            keys.resolve(&token_for("not-a-uuid", 3600)),
            Err(SessionError::MalformedUserId)
        ));
    }

    #[actix_web::test]
    async fn test_anonymous_context_when_no_token() {
        let app = test::init_service(
            App::new()
                .wrap(SessionAuth::new(SessionKeys::from_secret(SECRET)))
                .route("/whoami", web::get().to(whoami))
                .route("/private", web::get().to(private)),
        )
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "anonymous");

        let req = test::TestRequest::get().uri("/private").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], UNAUTHORIZED_MESSAGE);
        assert_eq!(body["status"], 401);
    }

    #[actix_web::test]
    async fn test_token_from_header_and_query() {
        let app = test::init_service(
            App::new()
                .wrap(SessionAuth::new(SessionKeys::from_secret(SECRET)))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let token = token_for(&Uuid::new_v4().to_string(), 3600);

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "alice");

        let req = test::TestRequest::get()
            .uri(&format!("/whoami?token={}", token))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "alice");
    }

    #[actix_web::test]
    async fn test_invalid_token_is_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(SessionAuth::new(SessionKeys::from_secret(SECRET)))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", "Bearer garbage"))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "anonymous");
    }
}
