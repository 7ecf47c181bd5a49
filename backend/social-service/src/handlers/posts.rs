/// Post handlers - HTTP endpoints for the content store
use crate::domain::RawPostInput;
use crate::error::ServiceResult;
use crate::services::UpdateOutcome;
use crate::state::AppState;
use actix_middleware::{AuthContext, SessionUser};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchTerm", default)]
    pub search_term: Value,
}

pub async fn create_post(
    state: web::Data<AppState>,
    user: SessionUser,
    body: web::Json<RawPostInput>,
) -> ServiceResult<HttpResponse> {
    let id = state.posts.create(&body, &user.id.to_string()).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

pub async fn get_post(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let view = state.posts.find_by_id(&path, auth.visitor_id()).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn update_post(
    state: web::Data<AppState>,
    user: SessionUser,
    path: web::Path<String>,
    body: web::Json<RawPostInput>,
) -> ServiceResult<HttpResponse> {
    match state.posts.update(&body, user.id, &path).await? {
        UpdateOutcome::Success => Ok(HttpResponse::Ok().json(json!({ "status": "success" }))),
        UpdateOutcome::Failure(errors) => Ok(HttpResponse::UnprocessableEntity()
            .json(json!({ "status": "failure", "errors": errors }))),
    }
}

pub async fn delete_post(
    state: web::Data<AppState>,
    user: SessionUser,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    state.posts.delete(&path, user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn search_posts(
    state: web::Data<AppState>,
    body: web::Json<SearchRequest>,
) -> ServiceResult<HttpResponse> {
    let views = state.posts.search(body.search_term.as_str()).await?;
    Ok(HttpResponse::Ok().json(views))
}

pub async fn get_feed(
    state: web::Data<AppState>,
    user: SessionUser,
) -> ServiceResult<HttpResponse> {
    let views = state.posts.feed(user.id).await?;
    Ok(HttpResponse::Ok().json(views))
}

pub async fn get_user_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let views = state.posts.find_by_username(&path).await?;
    Ok(HttpResponse::Ok().json(views))
}
