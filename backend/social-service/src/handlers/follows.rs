/// Follow handlers - HTTP endpoints for the relationship store
use crate::error::ServiceResult;
use crate::state::AppState;
use actix_middleware::SessionUser;
use actix_web::{web, HttpResponse};

pub async fn follow_user(
    state: web::Data<AppState>,
    user: SessionUser,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    state.follows.create(&path, user.id).await?;
    Ok(HttpResponse::Created().finish())
}

pub async fn unfollow_user(
    state: web::Data<AppState>,
    user: SessionUser,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    state.follows.delete(&path, user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_followers(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let id = state.profiles.resolve_id(&path).await?;
    let followers = state.follows.get_followers(id).await?;
    Ok(HttpResponse::Ok().json(followers))
}

pub async fn get_following(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let id = state.profiles.resolve_id(&path).await?;
    let following = state.follows.get_following(id).await?;
    Ok(HttpResponse::Ok().json(following))
}
