use crate::error::ServiceResult;
use crate::state::AppState;
use actix_middleware::AuthContext;
use actix_web::{web, HttpResponse};

pub async fn get_profile(
    state: web::Data<AppState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ServiceResult<HttpResponse> {
    let profile = state.profiles.summary(&path, &auth).await?;
    Ok(HttpResponse::Ok().json(profile))
}
