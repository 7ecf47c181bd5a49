//! HTTP surface
//!
//! Thin adapters: every handler extracts its inputs and calls one service
//! operation. Errors are rendered by `ServiceError`'s `ResponseError` impl.

pub mod follows;
pub mod posts;
pub mod profile;

use crate::routes::wsroute::ws_handler;
use actix_web::{web, HttpResponse};

pub use follows::*;
pub use posts::*;
pub use profile::*;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/ws", web::get().to(ws_handler))
        .service(
            web::scope("/api")
                .route("/feed", web::get().to(get_feed))
                .service(
                    web::scope("/posts")
                        .route("", web::post().to(create_post))
                        .route("/search", web::post().to(search_posts))
                        .route("/{id}", web::get().to(get_post))
                        .route("/{id}", web::put().to(update_post))
                        .route("/{id}", web::delete().to(delete_post)),
                )
                .service(
                    web::scope("/users/{username}")
                        .route("/posts", web::get().to(get_user_posts))
                        .route("/profile", web::get().to(get_profile))
                        .route("/followers", web::get().to(get_followers))
                        .route("/following", web::get().to(get_following)),
                )
                .service(
                    web::scope("/follows")
                        .route("/{username}", web::post().to(follow_user))
                        .route("/{username}", web::delete().to(unfollow_user)),
                ),
        );
}
