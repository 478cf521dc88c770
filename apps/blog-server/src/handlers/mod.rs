//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod health;
mod posts;
mod profile;
mod render;

#[cfg(test)]
mod tests;

use actix_web::{HttpRequest, HttpResponse, web};
use blog_shared::ErrorResponse;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        tracing::debug!("Unparsable path {}: {}", req.path(), err);
        AppError::NotFound(format!("No resource at {}", req.path())).into()
    }))
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Posts and their comments
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list))
                    .route(web::post().to(posts::create)),
            )
            .service(
                web::resource("/posts/{id}")
                    .route(web::get().to(posts::detail))
                    .route(web::put().to(posts::update))
                    .route(web::delete().to(posts::delete)),
            )
            .route("/posts/{id}/comments", web::post().to(comments::create))
            .service(
                web::resource("/posts/{id}/comments/{comment_id}")
                    .route(web::put().to(comments::update))
                    .route(web::delete().to(comments::delete)),
            )
            .route("/category/{slug}", web::get().to(categories::posts))
            .route("/profile", web::put().to(profile::update))
            .route("/profile/{username}", web::get().to(profile::show)),
    )
    .default_service(web::to(not_found));
}

/// Fallback for every unmatched route.
async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(
        ErrorResponse::not_found("No such resource").with_instance(req.path().to_string()),
    )
}
