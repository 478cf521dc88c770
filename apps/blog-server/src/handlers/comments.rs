//! Comment handlers. Comments live under the post they belong to.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_shared::dto::CommentForm;

use super::render;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let entry = state
        .blog
        .add_comment(identity.user_id, path.into_inner(), body.into_inner().text)
        .await?;
    Ok(HttpResponse::Created().json(render::comment(entry)))
}

/// PUT /api/posts/{id}/comments/{comment_id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let entry = state
        .blog
        .update_comment(identity.user_id, post_id, comment_id, body.into_inner().text)
        .await?;
    Ok(HttpResponse::Ok().json(render::comment(entry)))
}

/// DELETE /api/posts/{id}/comments/{comment_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .blog
        .delete_comment(identity.user_id, post_id, comment_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
