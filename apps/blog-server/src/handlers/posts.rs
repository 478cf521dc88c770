//! Post handlers.

use actix_web::{HttpResponse, http::header, web};
use uuid::Uuid;

use blog_core::service::PostDraft;
use blog_shared::dto::{PageQuery, PostForm};

use super::render;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppResult, post_location};
use crate::state::AppState;

fn draft(form: PostForm) -> PostDraft {
    PostDraft {
        title: form.title,
        text: form.text,
        pub_date: form.pub_date,
        category_id: form.category_id,
        location_id: form.location_id,
        image: form.image,
    }
}

/// GET /api/posts?page=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = state.blog.list_posts(query.page()).await?;
    Ok(HttpResponse::Ok().json(render::page(posts, render::post)))
}

/// GET /api/posts/{id}
pub async fn detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let detail = state
        .blog
        .post_detail(path.into_inner(), viewer.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(render::post_detail(detail)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let summary = state
        .blog
        .create_post(identity.user_id, draft(body.into_inner()))
        .await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, post_location(summary.post.id)))
        .json(render::post(summary)))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let summary = state
        .blog
        .update_post(identity.user_id, path.into_inner(), draft(body.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(render::post(summary)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .blog
        .delete_post(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
