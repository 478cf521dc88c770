//! Category listing.

use actix_web::{HttpResponse, web};

use blog_shared::dto::{CategoryPostsResponse, PageQuery};

use super::render;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/category/{slug}?page=
pub async fn posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.blog.category_posts(&path, query.page()).await?;

    Ok(HttpResponse::Ok().json(CategoryPostsResponse {
        category: render::category(page.category),
        posts: render::page(page.posts, render::post),
    }))
}
