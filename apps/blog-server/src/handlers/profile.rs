//! Profile handlers.

use actix_web::{HttpResponse, web};

use blog_core::service::ProfileDraft;
use blog_shared::dto::{PageQuery, ProfileForm, ProfileResponse};

use super::render;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/profile/{username}?page=
///
/// The owner sees every post they wrote; other viewers only live ones.
pub async fn show(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let profile = state
        .blog
        .profile(&path, viewer.user_id(), query.page())
        .await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        profile: render::public_user(profile.user),
        is_owner: profile.is_owner,
        posts: render::page(profile.posts, render::post),
    }))
}

/// PUT /api/profile
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ProfileForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();
    let user = state
        .blog
        .update_profile(
            identity.user_id,
            ProfileDraft {
                first_name: form.first_name,
                last_name: form.last_name,
                username: form.username,
                email: form.email,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(render::account(user)))
}
