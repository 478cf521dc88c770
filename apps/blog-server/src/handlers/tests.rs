//! HTTP tests against the in-memory state.

use std::sync::Arc;

use actix_web::{App, http::StatusCode, http::header, test, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use blog_core::domain::{Category, Comment, Post, User};
use blog_core::ports::{PasswordService, TokenService};
use blog_core::service::Repositories;
use blog_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

struct TestContext {
    state: AppState,
    repos: Repositories,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl TestContext {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let repos = store.repositories();
        Self {
            state: AppState::from_repositories(repos.clone(), None, 10),
            repos,
            tokens: Arc::new(JwtTokenService::new(JwtConfig {
                secret: "handler-test-secret".to_string(),
                ..JwtConfig::default()
            })),
            passwords: Arc::new(Argon2PasswordService::new()),
        }
    }

    async fn user(&self, username: &str) -> (User, String) {
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "unused".to_string(),
        );
        let user = self.repos.users.save(user).await.unwrap();
        let token = self.tokens.generate_token(user.id, &user.username).unwrap();
        (user, format!("Bearer {}", token))
    }

    async fn post(&self, post: Post) -> Post {
        self.repos.posts.save(post).await.unwrap()
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.state.clone()))
                .app_data(web::Data::new($ctx.tokens.clone()))
                .app_data(web::Data::new($ctx.passwords.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn post_body(title: &str) -> Value {
    json!({
        "title": title,
        "text": "Body text",
        "pub_date": Utc::now() - Duration::hours(1),
    })
}

fn titles(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn test_scheduled_post_only_in_owner_profile() {
    let ctx = TestContext::new();
    let (anna, anna_auth) = ctx.user("anna").await;
    let tomorrow = Utc::now() + Duration::days(1);
    ctx.post(Post::new(anna.id, "Tomorrow".into(), "Soon".into(), tomorrow))
        .await;
    ctx.post(Post::new(anna.id, "Today".into(), "Now".into(), Utc::now() - Duration::hours(1)))
        .await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let listing: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&listing), vec!["Today"]);

    let req = test::TestRequest::get()
        .uri("/api/profile/anna")
        .insert_header((header::AUTHORIZATION, anna_auth))
        .to_request();
    let own: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(own["is_owner"], true);
    assert_eq!(titles(&own["posts"]), vec!["Tomorrow", "Today"]);

    let req = test::TestRequest::get().uri("/api/profile/anna").to_request();
    let public: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(public["is_owner"], false);
    assert_eq!(titles(&public["posts"]), vec!["Today"]);
}

#[actix_web::test]
async fn test_hidden_category_hides_posts_and_listing() {
    let ctx = TestContext::new();
    let (anna, _) = ctx.user("anna").await;
    let category = ctx
        .repos
        .categories
        .save(Category::new("Travel".into(), "Trips".into(), "travel".into()).hidden())
        .await
        .unwrap();
    ctx.post(
        Post::new(anna.id, "Trip".into(), "Went far".into(), Utc::now() - Duration::hours(1))
            .in_category(Some(category.id)),
    )
    .await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let listing: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listing["total"], 0);

    let req = test::TestRequest::get().uri("/api/category/travel").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_anonymous_write_is_forbidden() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(post_body("Anonymous"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_non_author_edit_redirects_to_post() {
    let ctx = TestContext::new();
    let (_, anna_auth) = ctx.user("anna").await;
    let (_, boris_auth) = ctx.user("boris").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, anna_auth))
        .set_json(post_body("Mine"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let post_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["author"], "anna");
    assert_eq!(created["comment_count"], 0);

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{}", post_id))
        .insert_header((header::AUTHORIZATION, boris_auth.clone()))
        .set_json(post_body("Stolen"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        format!("/api/posts/{}", post_id).as_str()
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}", post_id))
        .insert_header((header::AUTHORIZATION, boris_auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post_id))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["post"]["title"], "Mine");
    assert_eq!(detail["can_edit"], false);
}

#[actix_web::test]
async fn test_comment_delete_by_author_and_stranger() {
    let ctx = TestContext::new();
    let (anna, anna_auth) = ctx.user("anna").await;
    let (boris, boris_auth) = ctx.user("boris").await;
    let post = ctx
        .post(Post::new(boris.id, "Boris post".into(), "Hi".into(), Utc::now() - Duration::hours(1)))
        .await;
    let first = ctx
        .repos
        .comments
        .save(Comment::new(post.id, anna.id, "First".into()))
        .await
        .unwrap();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/comments", post.id))
        .insert_header((header::AUTHORIZATION, anna_auth.clone()))
        .set_json(json!({ "text": "Second" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let second: Value = test::read_body_json(resp).await;
    assert_eq!(second["can_edit"], true);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}/comments/{}", post.id, first.id))
        .insert_header((header::AUTHORIZATION, boris_auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        format!("/api/posts/{}", post.id).as_str()
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}/comments/{}", post.id, first.id))
        .insert_header((header::AUTHORIZATION, anna_auth.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post.id))
        .insert_header((header::AUTHORIZATION, anna_auth))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["post"]["comment_count"], 1);
    assert_eq!(detail["comments"][0]["text"], "Second");
    assert_eq!(detail["comments"][0]["can_edit"], true);
}

#[actix_web::test]
async fn test_missing_post_is_problem_document() {
    let ctx = TestContext::new();
    let (_, anna_auth) = ctx.user("anna").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);

    let req = test::TestRequest::get().uri("/api/posts/not-a-uuid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{}/comments/not-a-uuid", Uuid::new_v4()))
        .insert_header((header::AUTHORIZATION, anna_auth))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/api/nowhere").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["instance"], "/api/nowhere");
}

#[actix_web::test]
async fn test_paging_bounds() {
    let ctx = TestContext::new();
    let (anna, _) = ctx.user("anna").await;
    ctx.post(Post::new(anna.id, "Only".into(), "One".into(), Utc::now() - Duration::hours(1)))
        .await;
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/api/posts?page=0").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get().uri("/api/posts?page=2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/posts?page=18446744073709551615")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/profile/anna?page=18446744073709551615")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/posts?page=abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = TestContext::new();
    let (_, anna_auth) = ctx.user("anna").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header((header::AUTHORIZATION, anna_auth))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"title\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_register_login_and_me() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let register = json!({
        "username": "vera",
        "email": "vera@example.com",
        "password": "correct horse",
        "first_name": "Vera",
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "vera", "password": "wrong password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "vera", "password": "correct horse" }))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    let token = login["access_token"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["username"], "vera");
    assert_eq!(me["first_name"], "Vera");
}

#[actix_web::test]
async fn test_short_password_is_rejected() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "vera", "email": "vera@example.com", "password": "short" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_profile_update_conflict() {
    let ctx = TestContext::new();
    let (_, anna_auth) = ctx.user("anna").await;
    ctx.user("boris").await;
    let app = init_app!(ctx);

    let req = test::TestRequest::put()
        .uri("/api/profile")
        .insert_header((header::AUTHORIZATION, anna_auth.clone()))
        .set_json(json!({ "username": "boris" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::put()
        .uri("/api/profile")
        .insert_header((header::AUTHORIZATION, anna_auth))
        .set_json(json!({ "username": "anya", "first_name": "Anna" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["username"], "anya");
    assert_eq!(updated["first_name"], "Anna");
}
