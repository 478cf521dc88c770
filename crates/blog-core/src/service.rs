//! Blog operations - the use cases behind every route.
//!
//! `BlogService` owns the repository ports and applies the rules from
//! [`crate::policy`]: which posts a viewer may see, who may change what, and
//! the comment counts attached to every listed post.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, Location, MAX_TITLE_LENGTH, Post, User};
use crate::error::DomainError;
use crate::policy;
use crate::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use crate::query::{DEFAULT_PAGE_SIZE, Page, PageRequest, PostFilter};

/// The repositories a [`BlogService`] works against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

/// Author-editable fields of a post.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
}

/// User-editable profile fields.
#[derive(Debug, Clone)]
pub struct ProfileDraft {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
}

/// A post together with everything a listing shows about it.
#[derive(Debug, Clone)]
pub struct PostSummary {
    pub post: Post,
    pub author: User,
    pub category: Option<Category>,
    /// Only set when the location is published.
    pub location: Option<Location>,
    pub comment_count: u64,
}

#[derive(Debug, Clone)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: User,
    pub can_edit: bool,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub summary: PostSummary,
    pub comments: Vec<CommentEntry>,
    pub can_edit: bool,
}

#[derive(Debug, Clone)]
pub struct CategoryPage {
    pub category: Category,
    pub posts: Page<PostSummary>,
}

#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub user: User,
    pub posts: Page<PostSummary>,
    pub is_owner: bool,
}

pub struct BlogService {
    repos: Repositories,
    per_page: u64,
}

impl BlogService {
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, per_page: u64) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Public feed: live posts, newest first.
    pub async fn list_posts(&self, page: u64) -> Result<Page<PostSummary>, DomainError> {
        let request = self.page_request(page)?;
        let posts = self
            .repos
            .posts
            .list(&PostFilter::live(Utc::now()), request)
            .await?;
        ensure_page_exists(&posts)?;
        self.summarize_page(posts).await
    }

    /// A single post with its comments. Authors see their own posts
    /// regardless of publication state; everyone else only live ones.
    pub async fn post_detail(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> Result<PostDetail, DomainError> {
        let post = self.viewable_post(post_id, viewer).await?;
        let can_edit = policy::can_mutate(&post, viewer);
        let summary = self.summarize_one(post).await?;

        let comments = self.repos.comments.find_by_post(post_id).await?;
        let authors = self
            .users_by_id(unique(comments.iter().map(|c| c.author_id)))
            .await?;
        let comments = comments
            .into_iter()
            .filter_map(|comment| {
                let author = authors.get(&comment.author_id)?.clone();
                Some(CommentEntry {
                    can_edit: policy::can_mutate(&comment, viewer),
                    author,
                    comment,
                })
            })
            .collect();

        Ok(PostDetail {
            summary,
            comments,
            can_edit,
        })
    }

    pub async fn create_post(
        &self,
        actor: Uuid,
        draft: PostDraft,
    ) -> Result<PostSummary, DomainError> {
        self.require_user(actor).await?;
        self.validate_post(&draft).await?;

        let mut post = Post::new(actor, draft.title, draft.text, draft.pub_date)
            .in_category(draft.category_id)
            .at_location(draft.location_id);
        post.image = draft.image;

        let saved = self.repos.posts.save(post).await?;
        tracing::info!(post_id = %saved.id, author_id = %actor, "Post created");

        self.summarize_one(saved).await
    }

    pub async fn update_post(
        &self,
        actor: Uuid,
        post_id: Uuid,
        draft: PostDraft,
    ) -> Result<PostSummary, DomainError> {
        let mut post = self.find_post(post_id).await?;
        if !policy::can_mutate(&post, Some(actor)) {
            return Err(DomainError::NotAuthor { post_id });
        }
        self.validate_post(&draft).await?;

        post.title = draft.title;
        post.text = draft.text;
        post.pub_date = draft.pub_date;
        post.category_id = draft.category_id;
        post.location_id = draft.location_id;
        post.image = draft.image;

        let saved = self.repos.posts.save(post).await?;
        tracing::info!(post_id = %saved.id, "Post updated");

        self.summarize_one(saved).await
    }

    /// Delete a post. Its comments go with it.
    pub async fn delete_post(&self, actor: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        let post = self.find_post(post_id).await?;
        if !policy::can_mutate(&post, Some(actor)) {
            return Err(DomainError::NotAuthor { post_id });
        }

        self.repos.posts.delete(post_id).await?;
        tracing::info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// Live posts of a published category.
    pub async fn category_posts(&self, slug: &str, page: u64) -> Result<CategoryPage, DomainError> {
        let category = self
            .repos
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let request = self.page_request(page)?;
        let filter = PostFilter::live(Utc::now()).in_category(category.id);
        let posts = self.repos.posts.list(&filter, request).await?;
        ensure_page_exists(&posts)?;

        Ok(CategoryPage {
            category,
            posts: self.summarize_page(posts).await?,
        })
    }

    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        page: u64,
    ) -> Result<ProfilePage, DomainError> {
        let user = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let request = self.page_request(page)?;
        let filter = policy::profile_filter(user.id, viewer, Utc::now());
        let posts = self.repos.posts.list(&filter, request).await?;
        ensure_page_exists(&posts)?;

        Ok(ProfilePage {
            is_owner: viewer == Some(user.id),
            posts: self.summarize_page(posts).await?,
            user,
        })
    }

    pub async fn update_profile(
        &self,
        actor: Uuid,
        draft: ProfileDraft,
    ) -> Result<User, DomainError> {
        let mut user = self.require_user(actor).await?;

        if !User::is_valid_username(&draft.username) {
            return Err(DomainError::Validation(
                "Username may contain only letters, digits and @/./+/-/_".to_string(),
            ));
        }
        if !draft.email.is_empty() && !draft.email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".to_string()));
        }
        if draft.username != user.username
            && self
                .repos
                .users
                .find_by_username(&draft.username)
                .await?
                .is_some()
        {
            return Err(DomainError::Duplicate("Username already taken".to_string()));
        }

        user.first_name = draft.first_name;
        user.last_name = draft.last_name;
        user.username = draft.username;
        user.email = draft.email;
        user.updated_at = Utc::now();

        Ok(self.repos.users.save(user).await?)
    }

    /// Comment on a post the actor can see.
    pub async fn add_comment(
        &self,
        actor: Uuid,
        post_id: Uuid,
        text: String,
    ) -> Result<CommentEntry, DomainError> {
        validate_comment(&text)?;
        let author = self.require_user(actor).await?;
        let post = self.viewable_post(post_id, Some(actor)).await?;

        let comment = self
            .repos
            .comments
            .save(Comment::new(post.id, actor, text))
            .await?;
        tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment added");

        Ok(CommentEntry {
            comment,
            author,
            can_edit: true,
        })
    }

    pub async fn update_comment(
        &self,
        actor: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> Result<CommentEntry, DomainError> {
        let mut comment = self.find_comment(post_id, comment_id).await?;
        if !policy::can_mutate(&comment, Some(actor)) {
            return Err(DomainError::NotAuthor { post_id });
        }
        validate_comment(&text)?;

        comment.text = text;
        let comment = self.repos.comments.save(comment).await?;
        let author = self.require_user(actor).await?;

        Ok(CommentEntry {
            comment,
            author,
            can_edit: true,
        })
    }

    pub async fn delete_comment(
        &self,
        actor: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        let comment = self.find_comment(post_id, comment_id).await?;
        if !policy::can_mutate(&comment, Some(actor)) {
            return Err(DomainError::NotAuthor { post_id });
        }

        self.repos.comments.delete(comment_id).await?;
        tracing::info!(comment_id = %comment_id, post_id = %post_id, "Comment deleted");
        Ok(())
    }

    fn page_request(&self, page: u64) -> Result<PageRequest, DomainError> {
        if page == 0 {
            return Err(DomainError::Validation(
                "Page numbers start at 1".to_string(),
            ));
        }
        let request = PageRequest::new(page, self.per_page);
        if request.checked_offset().is_none() {
            return Err(DomainError::not_found("page", page));
        }
        Ok(request)
    }

    async fn require_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repos
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn viewable_post(&self, post_id: Uuid, viewer: Option<Uuid>) -> Result<Post, DomainError> {
        let stored = self.find_post(post_id).await?;
        let filter = policy::detail_filter(&stored, viewer, Utc::now());
        self.repos
            .posts
            .find_one(&filter)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// A comment, provided it belongs to `post_id`.
    async fn find_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.repos
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }

    async fn validate_post(&self, draft: &PostDraft) -> Result<(), DomainError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::Validation(format!(
                "Title must be at most {MAX_TITLE_LENGTH} characters"
            )));
        }
        if draft.text.trim().is_empty() {
            return Err(DomainError::Validation("Text is required".to_string()));
        }

        if let Some(id) = draft.category_id {
            if self.repos.categories.find_by_id(id).await?.is_none() {
                return Err(DomainError::Validation(format!("Unknown category {id}")));
            }
        }
        if let Some(id) = draft.location_id {
            if self.repos.locations.find_by_id(id).await?.is_none() {
                return Err(DomainError::Validation(format!("Unknown location {id}")));
            }
        }

        Ok(())
    }

    async fn summarize_one(&self, post: Post) -> Result<PostSummary, DomainError> {
        let post_id = post.id;
        self.summarize(vec![post])
            .await?
            .pop()
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn summarize_page(&self, page: Page<Post>) -> Result<Page<PostSummary>, DomainError> {
        let Page {
            items,
            page,
            per_page,
            total,
        } = page;
        Ok(Page {
            items: self.summarize(items).await?,
            page,
            per_page,
            total,
        })
    }

    /// Attach authors, categories, locations and fresh comment counts.
    async fn summarize(&self, posts: Vec<Post>) -> Result<Vec<PostSummary>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let authors = self
            .users_by_id(unique(posts.iter().map(|p| p.author_id)))
            .await?;
        let categories: HashMap<Uuid, Category> = self
            .repos
            .categories
            .find_by_ids(&unique(posts.iter().filter_map(|p| p.category_id)))
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let locations: HashMap<Uuid, Location> = self
            .repos
            .locations
            .find_by_ids(&unique(posts.iter().filter_map(|p| p.location_id)))
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();
        let counts = self.repos.comments.count_by_posts(&post_ids).await?;

        posts
            .into_iter()
            .map(|post| {
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    DomainError::Internal(format!("Post {} has no author", post.id))
                })?;
                Ok(PostSummary {
                    author,
                    category: post.category_id.and_then(|id| categories.get(&id).cloned()),
                    location: policy::visible_location(
                        post.location_id.and_then(|id| locations.get(&id).cloned()),
                    ),
                    comment_count: counts.get(&post.id).copied().unwrap_or(0),
                    post,
                })
            })
            .collect()
    }

    async fn users_by_id(&self, ids: Vec<Uuid>) -> Result<HashMap<Uuid, User>, DomainError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .repos
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect())
    }
}

fn validate_comment(text: &str) -> Result<(), DomainError> {
    if text.trim().is_empty() {
        return Err(DomainError::Validation("Comment text is required".to_string()));
    }
    Ok(())
}

/// Pages past the end are missing, except an empty first page.
fn ensure_page_exists<T>(page: &Page<T>) -> Result<(), DomainError> {
    if page.page > 1 && page.items.is_empty() {
        return Err(DomainError::not_found("page", page.page));
    }
    Ok(())
}

fn unique<T: Eq + Hash + Copy>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}
