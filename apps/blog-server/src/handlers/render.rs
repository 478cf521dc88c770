//! Conversions from service results to response DTOs.

use blog_core::domain::{Category, User};
use blog_core::query::Page;
use blog_core::service::{CommentEntry, PostDetail, PostSummary};
use blog_shared::dto::{
    CategoryRef, CategoryResponse, CommentResponse, PageResponse, PostDetailResponse,
    PostResponse, PublicUserResponse, UserResponse,
};

pub fn post(summary: PostSummary) -> PostResponse {
    let PostSummary {
        post,
        author,
        category,
        location,
        comment_count,
    } = summary;

    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        pub_date: post.pub_date,
        is_published: post.is_published,
        author: author.username,
        category: category.map(|c| CategoryRef {
            title: c.title,
            slug: c.slug,
        }),
        location: location.map(|l| l.name),
        image: post.image,
        comment_count,
        created_at: post.created_at,
    }
}

pub fn comment(entry: CommentEntry) -> CommentResponse {
    CommentResponse {
        id: entry.comment.id,
        post_id: entry.comment.post_id,
        author: entry.author.username,
        text: entry.comment.text,
        created_at: entry.comment.created_at,
        can_edit: entry.can_edit,
    }
}

pub fn post_detail(detail: PostDetail) -> PostDetailResponse {
    PostDetailResponse {
        post: post(detail.summary),
        comments: detail.comments.into_iter().map(comment).collect(),
        can_edit: detail.can_edit,
    }
}

pub fn category(category: Category) -> CategoryResponse {
    CategoryResponse {
        title: category.title,
        description: category.description,
        slug: category.slug,
    }
}

pub fn account(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        created_at: user.created_at,
    }
}

pub fn public_user(user: User) -> PublicUserResponse {
    PublicUserResponse {
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        date_joined: user.created_at,
    }
}

pub fn page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageResponse<U> {
    let num_pages = page.num_pages();
    let page = page.map(f);

    PageResponse {
        items: page.items,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        num_pages,
    }
}
