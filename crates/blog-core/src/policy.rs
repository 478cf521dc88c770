//! Visibility and authorship rules.
//!
//! These functions are the only place that decides who sees and who may
//! change a post or comment. Repositories mirror [`is_live`] in their own
//! query language; the in-memory store calls it directly.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Authored, Category, Location, Post, Publishable};
use crate::query::PostFilter;

/// Whether `post` is publicly visible at `now`.
///
/// A post without a category passes the category check.
pub fn is_live(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published()
        && category.is_none_or(|c| c.is_published())
        && post.pub_date <= now
}

/// Whether `actor` may edit or delete `entity`. Anonymous actors never may.
pub fn can_mutate<E: Authored>(entity: &E, actor: Option<Uuid>) -> bool {
    actor == Some(entity.author_id())
}

/// The location to display with a post, if it is published.
pub fn visible_location(location: Option<Location>) -> Option<Location> {
    location.filter(|l| l.is_published())
}

/// Filter for the profile page of `owner_id` as seen by `viewer`.
///
/// Owners see all their posts, scheduled and unpublished included.
pub fn profile_filter(owner_id: Uuid, viewer: Option<Uuid>, now: DateTime<Utc>) -> PostFilter {
    if viewer == Some(owner_id) {
        PostFilter::all().by_author(owner_id)
    } else {
        PostFilter::live(now).by_author(owner_id)
    }
}

/// Filter for a single post as seen by `viewer`, given the stored post.
pub fn detail_filter(post: &Post, viewer: Option<Uuid>, now: DateTime<Utc>) -> PostFilter {
    if can_mutate(post, viewer) {
        PostFilter::all().with_id(post.id)
    } else {
        PostFilter::live(now).with_id(post.id)
    }
}

/// Evaluate a whole [`PostFilter`] against a post and its category.
pub fn matches(filter: &PostFilter, post: &Post, category: Option<&Category>) -> bool {
    filter.id.is_none_or(|id| post.id == id)
        && filter.author_id.is_none_or(|id| post.author_id == id)
        && filter.category_id.is_none_or(|id| post.category_id == Some(id))
        && filter.live_at.is_none_or(|now| is_live(post, category, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::domain::Comment;

    fn post_by(author_id: Uuid, pub_date: DateTime<Utc>) -> Post {
        Post::new(author_id, "Title".into(), "Body".into(), pub_date)
    }

    #[test]
    fn test_live_requires_every_condition() {
        let now = Utc::now();
        let author = Uuid::new_v4();
        let category = Category::new("News".into(), "".into(), "news".into());
        let hidden = category.clone().hidden();

        let post = post_by(author, now - Duration::hours(1)).in_category(Some(category.id));
        assert!(is_live(&post, Some(&category), now));
        assert!(!is_live(&post, Some(&hidden), now));
        assert!(!is_live(&post.clone().unpublished(), Some(&category), now));

        let scheduled = post_by(author, now + Duration::days(1));
        assert!(!is_live(&scheduled, None, now));
    }

    #[test]
    fn test_post_without_category_is_eligible() {
        let now = Utc::now();
        let post = post_by(Uuid::new_v4(), now);
        assert!(is_live(&post, None, now));
    }

    #[test]
    fn test_only_author_can_mutate() {
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();
        let post = post_by(author, Utc::now());
        let comment = Comment::new(post.id, other, "Nice".into());

        assert!(can_mutate(&post, Some(author)));
        assert!(!can_mutate(&post, Some(other)));
        assert!(!can_mutate(&post, None));
        assert!(can_mutate(&comment, Some(other)));
        assert!(!can_mutate(&comment, Some(author)));
    }

    #[test]
    fn test_profile_filter_depends_on_viewer() {
        let now = Utc::now();
        let owner = Uuid::new_v4();

        let own = profile_filter(owner, Some(owner), now);
        assert_eq!(own.live_at, None);
        assert_eq!(own.author_id, Some(owner));

        let foreign = profile_filter(owner, Some(Uuid::new_v4()), now);
        assert_eq!(foreign.live_at, Some(now));

        let anonymous = profile_filter(owner, None, now);
        assert_eq!(anonymous.live_at, Some(now));
    }

    #[test]
    fn test_matches_scheduled_post_only_for_owner_filter() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let scheduled = post_by(owner, now + Duration::days(1));

        assert!(matches(&profile_filter(owner, Some(owner), now), &scheduled, None));
        assert!(!matches(&profile_filter(owner, None, now), &scheduled, None));
        assert!(!matches(&PostFilter::live(now), &scheduled, None));
    }

    #[test]
    fn test_unpublished_location_is_not_shown() {
        let mut location = Location::new("Moscow".into());
        assert!(visible_location(Some(location.clone())).is_some());

        location.is_published = false;
        assert!(visible_location(Some(location)).is_none());
        assert!(visible_location(None).is_none());
    }
}
