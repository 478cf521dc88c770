//! Query descriptions handed to repositories.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Posts shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

const MAX_OFFSET: u64 = i64::MAX as u64;

/// Which posts a listing should return.
///
/// Every set field narrows the result. `live_at` switches on the visibility
/// filter evaluated at that instant; leaving it `None` returns unpublished and
/// scheduled posts too, which only an author may see of their own posts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub live_at: Option<DateTime<Utc>>,
}

impl PostFilter {
    /// No restriction at all.
    pub fn all() -> Self {
        Self::default()
    }

    /// Posts visible to the public at `now`.
    pub fn live(now: DateTime<Utc>) -> Self {
        Self {
            live_at: Some(now),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Rows to skip, or `None` when the page lies past anything a store can
    /// address (Postgres offsets are signed 64-bit).
    pub fn checked_offset(&self) -> Option<u64> {
        self.page
            .saturating_sub(1)
            .checked_mul(self.per_page)
            .filter(|offset| *offset <= MAX_OFFSET)
    }

    pub fn offset(&self) -> u64 {
        self.checked_offset().unwrap_or(MAX_OFFSET)
    }
}

/// One page of results plus the size of the whole result set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
        }
    }

    pub fn num_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page)
    }

    /// Replace every item, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_unaddressable_page_has_no_offset() {
        assert_eq!(PageRequest::new(u64::MAX, 10).checked_offset(), None);
        assert_eq!(PageRequest::new(u64::MAX, 1).checked_offset(), None);
        assert_eq!(PageRequest::new(u64::MAX, 10).offset(), i64::MAX as u64);
        assert_eq!(PageRequest::new(2, 10).checked_offset(), Some(10));
    }

    #[test]
    fn test_num_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], PageRequest::new(1, 10), 21);
        assert_eq!(page.num_pages(), 3);

        let empty: Page<u8> = Page::new(vec![], PageRequest::new(1, 10), 0);
        assert_eq!(empty.num_pages(), 0);
    }
}
