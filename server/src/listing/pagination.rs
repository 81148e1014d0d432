//! Offset pagination with fixed per-listing page sizes.

use serde::Serialize;

pub const ANNOUNCEMENTS_PER_PAGE: i64 = 12;
pub const ROYAL_MESSAGES_PER_PAGE: i64 = 10;
pub const EVENTS_PER_PAGE: i64 = 12;
pub const GALLERY_PER_PAGE: i64 = 24;
pub const HISTORY_PER_PAGE: i64 = 12;
pub const FEEDBACK_PER_PAGE: i64 = 12;
pub const ADMIN_PER_PAGE: i64 = 20;
pub const SUBSCRIBERS_PER_PAGE: i64 = 50;

/// A 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Missing, malformed or non-positive page numbers mean page 1.
    #[must_use]
    pub fn parse(raw: Option<&str>, per_page: i64) -> Self {
        let page = raw
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        Self { page, per_page }
    }

    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.per_page
    }

    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Paginated<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        let total = total.max(0);
        let total_pages = if total == 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
            has_next: request.page < total_pages,
            has_previous: request.page > 1,
        }
    }

    /// Result for a listing whose filters cannot match anything.
    #[must_use]
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_first_page() {
        assert_eq!(PageRequest::parse(None, 12).page, 1);
        assert_eq!(PageRequest::parse(Some("abc"), 12).page, 1);
        assert_eq!(PageRequest::parse(Some("0"), 12).page, 1);
        assert_eq!(PageRequest::parse(Some("-3"), 12).page, 1);
        assert_eq!(PageRequest::parse(Some(" 4 "), 12).page, 4);
    }

    #[test]
    fn test_offset() {
        let req = PageRequest::parse(Some("3"), 24);
        assert_eq!(req.limit(), 24);
        assert_eq!(req.offset(), 48);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let req = PageRequest::parse(Some(&i64::MAX.to_string()), 50);
        assert_eq!(req.offset(), i64::MAX);
    }

    #[test]
    fn test_metadata() {
        let req = PageRequest::parse(Some("2"), 10);
        let page = Paginated::new(vec![1; 10], 25, req);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_previous);

        let last = Paginated::new(vec![1; 5], 25, PageRequest::parse(Some("3"), 10));
        assert!(!last.has_next);
    }

    #[test]
    fn test_empty() {
        let page = Paginated::<u8>::empty(PageRequest::parse(None, 12));
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    /// Rows sorted by a key with ties broken by id: walking pages yields
    /// exactly the fully sorted set, with nothing repeated or skipped.
    #[test]
    fn test_pages_partition_the_sorted_set() {
        // (pinned, date, id) with many ties on the first two keys.
        let mut rows: Vec<(bool, u32, u32)> = (0..53)
            .map(|id| (id % 7 == 0, id % 4, id))
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(b.2.cmp(&a.2)));

        let per_page = 12;
        let mut walked = Vec::new();
        let mut page_no = 1;
        loop {
            let req = PageRequest::parse(Some(&page_no.to_string()), per_page);
            let items: Vec<_> = rows
                .iter()
                .skip(req.offset() as usize)
                .take(req.limit() as usize)
                .copied()
                .collect();
            let page = Paginated::new(items, rows.len() as i64, req);
            walked.extend(page.items.iter().copied());
            if !page.has_next {
                break;
            }
            page_no += 1;
        }

        assert_eq!(walked, rows);
        assert_eq!(page_no, 5);
    }
}
