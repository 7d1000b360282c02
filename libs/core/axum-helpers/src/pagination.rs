//! Offset pagination envelope shared by all list endpoints.
//!
//! Pages are 1-based. Every filtered list returns a [`Page`] carrying the
//! requested window in `result` plus a [`PageMeta`] block describing the
//! full result set.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Default page size when the client does not send one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Upper bound on the page size a client may request.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Query parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (defaults to 1)
    pub page: Option<u64>,
    /// Number of items per page (defaults to 20, capped at 100)
    #[serde(alias = "pageSize", alias = "size")]
    pub page_size: Option<u64>,
    /// Filter expression, e.g. `name ~ 'acme' and active : true`
    pub filter: Option<String>,
}

impl PageQuery {
    /// Normalize the raw query into a concrete page request.
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

/// A normalized, always-valid pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number, at least 1.
    pub page: u64,
    /// Items per page, between 1 and [`MAX_PAGE_SIZE`].
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Zero-based row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Pagination metadata returned alongside every page of results.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    /// 1-based page number of this window
    pub page: u64,
    /// Requested page size
    #[serde(rename = "pageSize")]
    pub page_size: u64,
    /// Total number of pages
    pub pages: u64,
    /// Total number of matching items across all pages
    pub total: u64,
}

/// A single page of results.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub meta: PageMeta,
    pub result: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page from an already-windowed item list and a total count.
    pub fn new(request: PageRequest, total: u64, result: Vec<T>) -> Self {
        let pages = total.div_ceil(request.page_size);
        Self {
            meta: PageMeta {
                page: request.page,
                page_size: request.page_size,
                pages,
                total,
            },
            result,
        }
    }

    /// Map the items of this page, keeping the metadata intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            meta: self.meta,
            result: self.result.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps_invalid_values() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 1);

        let req = PageRequest::new(3, 500);
        assert_eq!(req.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_request_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_page_query_defaults() {
        let req = PageQuery::default().to_request();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_meta_rounds_pages_up() {
        let page = Page::new(PageRequest::new(1, 10), 25, vec![1, 2, 3]);
        assert_eq!(page.meta.pages, 3);
        assert_eq!(page.meta.total, 25);
    }

    #[test]
    fn test_page_meta_empty_result() {
        let page: Page<i32> = Page::new(PageRequest::new(1, 10), 0, vec![]);
        assert_eq!(page.meta.pages, 0);
        assert!(page.result.is_empty());
    }

    #[test]
    fn test_page_map_keeps_meta() {
        let page = Page::new(PageRequest::new(2, 5), 12, vec![1, 2]);
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.meta.page, 2);
        assert_eq!(mapped.result, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_page_serializes_camel_case_meta() {
        let page = Page::new(PageRequest::new(1, 10), 1, vec![1]);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["meta"]["pageSize"], 10);
        assert_eq!(json["meta"]["total"], 1);
        assert_eq!(json["meta"]["page"], 1);
    }
}
