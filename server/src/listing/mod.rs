//! Query composition for public and admin listings.
//!
//! Every listing applies the visibility rule first, then advisory filters,
//! then a total order ending in `id`, then `LIMIT/OFFSET`.

pub mod filters;
pub mod pagination;

use serde::Deserialize;

pub use filters::{search_pattern, Advisory, TimeFrame, Window};
pub use pagination::{PageRequest, Paginated};

/// Raw query-string parameters shared by listings.
///
/// Kept as strings so a bad value never rejects the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub occasion: Option<String>,
    pub priority: Option<String>,
}

impl ListParams {
    #[must_use]
    pub fn page_request(&self, per_page: i64) -> PageRequest {
        PageRequest::parse(self.page.as_deref(), per_page)
    }

    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        search_pattern(self.search.as_deref())
    }

    #[must_use]
    pub fn category(&self) -> Advisory<String> {
        Advisory::parse_text(self.category.as_deref())
    }
}
