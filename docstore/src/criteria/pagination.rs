use axum::http::{HeaderMap, HeaderValue};

use super::paging::RealizedPage;

/// Current page index.
pub const PAGE_HEADER: &str = "X-Page";
/// Requested page size.
pub const PAGE_SIZE_HEADER: &str = "X-Page-Size";
/// Number of elements in this page.
pub const PAGE_COUNT_HEADER: &str = "X-Page-Count";
/// Total number of pages.
pub const PAGE_TOTAL_COUNT_HEADER: &str = "X-Page-Total-Count";
/// Total number of elements across all pages.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// The five pagination response headers, rendered as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationHeaders {
    pub page: String,
    pub page_size: String,
    pub page_count: String,
    pub page_total_count: String,
    pub total_count: String,
}

impl PaginationHeaders {
    /// Header name / value pairs in emission order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            (PAGE_HEADER, self.page.as_str()),
            (PAGE_SIZE_HEADER, self.page_size.as_str()),
            (PAGE_COUNT_HEADER, self.page_count.as_str()),
            (PAGE_TOTAL_COUNT_HEADER, self.page_total_count.as_str()),
            (TOTAL_COUNT_HEADER, self.total_count.as_str()),
        ]
    }

    #[must_use]
    pub fn into_header_map(self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in self.entries() {
            // Decimal digits only, so parsing cannot fail
            if let Ok(value) = HeaderValue::from_str(value) {
                headers.insert(name, value);
            }
        }
        headers
    }
}

/// Derive the pagination headers of a realized page.
#[must_use]
pub fn pagination_headers<T>(page: &RealizedPage<T>) -> PaginationHeaders {
    PaginationHeaders {
        page: page.page_index.to_string(),
        page_size: page.page_size.to_string(),
        page_count: page.number_of_elements.to_string(),
        page_total_count: page.total_pages.to_string(),
        total_count: page.total_elements.to_string(),
    }
}
