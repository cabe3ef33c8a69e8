//! # Query Criteria
//!
//! Translation of the listing query parameters into filter predicates,
//! orderings and paging descriptors, plus the pagination headers of the
//! response.
//!
//! ## Main Components
//!
//! - **[`parse_filter`]**: `q` parameter to [`FilterCriterion`] list
//! - **[`parse_sort`]** / **[`build_ordering`]**: `s` parameter to [`Ordering`]
//! - **[`build_predicate`]**: criteria to a backend [`Predicate`]
//! - **[`resolve_paging`]**: page index, page size and sort to [`PagingDescriptor`]
//! - **[`pagination_headers`]**: [`RealizedPage`] to the five `X-*` headers
//!
//! ## Query Parameter Examples
//!
//! ```text
//! // Equality and pattern match, combined with AND
//! GET /documents?q=authorRef==anonymous|name~report
//!
//! // Ranges and set membership
//! GET /documents?q=version>=2|contentType@application/pdf,text/plain
//!
//! // Sorting, primary key first
//! GET /documents?s=createdAt:DESC|name:ASC
//!
//! // Third page of 20
//! GET /documents?page=2&size=20&s=name:ASC
//! ```
//!
//! Everything here is a pure function of its inputs; the storage layer owns
//! evaluation and field resolution.

pub mod error;
pub mod pagination;
pub mod paging;
pub mod predicate;
pub mod query_parser;
pub mod sort;

pub use error::{CriteriaError, UnsupportedPagingAccess};
pub use pagination::{PaginationHeaders, pagination_headers};
pub use paging::{MAX_PAGE_OFFSET, PageRequest, PagingDescriptor, RealizedPage, resolve_paging};
pub use predicate::{Predicate, PredicateBackend, and, build_predicate};
pub use query_parser::{
    CRITERIA_DELIMITER, FilterCriterion, FilterOperator, LIST_DELIMITER, parse_filter,
};
pub use sort::{Ordering, SortCriterion, SortDirection, build_ordering, parse_sort};
