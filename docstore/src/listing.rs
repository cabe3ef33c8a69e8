//! Listing request flow: query parameters in, realized page out.

use axum::http::HeaderMap;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::criteria::pagination::{PAGE_HEADER, PAGE_SIZE_HEADER};
use crate::criteria::{
    CRITERIA_DELIMITER, PredicateBackend, RealizedPage, and, build_predicate, parse_filter,
    resolve_paging,
};
use crate::documents::REF_FIELD;
use crate::storage::{ListingStore, StoreError};

/// Query parameters of a listing request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Filter criteria, e.g. `name~report|version>=2`
    pub q: Option<String>,
    /// Sort keys, e.g. `createdAt:DESC|name:ASC`
    pub s: Option<String>,
    /// Zero-based page index
    pub page: Option<u64>,
    /// Page size, must be positive
    pub size: Option<u64>,
}

impl ListQuery {
    /// Fill `page` and `size` from the `X-Page` / `X-Page-Size` request
    /// headers when the query string does not carry them.
    #[must_use]
    pub fn with_paging_headers(mut self, headers: &HeaderMap) -> Self {
        self.page = self.page.or_else(|| header_number(headers, PAGE_HEADER));
        self.size = self.size.or_else(|| header_number(headers, PAGE_SIZE_HEADER));
        self
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    let raw = headers.get(name)?.to_str().ok()?;
    match raw.trim().parse() {
        Ok(number) => Some(number),
        Err(_) => {
            tracing::debug!(header = name, value = raw, "Ignoring non-numeric paging header");
            None
        }
    }
}

/// A fixed restriction ANDed before the request's own filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    field: &'static str,
    values: Vec<String>,
}

impl Restriction {
    /// Restrict listings to the given document references.
    #[must_use]
    pub fn refs(values: Vec<String>) -> Self {
        Self {
            field: REF_FIELD,
            values,
        }
    }

    /// Parse a `|`-separated reference list such as `a|b|c`.
    #[must_use]
    pub fn parse_refs(raw: &str) -> Self {
        Self::refs(
            raw.split(CRITERIA_DELIMITER)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    fn predicate<B: PredicateBackend>(&self, backend: &B) -> Result<B::Predicate, B::Error> {
        backend.one_of(self.field, &self.values)
    }
}

/// Run a listing request against `store`.
///
/// The restriction, when given, is the left operand of the conjunction.
///
/// # Errors
///
/// Criteria errors for malformed `q` or a zero `size`, field errors from the
/// backend, and database failures.
pub async fn list_page<S: ListingStore>(
    store: &S,
    query: &ListQuery,
    restriction: Option<&Restriction>,
) -> Result<RealizedPage<S::Record>, StoreError> {
    let criteria = parse_filter(query.q.as_deref())?;
    let paging = resolve_paging(query.page, query.size, query.s.as_deref())?;

    let backend = store.predicate_backend();
    let filter = build_predicate(backend, &criteria)?;
    let predicate = match restriction {
        Some(restriction) => and(restriction.predicate(backend)?, filter),
        None => filter,
    };

    tracing::debug!(
        criteria = criteria.len(),
        paged = paging.is_paged(),
        restricted = restriction.is_some(),
        "Listing"
    );
    store.find_page(predicate, &paging).await
}
