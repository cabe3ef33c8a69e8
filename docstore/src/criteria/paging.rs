use std::num::NonZeroU64;

use super::error::{CriteriaError, UnsupportedPagingAccess};
use super::sort::{Ordering, build_ordering, parse_sort};

/// Largest row offset or page size handed to storage.
///
/// SQL drivers bind `LIMIT` and `OFFSET` as signed 64-bit integers.
pub const MAX_PAGE_OFFSET: u64 = u64::MAX >> 1;

/// Bounds of one requested page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    index: u64,
    size: NonZeroU64,
    offset: u64,
    ordering: Ordering,
}

impl PageRequest {
    /// # Errors
    ///
    /// [`CriteriaError::PageOutOfRange`] when the page size or the first row
    /// of the page lies past [`MAX_PAGE_OFFSET`].
    pub fn new(index: u64, size: NonZeroU64, ordering: Ordering) -> Result<Self, CriteriaError> {
        let offset = index
            .checked_mul(size.get())
            .filter(|offset| *offset <= MAX_PAGE_OFFSET && size.get() <= MAX_PAGE_OFFSET)
            .ok_or(CriteriaError::PageOutOfRange {
                index,
                size: size.get(),
            })?;

        Ok(Self {
            index,
            size,
            offset,
            ordering,
        })
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size.get()
    }

    /// Number of rows skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub const fn ordering(&self) -> &Ordering {
        &self.ordering
    }
}

/// How the storage layer should slice and order a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingDescriptor {
    /// Everything, in the storage layer's default order.
    Unpaged,
    /// Everything, in the given order.
    UnpagedSorted(Ordering),
    /// One bounded page.
    Paged(PageRequest),
}

impl PagingDescriptor {
    #[must_use]
    pub const fn is_paged(&self) -> bool {
        matches!(self, Self::Paged(_))
    }

    /// The ordering to apply. `Unpaged` has an unspecified order.
    #[must_use]
    pub fn ordering(&self) -> Ordering {
        match self {
            Self::Unpaged => Ordering::unsorted(),
            Self::UnpagedSorted(ordering) => ordering.clone(),
            Self::Paged(page) => page.ordering().clone(),
        }
    }

    /// # Errors
    ///
    /// Fails unless the descriptor is `Paged`.
    pub const fn page_index(&self) -> Result<u64, UnsupportedPagingAccess> {
        match self {
            Self::Paged(page) => Ok(page.index()),
            _ => Err(UnsupportedPagingAccess {
                accessor: "page index",
            }),
        }
    }

    /// # Errors
    ///
    /// Fails unless the descriptor is `Paged`.
    pub const fn page_size(&self) -> Result<u64, UnsupportedPagingAccess> {
        match self {
            Self::Paged(page) => Ok(page.size()),
            _ => Err(UnsupportedPagingAccess {
                accessor: "page size",
            }),
        }
    }

    /// # Errors
    ///
    /// Fails unless the descriptor is `Paged`.
    pub const fn offset(&self) -> Result<u64, UnsupportedPagingAccess> {
        match self {
            Self::Paged(page) => Ok(page.offset()),
            _ => Err(UnsupportedPagingAccess { accessor: "offset" }),
        }
    }
}

/// Pick the paging regime from the optional request inputs.
///
/// 1. nothing supplied: `Unpaged`
/// 2. no page size: `UnpagedSorted`, even when a page index was given
/// 3. otherwise `Paged`, with the page index defaulting to 0
///
/// The ordering is built from `sort_raw` in every case.
///
/// # Errors
///
/// [`CriteriaError::InvalidPageSize`] when the page size is zero,
/// [`CriteriaError::PageOutOfRange`] when the page cannot be addressed.
pub fn resolve_paging(
    page_index: Option<u64>,
    page_size: Option<u64>,
    sort_raw: Option<&str>,
) -> Result<PagingDescriptor, CriteriaError> {
    let ordering = build_ordering(&parse_sort(sort_raw));

    if page_index.is_none() && page_size.is_none() && sort_raw.is_none() {
        return Ok(PagingDescriptor::Unpaged);
    }

    let Some(page_size) = page_size else {
        return Ok(PagingDescriptor::UnpagedSorted(ordering));
    };

    let size = NonZeroU64::new(page_size).ok_or(CriteriaError::InvalidPageSize)?;
    let page = PageRequest::new(page_index.unwrap_or(0), size, ordering)?;
    Ok(PagingDescriptor::Paged(page))
}

/// One page of results as materialised by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealizedPage<T> {
    pub content: Vec<T>,
    pub page_index: u64,
    pub page_size: u64,
    pub number_of_elements: u64,
    pub total_pages: u64,
    pub total_elements: u64,
}

impl<T> RealizedPage<T> {
    /// Build the page metadata for `content` fetched with `paging`.
    ///
    /// Unpaged results report page 0, a page size equal to the number of
    /// elements and a single page.
    #[must_use]
    pub fn new(content: Vec<T>, paging: &PagingDescriptor, total_elements: u64) -> Self {
        let number_of_elements = content.len() as u64;
        let (page_index, page_size, total_pages) = match paging {
            PagingDescriptor::Paged(page) => (
                page.index(),
                page.size(),
                total_elements.div_ceil(page.size()),
            ),
            PagingDescriptor::Unpaged | PagingDescriptor::UnpagedSorted(_) => {
                (0, number_of_elements, 1)
            }
        };

        Self {
            content,
            page_index,
            page_size,
            number_of_elements,
            total_pages,
            total_elements,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Convert the content while keeping the page metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> RealizedPage<U> {
        RealizedPage {
            content: self.content.into_iter().map(f).collect(),
            page_index: self.page_index,
            page_size: self.page_size,
            number_of_elements: self.number_of_elements,
            total_pages: self.total_pages,
            total_elements: self.total_elements,
        }
    }
}
