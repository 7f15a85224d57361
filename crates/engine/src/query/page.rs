//! Pagination

use serde::{Deserialize, Serialize};

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1
    pub page: usize,
    /// Items per page
    pub size: usize,
}

impl PageRequest {
    /// Create a page request
    pub fn new(page: usize, size: usize) -> Self {
        PageRequest { page, size }
    }

    /// Index range `[(page-1)*size, page*size)` clamped to `len`
    ///
    /// Page 0, size 0 and pages past the end all give an empty range.
    pub fn range(&self, len: usize) -> std::ops::Range<usize> {
        if self.page == 0 || self.size == 0 {
            return 0..0;
        }
        let start = (self.page - 1).saturating_mul(self.size).min(len);
        let end = start.saturating_add(self.size).min(len);
        start..end
    }

    /// Number of pages needed for `total` items
    pub fn total_pages(&self, total: usize) -> usize {
        if self.size == 0 {
            0
        } else {
            total.div_ceil(self.size)
        }
    }

    /// Take this page out of an ordered sequence
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let range = self.range(items.len());
        items
            .into_iter()
            .skip(range.start)
            .take(range.end - range.start)
            .collect()
    }
}

/// One page of results plus the figures a pager needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<R> {
    /// Records on this page
    pub items: Vec<R>,
    /// Matching records across all pages
    pub total: usize,
    /// Requested page
    pub page: usize,
    /// Requested page size
    pub page_size: usize,
    /// Pages available at this size
    pub total_pages: usize,
}
