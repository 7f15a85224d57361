//! Query engine: filter, sort, paginate
//!
//! Works over an in-memory record set. Each record is viewed through
//! [`Record::to_json`] so predicates and sorting see the same field names
//! the collection file stores.
//!
//! Evaluation order is fixed: filter, then stable sort, then page slice.

pub mod filter;
pub mod page;
pub mod sort;

pub use filter::{Filter, OrSemantics, Pattern, Predicate, OR_KEY};
pub use page::{PageRequest, PageResult};
pub use sort::{collate, collation_key, compare_values, Sort, SortOrder};

use clientdb_core::Record;

/// Find request over one collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Conditions records must satisfy
    pub filter: Filter,
    /// Optional ordering
    pub sort: Option<Sort>,
    /// Optional page; `None` returns every match
    pub page: Option<PageRequest>,
}

impl Query {
    /// Query matching every record
    pub fn new() -> Self {
        Query::default()
    }

    /// Query with a filter
    pub fn filtered(filter: Filter) -> Self {
        Query {
            filter,
            ..Query::default()
        }
    }

    /// Set the filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the sort
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            order,
        });
        self
    }

    /// Set the page
    pub fn page(mut self, page: usize, size: usize) -> Self {
        self.page = Some(PageRequest::new(page, size));
        self
    }

    /// Filter and sort, returning all matches in order
    pub fn select<R: Record>(&self, records: Vec<R>) -> Vec<R> {
        let mut rows: Vec<(serde_json::Value, R)> = records
            .into_iter()
            .map(|r| (r.to_json(), r))
            .filter(|(view, _)| self.filter.matches(view))
            .collect();
        if let Some(sort) = &self.sort {
            sort.apply(&mut rows);
        }
        rows.into_iter().map(|(_, r)| r).collect()
    }

    /// Run the full pipeline, returning the requested page
    pub fn execute<R: Record>(&self, records: Vec<R>) -> Vec<R> {
        let matched = self.select(records);
        match &self.page {
            Some(page) => page.slice(matched),
            None => matched,
        }
    }

    /// Run the full pipeline, returning the page with its totals
    ///
    /// Without a page request the single page holds every match.
    pub fn execute_paged<R: Record>(&self, records: Vec<R>) -> PageResult<R> {
        let matched = self.select(records);
        let total = matched.len();
        let request = self.page.unwrap_or(PageRequest::new(1, total));
        PageResult {
            total,
            page: request.page,
            page_size: request.size,
            total_pages: request.total_pages(total),
            items: request.slice(matched),
        }
    }

    /// Count matches, ignoring sort and page
    pub fn count<R: Record>(filter: &Filter, records: &[R]) -> usize {
        records
            .iter()
            .filter(|r| filter.matches(&r.to_json()))
            .count()
    }
}
