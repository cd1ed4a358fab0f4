//! Normalized wire parameters for one request.

use crate::SortDirection;
use std::collections::BTreeMap;

/// One sort slot: the referenced column index and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters, derive_new::new)]
pub struct SortRequest {
    /// Wire index of the column to sort by
    column: usize,
    /// Normalized direction
    direction: SortDirection,
}

/// Requested page window. Only exists when both length and start parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters, derive_new::new)]
pub struct PageRequest {
    /// Requested row count, before clamping
    limit: u64,
    /// Rows to skip
    offset: u64,
}

/// Parameters extracted from one raw request payload.
///
/// Built fresh for each request and never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedParams {
    /// Echo token, 0 when absent or malformed
    pub echo: i64,
    /// Global search term, never empty
    pub global_search: Option<String>,
    /// Per-column search terms keyed by column index, never empty
    pub column_search: BTreeMap<usize, String>,
    /// One slot per configured column, in slot order
    pub sort_requests: Vec<Option<SortRequest>>,
    /// Page window, if both values were supplied
    pub page: Option<PageRequest>,
}

impl NormalizedParams {
    /// The search term for the column at `index`.
    pub fn column_term(&self, index: usize) -> Option<&str> {
        self.column_search.get(&index).map(String::as_str)
    }

    /// The global search term.
    pub fn global_term(&self) -> Option<&str> {
        self.global_search.as_deref()
    }

    /// Whether any search term was supplied.
    pub fn has_search(&self) -> bool {
        self.global_search.is_some() || !self.column_search.is_empty()
    }
}
