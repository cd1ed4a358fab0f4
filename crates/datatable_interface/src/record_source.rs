//! Record store contract.

use crate::Matcher;
use async_trait::async_trait;
use datatable_core::QueryDescriptor;
use datatable_error::DataTableResult;

/// The record store a table request is answered from.
///
/// Implementations must treat an absent predicate, an empty order list and a
/// missing limit as unconstrained, and must accept qualified
/// (`Article.title`) as well as unqualified field references. Errors are
/// propagated to the caller unchanged.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// One fetched record.
    type Record: Send;

    /// Number of records matching the descriptor's predicate.
    ///
    /// Order, limit and offset are ignored.
    async fn count(&self, query: &QueryDescriptor) -> DataTableResult<u64>;

    /// Records matching the descriptor, ordered and windowed.
    async fn fetch(&self, query: &QueryDescriptor) -> DataTableResult<Vec<Self::Record>>;

    /// Resolve a custom matcher by name.
    fn matcher(&self, _name: &str) -> Option<&dyn Matcher> {
        None
    }
}
