//! Custom per-column search logic.

use datatable_core::Predicate;
use datatable_error::DataTableResult;

/// Contributes predicate fragments for one searchable column.
///
/// The engine calls a matcher once per request for each column configured
/// with it, whether or not a term was supplied, and appends whatever it
/// returns to the search OR group. What counts as a match (full text, ranges,
/// joined tables) is entirely up to the matcher.
///
/// Closures with the matching signature are matchers:
///
/// ```
/// use datatable_core::{CompareOp, Predicate};
/// use datatable_error::DataTableResult;
/// use datatable_interface::Matcher;
///
/// let at_least = |field: &str, _global: Option<&str>, column: Option<&str>| -> DataTableResult<Vec<Predicate>> {
///     Ok(column
///         .and_then(|term| term.parse::<i64>().ok())
///         .map(|min| vec![Predicate::compare(field, CompareOp::Gte, min)])
///         .unwrap_or_default())
/// };
/// let fragments = at_least.contribute("Article.views", None, Some("10")).unwrap();
/// assert_eq!(fragments.len(), 1);
/// ```
pub trait Matcher: Send + Sync {
    /// Fragments for `identity` given the global and per-column terms.
    fn contribute(
        &self,
        identity: &str,
        global_term: Option<&str>,
        column_term: Option<&str>,
    ) -> DataTableResult<Vec<Predicate>>;
}

impl<F> Matcher for F
where
    F: Fn(&str, Option<&str>, Option<&str>) -> DataTableResult<Vec<Predicate>> + Send + Sync,
{
    fn contribute(
        &self,
        identity: &str,
        global_term: Option<&str>,
        column_term: Option<&str>,
    ) -> DataTableResult<Vec<Predicate>> {
        self(identity, global_term, column_term)
    }
}
