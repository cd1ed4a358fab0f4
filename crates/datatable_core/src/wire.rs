//! Wire parameter names of the DataTables server-side protocol.
//!
//! Keys are case-sensitive. Per-column keys carry a `_<i>` suffix.

/// Echo token, round-tripped unchanged.
pub const ECHO: &str = "sEcho";
/// Global search term.
pub const GLOBAL_SEARCH: &str = "sSearch";
/// Per-column search term prefix.
pub const COLUMN_SEARCH: &str = "sSearch";
/// Sort slot column index prefix.
pub const SORT_COLUMN: &str = "iSortCol";
/// Sort slot direction prefix.
pub const SORT_DIRECTION: &str = "sSortDir";
/// Row offset.
pub const DISPLAY_START: &str = "iDisplayStart";
/// Row limit.
pub const DISPLAY_LENGTH: &str = "iDisplayLength";
/// Target table when more than one is configured.
pub const TARGET: &str = "dtTarget";

/// Builds the positional key `<prefix>_<index>`.
pub fn indexed(prefix: &str, index: usize) -> String {
    format!("{}_{}", prefix, index)
}
