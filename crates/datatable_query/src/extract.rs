//! Extraction of positional wire parameters.

use datatable_core::wire;
use datatable_core::{NormalizedParams, PageRequest, SortDirection, SortRequest};
use datatable_interface::ParamSource;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Read the DataTables parameters for a table with `column_count` columns.
///
/// Parsing is total: a malformed value is treated as absent and never fails
/// the request. The echo token defaults to 0, empty search terms are absent,
/// a sort slot without a numeric column index is empty, and paging applies
/// only when both `iDisplayLength` and `iDisplayStart` are non-negative
/// integers.
///
/// # Examples
///
/// ```
/// use datatable_query::extract_params;
/// use std::collections::HashMap;
///
/// let payload: HashMap<String, String> = [
///     ("sEcho", "4"),
///     ("iSortCol_0", "1"),
///     ("sSortDir_0", "desc"),
///     ("iDisplayStart", "10"),
/// ]
/// .into_iter()
/// .map(|(k, v)| (k.to_string(), v.to_string()))
/// .collect();
///
/// let params = extract_params(&payload, 2);
/// assert_eq!(params.echo, 4);
/// assert!(params.sort_requests[0].is_some());
/// assert!(params.page.is_none());
/// ```
#[instrument(skip(payload))]
pub fn extract_params<P>(payload: &P, column_count: usize) -> NormalizedParams
where
    P: ParamSource + ?Sized,
{
    let echo = payload
        .param(wire::ECHO)
        .and_then(|raw| parse_echo(&raw))
        .unwrap_or(0);

    let global_search = non_empty(payload.param(wire::GLOBAL_SEARCH).as_deref());

    let mut column_search = BTreeMap::new();
    let mut sort_requests = Vec::with_capacity(column_count);
    for i in 0..column_count {
        let search_key = wire::indexed(wire::COLUMN_SEARCH, i);
        if let Some(term) = non_empty(payload.param(&search_key).as_deref()) {
            column_search.insert(i, term);
        }

        let sort_key = wire::indexed(wire::SORT_COLUMN, i);
        let slot = payload
            .param(&sort_key)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .map(|column| {
                let direction_key = wire::indexed(wire::SORT_DIRECTION, i);
                let direction = SortDirection::normalize(payload.param(&direction_key).as_deref());
                SortRequest::new(column, direction)
            });
        sort_requests.push(slot);
    }

    let length = payload.param(wire::DISPLAY_LENGTH).and_then(|raw| non_negative(&raw));
    let start = payload.param(wire::DISPLAY_START).and_then(|raw| non_negative(&raw));
    let page = match (length, start) {
        (Some(limit), Some(offset)) => Some(PageRequest::new(limit, offset)),
        _ => None,
    };

    debug!(
        echo,
        has_global_search = global_search.is_some(),
        column_terms = column_search.len(),
        sort_slots = sort_requests.iter().filter(|s| s.is_some()).count(),
        paged = page.is_some(),
        "Extracted table parameters"
    );

    NormalizedParams {
        echo,
        global_search,
        column_search,
        sort_requests,
        page,
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Integer echo token; fractional numbers are truncated toward zero.
fn parse_echo(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

fn non_negative(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}
