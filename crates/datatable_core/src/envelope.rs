//! Response envelope expected by the DataTables client.

use serde::{Deserialize, Serialize};

/// The JSON envelope returned for a table request.
///
/// `data` starts empty; projecting records into rows belongs to whoever owns
/// field-level serialization.
///
/// # Examples
///
/// ```
/// use datatable_core::ResponseEnvelope;
/// use serde_json::json;
///
/// let envelope = ResponseEnvelope::new(57, 12, 3).with_data(vec![json!(["a", "b"])]);
/// let body = serde_json::to_value(&envelope).unwrap();
/// assert_eq!(body["iTotalRecords"], 57);
/// assert_eq!(body["iTotalDisplayRecords"], 12);
/// assert_eq!(body["sEcho"], 3);
/// assert_eq!(body["aaData"][0][1], "b");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T = serde_json::Value> {
    /// Rows under the base scope, before searching
    #[serde(rename = "iTotalRecords")]
    pub total_records: u64,
    /// Rows after searching, before paging
    #[serde(rename = "iTotalDisplayRecords")]
    pub total_display_records: u64,
    /// Echo token from the request
    #[serde(rename = "sEcho")]
    pub echo: i64,
    /// Projected rows
    #[serde(rename = "aaData")]
    pub data: Vec<T>,
}

impl ResponseEnvelope {
    /// Envelope with counts and echo token and no rows yet.
    pub fn new(total_records: u64, total_display_records: u64, echo: i64) -> Self {
        Self {
            total_records,
            total_display_records,
            echo,
            data: Vec::new(),
        }
    }
}

impl<T> ResponseEnvelope<T> {
    /// Replace the rows, keeping the counts and echo token.
    pub fn with_data<U>(self, data: Vec<U>) -> ResponseEnvelope<U> {
        ResponseEnvelope {
            total_records: self.total_records,
            total_display_records: self.total_display_records,
            echo: self.echo,
            data,
        }
    }
}
