//! Column metadata for the client-side table initializer.

use datatable_query::ColumnRegistry;
use derive_getters::Getters;
use serde_json::{Map, Value, json};

/// Header labels and `aoColumns` entries for one table.
///
/// # Examples
///
/// ```
/// use datatable::{ClientColumns, ColumnConfig, ColumnRegistry};
/// use serde_json::{Map, json};
///
/// let registry = ColumnRegistry::build(
///     &ColumnConfig::new().label("title", "Title").unbound("Actions"),
///     "Article",
/// )
/// .unwrap();
/// let mut columns = ClientColumns::from_registry(&registry);
/// assert!(columns.set_label(0, "<b>__LABEL__</b>"));
/// assert_eq!(columns.labels(), &vec!["<b>Title</b>".to_string(), "Actions".to_string()]);
///
/// let mut js = Map::new();
/// js.insert("bServerSide".into(), json!(true));
/// js.insert("aoColumns".into(), json!(true));
/// let js = columns.js_settings(js, "/articles");
/// assert_eq!(js["sAjaxSource"], "/articles");
/// assert_eq!(js["aoColumns"][1]["bSortable"], false);
/// ```
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ClientColumns {
    /// Header text per column
    labels: Vec<String>,
    /// `aoColumns` entries per column
    columns: Vec<Value>,
}

impl ClientColumns {
    /// Labels and flags for every column, bound or not, in wire order.
    pub fn from_registry(registry: &ColumnRegistry) -> Self {
        let labels = registry.columns().iter().map(|c| c.label().clone()).collect();
        let columns = registry
            .columns()
            .iter()
            .map(|c| {
                json!({
                    "bSortable": c.is_sortable(),
                    "bSearchable": c.is_searchable(),
                })
            })
            .collect();
        Self { labels, columns }
    }

    /// Replace the label at `index`. `__LABEL__` in `label` stands for the
    /// current label.
    ///
    /// Returns false when `index` is out of range.
    pub fn set_label(&mut self, index: usize, label: &str) -> bool {
        match self.labels.get_mut(index) {
            Some(current) => {
                *current = label.replace("__LABEL__", current);
                true
            }
            None => false,
        }
    }

    /// Complete the caller's initializer options.
    ///
    /// With a truthy `bServerSide`, a missing or `true` `sAjaxSource` becomes
    /// `current_url`. `aoColumns: true` is replaced by the computed entries.
    /// Every other key passes through.
    pub fn js_settings(&self, mut js: Map<String, Value>, current_url: &str) -> Map<String, Value> {
        if js.get("bServerSide").is_some_and(truthy) {
            match js.get("sAjaxSource") {
                None | Some(Value::Bool(true)) | Some(Value::Null) => {
                    js.insert("sAjaxSource".into(), Value::String(current_url.to_string()));
                }
                _ => {}
            }
        }
        if js.get("aoColumns") == Some(&Value::Bool(true)) {
            js.insert("aoColumns".into(), Value::Array(self.columns.clone()));
        }
        js
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datatable_core::{ColumnConfig, ColumnOptions};

    fn columns() -> ClientColumns {
        let registry = ColumnRegistry::build(
            &ColumnConfig::new()
                .label("title", "Title")
                .column("body", ColumnOptions::default().with_sortable(false))
                .unbound("Actions"),
            "Article",
        )
        .unwrap();
        ClientColumns::from_registry(&registry)
    }

    #[test]
    fn test_flags_follow_registry() {
        let columns = columns();
        assert_eq!(columns.labels(), &vec!["Title", "Body", "Actions"]);
        assert_eq!(
            columns.columns()[1],
            json!({"bSortable": false, "bSearchable": true})
        );
        assert_eq!(
            columns.columns()[2],
            json!({"bSortable": false, "bSearchable": false})
        );
    }

    #[test]
    fn test_set_label_out_of_range() {
        let mut columns = columns();
        assert!(!columns.set_label(3, "x"));
        assert!(columns.set_label(2, ""));
        assert_eq!(columns.labels()[2], "");
    }

    #[test]
    fn test_explicit_ajax_source_is_kept() {
        let mut js = Map::new();
        js.insert("bServerSide".into(), json!(1));
        js.insert("sAjaxSource".into(), json!("/elsewhere"));
        js.insert("iDisplayLength".into(), json!(25));
        let js = columns().js_settings(js, "/articles");
        assert_eq!(js["sAjaxSource"], "/elsewhere");
        assert_eq!(js["iDisplayLength"], 25);
        assert!(!js.contains_key("aoColumns"));
    }

    #[test]
    fn test_client_side_tables_get_no_source() {
        let mut js = Map::new();
        js.insert("bServerSide".into(), json!("0"));
        let js = columns().js_settings(js, "/articles");
        assert!(!js.contains_key("sAjaxSource"));
    }
}
