//! Column configuration and normalized column descriptors.

use datatable_error::{ConfigError, ConfigErrorKind};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// How a column takes part in searching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    /// Default `CONTAINS` matching on global and column terms.
    AlwaysOn,
    /// Never searched.
    AlwaysOff,
    /// Delegated to a matcher the record source resolves by name.
    CustomMatcher(String),
}

impl SearchStrategy {
    /// Whether the column takes part in searching at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SearchStrategy::AlwaysOff)
    }

    /// Name of the custom matcher, if any.
    pub fn matcher(&self) -> Option<&str> {
        match self {
            SearchStrategy::CustomMatcher(name) => Some(name),
            _ => None,
        }
    }
}

impl From<bool> for SearchStrategy {
    fn from(enabled: bool) -> Self {
        if enabled {
            SearchStrategy::AlwaysOn
        } else {
            SearchStrategy::AlwaysOff
        }
    }
}

/// Searchability as written in configuration: a flag or a matcher name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Searchable {
    /// Plain on/off switch
    Enabled(bool),
    /// Name of a custom matcher
    Matcher(String),
}

impl From<bool> for Searchable {
    fn from(enabled: bool) -> Self {
        Searchable::Enabled(enabled)
    }
}

impl From<&str> for Searchable {
    fn from(matcher: &str) -> Self {
        Searchable::Matcher(matcher.to_string())
    }
}

/// Explicit per-column options.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Deserialize, derive_getters::Getters, derive_setters::Setters,
)]
#[serde(deny_unknown_fields)]
#[setters(prefix = "with_", strip_option, into)]
pub struct ColumnOptions {
    /// Header text
    #[serde(default)]
    label: Option<String>,
    /// Whether the column can be sorted
    #[serde(default)]
    sortable: Option<bool>,
    /// Whether and how the column can be searched
    #[serde(default)]
    searchable: Option<Searchable>,
    /// Field identity overriding the configured key
    #[serde(default)]
    field: Option<String>,
    /// `false` marks a label-only column
    #[serde(default)]
    bound: Option<bool>,
}

/// One column's configuration, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSpec {
    /// Label-only column that is never queried.
    Unbound,
    /// Sortable and searchable both set to the flag.
    Enabled(bool),
    /// Header text; sortable and searchable.
    Label(String),
    /// Explicit options.
    Options(ColumnOptions),
}

impl ColumnSpec {
    /// Interpret a JSON value as a column spec for `key`.
    ///
    /// `null` is the unbound marker. Numbers, arrays and unknown option keys
    /// are rejected rather than coerced.
    pub fn from_value(key: &str, value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Null => Ok(ColumnSpec::Unbound),
            Value::Bool(enabled) => Ok(ColumnSpec::Enabled(*enabled)),
            Value::String(label) => Ok(ColumnSpec::Label(label.clone())),
            Value::Object(_) => serde_json::from_value::<ColumnOptions>(value.clone())
                .map(ColumnSpec::Options)
                .map_err(|e| ConfigError::invalid_column(key, e.to_string())),
            Value::Number(_) => Err(ConfigError::invalid_column(
                key,
                "numbers are not column specs",
            )),
            Value::Array(_) => Err(ConfigError::invalid_column(
                key,
                "lists are not column specs",
            )),
        }
    }
}

impl From<bool> for ColumnSpec {
    fn from(enabled: bool) -> Self {
        ColumnSpec::Enabled(enabled)
    }
}

impl From<&str> for ColumnSpec {
    fn from(label: &str) -> Self {
        ColumnSpec::Label(label.to_string())
    }
}

impl From<ColumnOptions> for ColumnSpec {
    fn from(options: ColumnOptions) -> Self {
        ColumnSpec::Options(options)
    }
}

/// A configured key with its spec.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_new::new)]
pub struct ColumnEntry {
    /// Field name, qualified identity or label-only key
    key: String,
    /// Unnormalized spec
    spec: ColumnSpec,
}

/// Ordered column configuration.
///
/// Order is declaration order and determines each column's wire index.
///
/// # Examples
///
/// ```
/// use datatable_core::ColumnConfig;
///
/// let columns = ColumnConfig::new()
///     .label("title", "Title")
///     .label("user_id", "User")
///     .unbound("Actions");
/// assert_eq!(columns.len(), 3);
/// assert_eq!(columns.entries()[2].key(), "Actions");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnConfig {
    entries: Vec<ColumnEntry>,
}

impl ColumnConfig {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn column(mut self, key: impl Into<String>, spec: impl Into<ColumnSpec>) -> Self {
        self.entries.push(ColumnEntry::new(key.into(), spec.into()));
        self
    }

    /// Append a sortable, searchable column with a header label.
    pub fn label(self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.column(key, ColumnSpec::Label(label.into()))
    }

    /// Append a column with sorting and searching both on or both off.
    pub fn enabled(self, key: impl Into<String>, enabled: bool) -> Self {
        self.column(key, ColumnSpec::Enabled(enabled))
    }

    /// Append a label-only column.
    pub fn unbound(self, key: impl Into<String>) -> Self {
        self.column(key, ColumnSpec::Unbound)
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[ColumnEntry] {
        &self.entries
    }

    /// Number of configured columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no column is configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a configuration from JSON.
    ///
    /// Accepts a table of `key → spec` or a list whose items are a bare
    /// field name, a one-entry table `{key: spec}` or a `[key, spec]` pair.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        match value {
            Value::Object(map) => {
                for (key, spec) in map {
                    config = config.column(key.clone(), ColumnSpec::from_value(key, spec)?);
                }
            }
            Value::Array(items) => {
                for (position, item) in items.iter().enumerate() {
                    let (key, spec) = list_item(position, item)?;
                    config = config.column(key, spec);
                }
            }
            _ => {
                return Err(ConfigError::new(ConfigErrorKind::InvalidSetting(
                    "columns must be a table or a list".to_string(),
                )));
            }
        }
        Ok(config)
    }
}

fn list_item(position: usize, item: &Value) -> Result<(String, ColumnSpec), ConfigError> {
    match item {
        Value::String(field) => Ok((field.clone(), ColumnSpec::Enabled(true))),
        Value::Object(map) if map.len() == 1 => {
            let (key, spec) = map.iter().next().ok_or_else(|| {
                ConfigError::invalid_column(format!("#{}", position), "empty table")
            })?;
            Ok((key.clone(), ColumnSpec::from_value(key, spec)?))
        }
        Value::Array(pair) if pair.len() == 2 => match &pair[0] {
            Value::String(key) => Ok((key.clone(), ColumnSpec::from_value(key, &pair[1])?)),
            _ => Err(ConfigError::invalid_column(
                format!("#{}", position),
                "pair key must be a string",
            )),
        },
        _ => Err(ConfigError::invalid_column(
            format!("#{}", position),
            "list items must be a field name, a one-entry table or a [key, spec] pair",
        )),
    }
}

impl<'de> Deserialize<'de> for ColumnConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ColumnConfig::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// A normalized column.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_new::new)]
pub struct ColumnDescriptor {
    /// `entity.field` for bound columns, the raw key otherwise
    identity: String,
    /// Whether the column maps to a queryable field
    bound: bool,
    /// Header text
    label: String,
    /// Sortable flag as configured
    sortable: bool,
    /// Search strategy as configured
    searchable: SearchStrategy,
    /// Zero-based declaration position
    index: usize,
}

impl ColumnDescriptor {
    /// Whether a sort request may target this column.
    pub fn is_sortable(&self) -> bool {
        self.bound && self.sortable
    }

    /// Whether the search pass visits this column.
    pub fn is_searchable(&self) -> bool {
        self.bound && self.searchable.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_declaration_order() {
        let config = ColumnConfig::from_json(&json!({
            "zeta": "Z",
            "alpha": true,
            "mid": null,
        }))
        .unwrap();
        let keys: Vec<_> = config.entries().iter().map(|e| e.key().as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(config.entries()[2].spec(), &ColumnSpec::Unbound);
    }

    #[test]
    fn test_list_forms() {
        let config =
            ColumnConfig::from_json(&json!(["title", {"body": false}, ["Actions", null]])).unwrap();
        assert_eq!(config.entries()[0].spec(), &ColumnSpec::Enabled(true));
        assert_eq!(config.entries()[1].spec(), &ColumnSpec::Enabled(false));
        assert_eq!(config.entries()[2].key(), "Actions");
    }

    #[test]
    fn test_number_spec_names_the_key() {
        let err = ColumnConfig::from_json(&json!({"title": 3})).unwrap_err();
        assert!(matches!(
            err.kind,
            ConfigErrorKind::InvalidColumnSpec { ref key, .. } if key == "title"
        ));
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err = ColumnConfig::from_json(&json!({"title": {"searchble": true}})).unwrap_err();
        assert!(format!("{}", err).contains("title"));
    }

    #[test]
    fn test_searchable_matcher_option() {
        let config =
            ColumnConfig::from_json(&json!({"body": {"searchable": "fullText"}})).unwrap();
        match config.entries()[0].spec() {
            ColumnSpec::Options(options) => {
                assert_eq!(options.searchable(), &Some(Searchable::from("fullText")));
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }
}
