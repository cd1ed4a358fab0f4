//! Raw request payload access.

use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Read-only view of a decoded query string or request body.
pub trait ParamSource {
    /// The raw value for `key`, if present.
    fn param(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl<S: BuildHasher> ParamSource for HashMap<String, String, S> {
    fn param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl ParamSource for BTreeMap<String, String> {
    fn param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

// Repeated keys: the first occurrence wins.
impl ParamSource for [(String, String)] {
    fn param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| Cow::Borrowed(v.as_str()))
    }
}

impl ParamSource for Vec<(String, String)> {
    fn param(&self, key: &str) -> Option<Cow<'_, str>> {
        self.as_slice().param(key)
    }
}

/// JSON bodies: scalars are rendered as text, containers and null are absent.
impl ParamSource for serde_json::Map<String, Value> {
    fn param(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.get(key)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(b) => Some(Cow::Owned(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl<T: ParamSource + ?Sized> ParamSource for &T {
    fn param(&self, key: &str) -> Option<Cow<'_, str>> {
        (**self).param(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pairs_first_occurrence_wins() {
        let pairs = vec![
            ("sEcho".to_string(), "1".to_string()),
            ("sEcho".to_string(), "2".to_string()),
        ];
        assert_eq!(pairs.param("sEcho").as_deref(), Some("1"));
        assert_eq!(pairs.param("sSearch"), None);
    }

    #[test]
    fn test_json_scalars_render_as_text() {
        let body = json!({"sEcho": 7, "sSearch": "foo", "bRegex": false, "x": null});
        let map = body.as_object().unwrap();
        assert_eq!(map.param("sEcho").as_deref(), Some("7"));
        assert_eq!(map.param("sSearch").as_deref(), Some("foo"));
        assert_eq!(map.param("bRegex").as_deref(), Some("false"));
        assert_eq!(map.param("x"), None);
    }
}
