//! In-memory record source over JSON rows.

use async_trait::async_trait;
use datatable_core::{CompareOp, OrderTerm, Predicate, QueryDescriptor, SortDirection};
use datatable_error::DataTableResult;
use datatable_interface::{Matcher, RecordSource};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Record source holding its rows in memory.
///
/// Rows are JSON objects in either the nested form
/// `{"Article": {"title": "..."}}` or the flat form
/// `{"Article.title": "..."}`. An unqualified field reference is looked up
/// as a top-level key.
///
/// `Contains` compares case-insensitively. Ordering places nulls and
/// missing fields first, then booleans, numbers and strings.
///
/// # Examples
///
/// ```
/// use datatable::{MemorySource, Predicate, QueryDescriptor, RecordSource};
/// use serde_json::json;
///
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let source = MemorySource::new(vec![
///     json!({"Article": {"title": "Rust in practice"}}),
///     json!({"Article.title": "Gardening"}),
/// ]);
/// let query = QueryDescriptor::scoped(vec![], Some(Predicate::contains("Article.title", "RUST")));
/// assert_eq!(source.count(&query).await.unwrap(), 1);
/// # });
/// ```
#[derive(Default)]
pub struct MemorySource {
    rows: Vec<Value>,
    matchers: HashMap<String, Box<dyn Matcher>>,
}

impl std::fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySource")
            .field("rows", &self.rows.len())
            .field("matchers", &self.matchers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MemorySource {
    /// Source over `rows`.
    pub fn new(rows: Vec<Value>) -> Self {
        Self {
            rows,
            matchers: HashMap::new(),
        }
    }

    /// Register a matcher under `name`.
    pub fn with_matcher(mut self, name: impl Into<String>, matcher: impl Matcher + 'static) -> Self {
        self.matchers.insert(name.into(), Box::new(matcher));
        self
    }

    /// All rows, unfiltered.
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    fn matching<'a>(&'a self, predicate: Option<&'a Predicate>) -> impl Iterator<Item = &'a Value> {
        self.rows
            .iter()
            .filter(move |row| predicate.is_none_or(|p| evaluate(row, p)))
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    type Record = Value;

    #[instrument(skip_all, fields(rows = self.rows.len()))]
    async fn count(&self, query: &QueryDescriptor) -> DataTableResult<u64> {
        let count = self.matching(query.predicate.as_ref()).count() as u64;
        debug!(count, "Counted rows");
        Ok(count)
    }

    #[instrument(skip_all, fields(rows = self.rows.len()))]
    async fn fetch(&self, query: &QueryDescriptor) -> DataTableResult<Vec<Value>> {
        let mut rows: Vec<&Value> = self.matching(query.predicate.as_ref()).collect();
        if !query.order.is_empty() {
            rows.sort_by(|a, b| compare_rows(a, b, &query.order));
        }

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        let page: Vec<Value> = rows.into_iter().skip(offset).take(limit).cloned().collect();
        debug!(returned = page.len(), "Fetched rows");
        Ok(page)
    }

    fn matcher(&self, name: &str) -> Option<&dyn Matcher> {
        self.matchers.get(name).map(|m| m.as_ref())
    }
}

/// Value of `field` in `row`, trying the flat key before the nested path.
fn lookup<'v>(row: &'v Value, field: &str) -> Option<&'v Value> {
    if let Some(value) = row.get(field) {
        return Some(value);
    }
    let (entity, name) = field.split_once('.')?;
    row.get(entity)?.get(name)
}

fn evaluate(row: &Value, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Contains { field, term } => lookup(row, field)
            .and_then(as_text)
            .is_some_and(|text| text.to_lowercase().contains(&term.to_lowercase())),
        Predicate::Compare { field, op, value } => match lookup(row, field) {
            Some(actual) if !actual.is_null() && !value.is_null() => {
                compare_op(compare_values(actual, value), *op)
            }
            _ => false,
        },
        Predicate::In { field, values } => lookup(row, field).is_some_and(|actual| {
            values
                .iter()
                .any(|v| compare_values(actual, v) == Some(Ordering::Equal))
        }),
        Predicate::IsNull { field } => lookup(row, field).is_none_or(Value::is_null),
        Predicate::And(children) => children.iter().all(|c| evaluate(row, c)),
        Predicate::Or(children) => children.iter().any(|c| evaluate(row, c)),
        Predicate::Not(child) => !evaluate(row, child),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_op(ordering: Option<Ordering>, op: CompareOp) -> bool {
    let Some(ordering) = ordering else {
        return op == CompareOp::NotEq;
    };
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::NotEq => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
    }
}

/// Ordering between two scalars of comparable type, `None` otherwise.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(_) => 4,
    }
}

fn compare_rows(a: &Value, b: &Value, order: &[OrderTerm]) -> Ordering {
    for term in order {
        let left = lookup(a, term.field());
        let right = lookup(b, term.field());
        let ordering = rank(left).cmp(&rank(right)).then_with(|| match (left, right) {
            (Some(l), Some(r)) => compare_values(l, r).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        });
        let ordering = match term.direction() {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"Article": {"title": "Alpha", "views": 10, "tag": null}}),
            json!({"Article": {"title": "beta", "views": 3, "tag": "rust"}}),
            json!({"Article.title": "Gamma", "Article.views": 7, "Article.tag": "go"}),
        ]
    }

    fn query(predicate: Option<Predicate>) -> QueryDescriptor {
        QueryDescriptor::scoped(vec![], predicate)
    }

    #[test]
    fn test_lookup_nested_and_flat() {
        let rows = rows();
        assert_eq!(lookup(&rows[0], "Article.title"), Some(&json!("Alpha")));
        assert_eq!(lookup(&rows[2], "Article.title"), Some(&json!("Gamma")));
        assert_eq!(lookup(&rows[0], "Article.missing"), None);
        assert_eq!(lookup(&json!({"title": "x"}), "title"), Some(&json!("x")));
    }

    #[test]
    fn test_contains_is_case_insensitive_and_matches_numbers() {
        let rows = rows();
        assert!(evaluate(&rows[1], &Predicate::contains("Article.title", "BET")));
        assert!(evaluate(&rows[0], &Predicate::contains("Article.views", "1")));
        assert!(!evaluate(&rows[0], &Predicate::contains("Article.tag", "r")));
    }

    #[test]
    fn test_compare_and_null_semantics() {
        let rows = rows();
        let at_least_seven = Predicate::compare("Article.views", CompareOp::Gte, 7);
        assert!(evaluate(&rows[0], &at_least_seven));
        assert!(!evaluate(&rows[1], &at_least_seven));
        assert!(evaluate(&rows[0], &Predicate::IsNull { field: "Article.tag".into() }));
        assert!(!evaluate(&rows[0], &Predicate::equals("Article.tag", "rust")));
        assert!(evaluate(
            &rows[1],
            &Predicate::In {
                field: "Article.tag".into(),
                values: vec![json!("go"), json!("rust")],
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_orders_and_windows() {
        let source = MemorySource::new(rows());
        let mut q = query(None);
        q.order.push(OrderTerm::new("Article.views".into(), SortDirection::Desc));
        q.limit = Some(2);
        q.offset = Some(1);
        let page = source.fetch(&q).await.unwrap();
        let views: Vec<_> = page.iter().map(|r| lookup(r, "Article.views").cloned()).collect();
        assert_eq!(views, vec![Some(json!(7)), Some(json!(3))]);
    }

    #[tokio::test]
    async fn test_nulls_sort_first() {
        let source = MemorySource::new(rows());
        let mut q = query(None);
        q.order.push(OrderTerm::new("Article.tag".into(), SortDirection::Asc));
        let page = source.fetch(&q).await.unwrap();
        assert_eq!(lookup(&page[0], "Article.tag"), Some(&Value::Null));
        assert_eq!(lookup(&page[1], "Article.tag"), Some(&json!("go")));
    }

    #[tokio::test]
    async fn test_count_ignores_window() {
        let source = MemorySource::new(rows());
        let mut q = query(Some(Predicate::Not(Box::new(Predicate::contains(
            "Article.title",
            "alpha",
        )))));
        q.limit = Some(1);
        assert_eq!(source.count(&q).await.unwrap(), 2);
    }

    #[test]
    fn test_matcher_lookup() {
        let source = MemorySource::new(vec![]).with_matcher(
            "never",
            |_: &str, _: Option<&str>, _: Option<&str>| -> DataTableResult<Vec<Predicate>> {
                Ok(vec![])
            },
        );
        assert!(source.matcher("never").is_some());
        assert!(source.matcher("other").is_none());
    }
}
