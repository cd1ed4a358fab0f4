//! SQL rendering for query descriptors.

use datatable_core::{OrderTerm, Predicate, QueryDescriptor};
use datatable_error::{DataSourceError, DataSourceErrorKind, DataTableResult};
use derive_getters::Getters;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, instrument};

/// A bare or `alias.column` identifier.
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$";

/// Renders count and fetch statements for one table.
///
/// Identifiers are checked against a strict pattern and double-quoted;
/// literals are single-quoted with embedded quotes doubled. Join clauses are
/// emitted verbatim and must come from trusted configuration.
///
/// Fetch statements select each field under its identity, so a row comes
/// back as `{"Article.title": ..., "User.name": ...}`.
///
/// # Examples
///
/// ```
/// use datatable_core::{Predicate, QueryDescriptor};
/// use datatable_database::SqlRenderer;
///
/// let renderer = SqlRenderer::new("articles", "Article").unwrap();
/// let query = QueryDescriptor::scoped(
///     vec!["Article.title".into()],
///     Some(Predicate::equals("Article.published", true)),
/// );
/// assert_eq!(
///     renderer.count_sql(&query).unwrap(),
///     r#"SELECT COUNT(*) AS count FROM "articles" AS "Article" WHERE "Article"."published" = TRUE"#
/// );
/// ```
#[derive(Debug, Clone, Getters)]
pub struct SqlRenderer {
    /// Physical table, optionally schema-qualified
    table: String,
    /// Alias the table is selected under
    entity: String,
    /// Raw join clauses appended after the base table
    joins: Vec<String>,
    #[getter(skip)]
    pattern: Regex,
}

impl SqlRenderer {
    /// Renderer selecting from `table` under the alias `entity`.
    ///
    /// # Errors
    ///
    /// Either name is not a valid identifier.
    pub fn new(table: impl Into<String>, entity: impl Into<String>) -> DataTableResult<Self> {
        let pattern = Regex::new(IDENTIFIER_PATTERN).map_err(|e| {
            DataSourceError::new(DataSourceErrorKind::Unsupported(e.to_string()))
        })?;
        let renderer = Self {
            table: table.into(),
            entity: entity.into(),
            joins: Vec::new(),
            pattern,
        };
        renderer.identifier(&renderer.table)?;
        if renderer.entity.contains('.') {
            return Err(unsupported(format!(
                "entity alias '{}' must not be qualified",
                renderer.entity
            )));
        }
        renderer.identifier(&renderer.entity)?;
        Ok(renderer)
    }

    /// Append a join clause, e.g. `JOIN "users" AS "User" ON "User"."id" = "Article"."user_id"`.
    pub fn with_join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Quote a field or table reference.
    ///
    /// # Errors
    ///
    /// The name does not match the identifier pattern.
    pub fn identifier(&self, name: &str) -> DataTableResult<String> {
        if !self.pattern.is_match(name) {
            return Err(unsupported(format!("invalid identifier '{}'", name)));
        }
        Ok(name
            .split('.')
            .map(|part| format!("\"{}\"", part))
            .collect::<Vec<_>>()
            .join("."))
    }

    /// Render a scalar as a SQL literal.
    ///
    /// # Errors
    ///
    /// Arrays and objects have no literal form.
    pub fn literal(value: &Value) -> DataTableResult<String> {
        match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Bool(true) => Ok("TRUE".to_string()),
            Value::Bool(false) => Ok("FALSE".to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::String(s) => Ok(quote(s)),
            other => Err(unsupported(format!("no literal form for {}", other))),
        }
    }

    /// Render a predicate tree as a boolean SQL expression.
    pub fn predicate(&self, predicate: &Predicate) -> DataTableResult<String> {
        match predicate {
            Predicate::Contains { field, term } => Ok(format!(
                "CAST({} AS TEXT) ILIKE {} ESCAPE '\\'",
                self.identifier(field)?,
                quote(&format!("%{}%", escape_like(term)))
            )),
            Predicate::Compare { field, op, value } => Ok(format!(
                "{} {} {}",
                self.identifier(field)?,
                op,
                Self::literal(value)?
            )),
            Predicate::In { field, values } => {
                if values.is_empty() {
                    return Ok("FALSE".to_string());
                }
                let values = values
                    .iter()
                    .map(Self::literal)
                    .collect::<DataTableResult<Vec<_>>>()?;
                Ok(format!("{} IN ({})", self.identifier(field)?, values.join(", ")))
            }
            Predicate::IsNull { field } => Ok(format!("{} IS NULL", self.identifier(field)?)),
            Predicate::And(children) => self.group(children, " AND ", "TRUE"),
            Predicate::Or(children) => self.group(children, " OR ", "FALSE"),
            Predicate::Not(child) => Ok(format!("NOT ({})", self.predicate(child)?)),
        }
    }

    /// `SELECT COUNT(*)` under the descriptor's predicate.
    #[instrument(skip_all, fields(table = %self.table))]
    pub fn count_sql(&self, query: &QueryDescriptor) -> DataTableResult<String> {
        let sql = format!(
            "SELECT COUNT(*) AS count FROM {}{}",
            self.from_clause()?,
            self.where_clause(query.predicate.as_ref())?
        );
        debug!(sql = %sql, "Rendered count");
        Ok(sql)
    }

    /// One JSON object per row, ordered and windowed.
    #[instrument(skip_all, fields(table = %self.table))]
    pub fn fetch_sql(&self, query: &QueryDescriptor) -> DataTableResult<String> {
        let mut sql = format!(
            "SELECT row_to_json(t) AS data FROM {} CROSS JOIN LATERAL (SELECT {}) t{}",
            self.from_clause()?,
            self.select_list(&query.fields)?,
            self.where_clause(query.predicate.as_ref())?
        );
        if !query.order.is_empty() {
            let terms = query
                .order
                .iter()
                .map(|term| self.order_term(term))
                .collect::<DataTableResult<Vec<_>>>()?;
            sql.push_str(&format!(" ORDER BY {}", terms.join(", ")));
        }
        // Postgres takes bigint windows.
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit.min(i64::MAX as u64)));
        }
        if let Some(offset) = query.offset {
            sql.push_str(&format!(" OFFSET {}", offset.min(i64::MAX as u64)));
        }
        debug!(sql = %sql, "Rendered fetch");
        Ok(sql)
    }

    fn from_clause(&self) -> DataTableResult<String> {
        let mut from = format!(
            "{} AS {}",
            self.identifier(&self.table)?,
            self.identifier(&self.entity)?
        );
        for join in &self.joins {
            from.push(' ');
            from.push_str(join);
        }
        Ok(from)
    }

    fn where_clause(&self, predicate: Option<&Predicate>) -> DataTableResult<String> {
        match predicate {
            Some(predicate) => Ok(format!(" WHERE {}", self.predicate(predicate)?)),
            None => Ok(String::new()),
        }
    }

    fn select_list(&self, fields: &[String]) -> DataTableResult<String> {
        if fields.is_empty() {
            return Ok(format!("{}.*", self.identifier(&self.entity)?));
        }
        let columns = fields
            .iter()
            .map(|field| {
                Ok(format!(
                    "{} AS \"{}\"",
                    self.identifier(field)?,
                    field
                ))
            })
            .collect::<DataTableResult<Vec<_>>>()?;
        Ok(columns.join(", "))
    }

    fn order_term(&self, term: &OrderTerm) -> DataTableResult<String> {
        Ok(format!(
            "{} {}",
            self.identifier(term.field())?,
            term.direction().to_string().to_uppercase()
        ))
    }

    fn group(&self, children: &[Predicate], joiner: &str, empty: &str) -> DataTableResult<String> {
        if children.is_empty() {
            return Ok(empty.to_string());
        }
        let parts = children
            .iter()
            .map(|child| self.predicate(child).map(|sql| format!("({})", sql)))
            .collect::<DataTableResult<Vec<_>>>()?;
        Ok(parts.join(joiner))
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[track_caller]
fn unsupported(message: String) -> datatable_error::DataTableError {
    DataSourceError::new(DataSourceErrorKind::Unsupported(message)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use datatable_core::{CompareOp, SortDirection};
    use serde_json::json;

    fn renderer() -> SqlRenderer {
        SqlRenderer::new("articles", "Article").unwrap()
    }

    #[test]
    fn test_identifiers_are_validated_and_quoted() {
        let r = renderer();
        assert_eq!(r.identifier("Article.title").unwrap(), r#""Article"."title""#);
        assert_eq!(r.identifier("title").unwrap(), r#""title""#);
        assert!(r.identifier("title; DROP TABLE x").is_err());
        assert!(r.identifier("a.b.c").is_err());
        assert!(r.identifier("\"Article\"").is_err());
    }

    #[test]
    fn test_invalid_table_is_rejected() {
        assert!(SqlRenderer::new("articles--", "Article").is_err());
        assert!(SqlRenderer::new("public.articles", "Article").is_ok());
        assert!(SqlRenderer::new("articles", "A.B").is_err());
    }

    #[test]
    fn test_contains_escapes_wildcards_and_quotes() {
        let sql = renderer()
            .predicate(&Predicate::contains("Article.title", "50%_o'k"))
            .unwrap();
        assert_eq!(
            sql,
            r#"CAST("Article"."title" AS TEXT) ILIKE '%50\%\_o''k%' ESCAPE '\'"#
        );
    }

    #[test]
    fn test_search_group_is_parenthesized() {
        let scope = Predicate::equals("Article.published", true);
        let search = Predicate::Or(vec![
            Predicate::contains("Article.title", "a"),
            Predicate::compare("Article.views", CompareOp::Gte, 10),
        ]);
        let sql = renderer()
            .predicate(&Predicate::conjoin(Some(scope), search))
            .unwrap();
        assert_eq!(
            sql,
            r#"("Article"."published" = TRUE) AND ((CAST("Article"."title" AS TEXT) ILIKE '%a%' ESCAPE '\') OR ("Article"."views" >= 10))"#
        );
    }

    #[test]
    fn test_in_null_and_not() {
        let r = renderer();
        let in_list = Predicate::In {
            field: "Article.status".into(),
            values: vec![json!("draft"), json!(2)],
        };
        assert_eq!(r.predicate(&in_list).unwrap(), r#""Article"."status" IN ('draft', 2)"#);
        let empty = Predicate::In {
            field: "Article.status".into(),
            values: vec![],
        };
        assert_eq!(r.predicate(&empty).unwrap(), "FALSE");
        let not_null = Predicate::Not(Box::new(Predicate::IsNull {
            field: "Article.tag".into(),
        }));
        assert_eq!(r.predicate(&not_null).unwrap(), r#"NOT ("Article"."tag" IS NULL)"#);
        assert!(SqlRenderer::literal(&json!([1])).is_err());
    }

    #[test]
    fn test_fetch_statement() {
        let mut query = QueryDescriptor::scoped(
            vec!["Article.title".into(), "User.name".into()],
            None,
        );
        query.order.push(OrderTerm::new("User.name".into(), SortDirection::Desc));
        query.limit = Some(5);
        query.offset = Some(10);
        let renderer = renderer()
            .with_join(r#"JOIN "users" AS "User" ON "User"."id" = "Article"."user_id""#);
        assert_eq!(
            renderer.fetch_sql(&query).unwrap(),
            concat!(
                r#"SELECT row_to_json(t) AS data FROM "articles" AS "Article" "#,
                r#"JOIN "users" AS "User" ON "User"."id" = "Article"."user_id" "#,
                r#"CROSS JOIN LATERAL (SELECT "Article"."title" AS "Article.title", "User"."name" AS "User.name") t"#,
                r#" ORDER BY "User"."name" DESC LIMIT 5 OFFSET 10"#,
            )
        );
    }

    #[test]
    fn test_window_is_capped_at_bigint() {
        let mut query = QueryDescriptor::default();
        query.limit = Some(u64::MAX);
        query.offset = Some(u64::MAX);
        let sql = renderer().fetch_sql(&query).unwrap();
        assert!(sql.ends_with(&format!(" LIMIT {0} OFFSET {0}", i64::MAX)));
    }

    #[test]
    fn test_fetch_without_fields_selects_entity() {
        let sql = renderer().fetch_sql(&QueryDescriptor::default()).unwrap();
        assert_eq!(
            sql,
            r#"SELECT row_to_json(t) AS data FROM "articles" AS "Article" CROSS JOIN LATERAL (SELECT "Article".*) t"#
        );
    }
}
