//! Record source backed by a PostgreSQL table.

use crate::{PgPool, SqlRenderer};
use async_trait::async_trait;
use datatable_core::QueryDescriptor;
use datatable_error::{DataSourceError, DataSourceErrorKind, DataTableResult};
use datatable_interface::{Matcher, RecordSource};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Json};
use std::collections::HashMap;
use tracing::{debug, error, instrument};

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct JsonRow {
    #[diesel(sql_type = Json)]
    data: serde_json::Value,
}

/// Answers table requests from one PostgreSQL table.
///
/// Statements run on a blocking task with a pooled connection. Each fetched
/// record is a JSON object keyed by column identity.
///
/// # Example
///
/// ```no_run
/// use datatable_database::{PgRecordSource, SqlRenderer, create_pool};
///
/// // Requires DATABASE_URL=postgresql://localhost/blog in environment
/// let pool = create_pool().unwrap();
/// let source = PgRecordSource::new(pool, SqlRenderer::new("articles", "Article").unwrap());
/// ```
pub struct PgRecordSource {
    pool: PgPool,
    renderer: SqlRenderer,
    matchers: HashMap<String, Box<dyn Matcher>>,
}

impl std::fmt::Debug for PgRecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgRecordSource")
            .field("renderer", &self.renderer)
            .field("matchers", &self.matchers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PgRecordSource {
    /// Source reading through `pool` with statements from `renderer`.
    pub fn new(pool: PgPool, renderer: SqlRenderer) -> Self {
        Self {
            pool,
            renderer,
            matchers: HashMap::new(),
        }
    }

    /// Register a matcher under `name`.
    pub fn with_matcher(mut self, name: impl Into<String>, matcher: impl Matcher + 'static) -> Self {
        self.matchers.insert(name.into(), Box::new(matcher));
        self
    }

    /// Statement renderer.
    pub fn renderer(&self) -> &SqlRenderer {
        &self.renderer
    }

    async fn run<T, F>(&self, sql: String, query: F) -> DataTableResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection, String) -> DataTableResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> DataTableResult<T> {
            let mut conn = pool.get().map_err(|e| {
                error!(error = %e, "Failed to check out connection");
                DataSourceError::from(e)
            })?;
            query(&mut *conn, sql)
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Database task failed");
            DataSourceError::new(DataSourceErrorKind::Connection(format!(
                "Task join error: {}",
                e
            )))
        })?
    }
}

#[async_trait]
impl RecordSource for PgRecordSource {
    type Record = serde_json::Value;

    #[instrument(skip_all, fields(table = %self.renderer.table()))]
    async fn count(&self, query: &QueryDescriptor) -> DataTableResult<u64> {
        let sql = self.renderer.count_sql(query)?;
        let count = self
            .run(sql, |conn, sql| {
                let row: CountRow = diesel::sql_query(sql).get_result(conn).map_err(|e| {
                    error!(error = %e, "Count query failed");
                    DataSourceError::from(e)
                })?;
                Ok(row.count)
            })
            .await?;
        debug!(count, "Counted rows");
        Ok(u64::try_from(count).unwrap_or_default())
    }

    #[instrument(skip_all, fields(table = %self.renderer.table()))]
    async fn fetch(&self, query: &QueryDescriptor) -> DataTableResult<Vec<serde_json::Value>> {
        let sql = self.renderer.fetch_sql(query)?;
        let rows = self
            .run(sql, |conn, sql| {
                let rows: Vec<JsonRow> = diesel::sql_query(sql).load(conn).map_err(|e| {
                    error!(error = %e, "Fetch query failed");
                    DataSourceError::from(e)
                })?;
                Ok(rows.into_iter().map(|row| row.data).collect::<Vec<_>>())
            })
            .await?;
        debug!(returned = rows.len(), "Fetched rows");
        Ok(rows)
    }

    fn matcher(&self, name: &str) -> Option<&dyn Matcher> {
        self.matchers.get(name).map(|m| m.as_ref())
    }
}
