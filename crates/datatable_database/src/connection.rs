//! Database connection utilities.

use datatable_error::{DataSourceError, DataSourceErrorKind, DataTableResult};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use tracing::instrument;

/// Pool of PostgreSQL connections.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Create a connection pool for the database at `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - Pool creation fails
#[instrument(name = "database.create_pool")]
pub fn create_pool() -> DataTableResult<PgPool> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        tracing::error!("DATABASE_URL environment variable not set");
        DataSourceError::new(DataSourceErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })?;
    create_pool_from_url(&database_url)
}

/// Create a connection pool for `database_url`.
///
/// # Errors
///
/// Returns an error if the pool cannot open its first connection.
#[instrument(name = "database.create_pool_from_url", skip(database_url))]
pub fn create_pool_from_url(database_url: &str) -> DataTableResult<PgPool> {
    tracing::debug!("Creating PostgreSQL connection pool");
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    let pool = Pool::builder().max_size(10).build(manager).map_err(|e| {
        tracing::error!(error = %e, "Failed to create connection pool");
        DataSourceError::new(DataSourceErrorKind::Connection(e.to_string()))
    })?;
    Ok(pool)
}
