//! PostgreSQL record source.
//!
//! [`SqlRenderer`] turns a [`QueryDescriptor`](datatable_core::QueryDescriptor)
//! into count and fetch statements; [`PgRecordSource`] runs them on a diesel
//! r2d2 pool and returns each row as a JSON object keyed by column identity.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod connection;
mod source;
mod sql;

pub use connection::{PgPool, create_pool, create_pool_from_url};
pub use source::PgRecordSource;
pub use sql::SqlRenderer;
