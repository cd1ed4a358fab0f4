//! Server-side adapter for the DataTables AJAX protocol.
//!
//! A table request arrives as positional, stringly-typed parameters
//! (`iSortCol_0`, `sSearch_2`, `iDisplayStart`, ...). This crate resolves the
//! configured table, translates the parameters into a [`QueryDescriptor`],
//! runs it against a [`RecordSource`] three times (scoped count, filtered
//! count, paged fetch) and returns the [`ResponseEnvelope`] the client
//! expects.
//!
//! # Example
//!
//! ```
//! use datatable::{ColumnConfig, DataTable, Defaults, MemorySource, TableSettingsBuilder};
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let table = DataTable::new(
//!     "articles",
//!     Defaults::default(),
//!     TableSettingsBuilder::default()
//!         .entity("Article")
//!         .columns(ColumnConfig::new().label("title", "Title").label("user_id", "User"))
//!         .build()
//!         .unwrap(),
//! )
//! .unwrap();
//!
//! let source = MemorySource::new(vec![
//!     json!({"Article": {"title": "First", "user_id": 1}}),
//!     json!({"Article": {"title": "Second", "user_id": 3}}),
//! ]);
//! let payload = vec![("sEcho".to_string(), "1".to_string())];
//!
//! let output = table.handle(&payload, None, &source).await.unwrap();
//! assert_eq!(output.envelope().total_records, 2);
//! assert_eq!(output.envelope().echo, 1);
//! # });
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod memory;
mod table;
mod tables;

pub use client::ClientColumns;
pub use memory::MemorySource;
pub use table::{DataTable, DataTableOutput};
pub use tables::DataTables;

pub use datatable_core::{
    ColumnConfig, ColumnDescriptor, ColumnEntry, ColumnOptions, ColumnSpec, CompareOp,
    DataTableSettings, Defaults, NormalizedParams, OrderTerm, PageRequest, Predicate,
    QueryDescriptor, ResolvedSettings, ResponseEnvelope, SearchStrategy, Searchable,
    SettingsOverrides, SortDirection, SortRequest, TableSettings, TableSettingsBuilder, wire,
};
pub use datatable_error::{
    ConfigError, ConfigErrorKind, DataSourceError, DataSourceErrorKind, DataTableError,
    DataTableErrorKind, DataTableResult, TargetError, TargetErrorKind,
};
pub use datatable_interface::{Matcher, ParamSource, RecordSource};
pub use datatable_query::{ColumnRegistry, QueryDescriptorBuilder, extract_params, humanize};

#[cfg(feature = "database")]
pub use datatable_database::{PgRecordSource, SqlRenderer, create_pool};
