//! Core data types for the DataTables server-side adapter.
//!
//! This crate holds the request-independent model shared by the translation
//! engine and the record sources: column descriptors, normalized wire
//! parameters, the query descriptor with its predicate tree, the response
//! envelope and table settings.

mod column;
mod envelope;
mod params;
mod query;
mod settings;
pub mod wire;

pub use column::{
    ColumnConfig, ColumnDescriptor, ColumnEntry, ColumnOptions, ColumnSpec, SearchStrategy,
    Searchable,
};
pub use envelope::ResponseEnvelope;
pub use params::{NormalizedParams, PageRequest, SortRequest};
pub use query::{CompareOp, OrderTerm, Predicate, QueryDescriptor, SortDirection};
pub use settings::{
    DataTableSettings, Defaults, ResolvedSettings, SettingsOverrides, TableSettings,
    TableSettingsBuilder,
};
