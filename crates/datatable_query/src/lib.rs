//! Translation of DataTables wire requests into query descriptors.
//!
//! Three pieces, used in this order for every request:
//!
//! 1. [`ColumnRegistry`] turns column configuration into ordered descriptors.
//! 2. [`extract_params`] reads the positional wire parameters.
//! 3. [`QueryDescriptorBuilder`] runs the sort, search and paginate passes.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod extract;
mod registry;

pub use builder::QueryDescriptorBuilder;
pub use extract::extract_params;
pub use registry::{ColumnRegistry, humanize};
