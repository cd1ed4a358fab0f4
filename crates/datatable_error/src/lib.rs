//! Error types for the DataTables server-side adapter.
//!
//! Every error records the source location it was created at. The
//! [`DataTableError`] wrapper aggregates all of them so callers can use `?`
//! across crate boundaries.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod source;
mod target;

pub use config::{ConfigError, ConfigErrorKind};
pub use source::{DataSourceError, DataSourceErrorKind};
pub use target::{TargetError, TargetErrorKind};

/// All error conditions produced while serving a table request.
#[derive(Debug, derive_more::From)]
pub enum DataTableErrorKind {
    /// Configuration is malformed
    Config(ConfigError),
    /// Request target could not be resolved
    Target(TargetError),
    /// Record source or matcher failed
    DataSource(DataSourceError),
}

impl std::fmt::Display for DataTableErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataTableErrorKind::Config(e) => write!(f, "{}", e),
            DataTableErrorKind::Target(e) => write!(f, "{}", e),
            DataTableErrorKind::DataSource(e) => write!(f, "{}", e),
        }
    }
}

/// Top-level error for the adapter.
///
/// # Examples
///
/// ```
/// use datatable_error::{DataTableError, TargetError, TargetErrorKind};
///
/// let err: DataTableError = TargetError::new(TargetErrorKind::UnknownTarget("posts".into())).into();
/// assert!(err.is_client_error());
/// ```
#[derive(Debug)]
pub struct DataTableError(Box<DataTableErrorKind>);

impl DataTableError {
    /// Wrap an error kind.
    pub fn new(kind: DataTableErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// The underlying error kind.
    pub fn kind(&self) -> &DataTableErrorKind {
        &self.0
    }

    /// Whether the failure was caused by the request rather than the server.
    ///
    /// Target errors are the client's fault; configuration and record source
    /// failures are not.
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), DataTableErrorKind::Target(_))
    }
}

impl std::fmt::Display for DataTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DataTable Error: {}", self.0)
    }
}

impl std::error::Error for DataTableError {}

// Generic From implementation for any type that converts to DataTableErrorKind
impl<T> From<T> for DataTableError
where
    T: Into<DataTableErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result alias used throughout the workspace.
pub type DataTableResult<T> = std::result::Result<T, DataTableError>;
