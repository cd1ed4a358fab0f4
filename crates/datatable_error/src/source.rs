//! Record source error types.

/// Kinds of record source failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DataSourceErrorKind {
    /// Connection could not be established or checked out
    #[display("Connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Query error: {}", _0)]
    Query(String),
    /// Row could not be converted
    #[display("Serialization error: {}", _0)]
    Serialization(String),
    /// Descriptor contains something the source cannot express
    #[display("Unsupported query: {}", _0)]
    Unsupported(String),
}

/// Record source error with location tracking.
///
/// # Examples
///
/// ```
/// use datatable_error::{DataSourceError, DataSourceErrorKind};
///
/// let err = DataSourceError::new(DataSourceErrorKind::Query("syntax error".to_string()));
/// assert!(format!("{}", err).contains("syntax error"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Data Source Error: {} at line {} in {}", kind, line, file)]
pub struct DataSourceError {
    /// The kind of error that occurred
    pub kind: DataSourceErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DataSourceError {
    /// Create a new data source error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DataSourceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

// Diesel error conversions (only available with database feature)
#[cfg(feature = "database")]
impl From<diesel::result::Error> for DataSourceError {
    fn from(err: diesel::result::Error) -> Self {
        DataSourceError::new(DataSourceErrorKind::Query(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for DataSourceError {
    fn from(err: diesel::ConnectionError) -> Self {
        DataSourceError::new(DataSourceErrorKind::Connection(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::r2d2::PoolError> for DataSourceError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        DataSourceError::new(DataSourceErrorKind::Connection(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<serde_json::Error> for DataSourceError {
    fn from(err: serde_json::Error) -> Self {
        DataSourceError::new(DataSourceErrorKind::Serialization(err.to_string()))
    }
}
