//! Configuration error types.

/// Specific error conditions for table configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigErrorKind {
    /// Column spec has a shape that cannot be normalized
    InvalidColumnSpec {
        /// Configured column key
        key: String,
        /// What was wrong with the spec
        reason: String,
    },
    /// Column key is empty or whitespace
    EmptyColumnKey(usize),
    /// Two columns resolve to the same identity
    DuplicateColumn(String),
    /// Column names a matcher the record source does not provide
    UnknownMatcher {
        /// Column identity
        column: String,
        /// Matcher name
        matcher: String,
    },
    /// A settings value is out of range
    InvalidSetting(String),
    /// Failed to read settings file
    FileRead(String),
    /// Failed to parse settings content
    Parse(String),
}

impl std::fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigErrorKind::InvalidColumnSpec { key, reason } => {
                write!(f, "Invalid spec for column '{}': {}", key, reason)
            }
            ConfigErrorKind::EmptyColumnKey(position) => {
                write!(f, "Column at position {} has an empty key", position)
            }
            ConfigErrorKind::DuplicateColumn(identity) => {
                write!(f, "Column '{}' is configured more than once", identity)
            }
            ConfigErrorKind::UnknownMatcher { column, matcher } => write!(
                f,
                "Column '{}' uses matcher '{}' which the record source does not provide",
                column, matcher
            ),
            ConfigErrorKind::InvalidSetting(msg) => write!(f, "Invalid setting: {}", msg),
            ConfigErrorKind::FileRead(msg) => write!(f, "Failed to read settings file: {}", msg),
            ConfigErrorKind::Parse(msg) => write!(f, "Failed to parse settings: {}", msg),
        }
    }
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use datatable_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::DuplicateColumn("Article.title".into()));
/// assert!(format!("{}", err).contains("more than once"));
/// ```
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The specific error condition
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an [`ConfigErrorKind::InvalidColumnSpec`] error.
    #[track_caller]
    pub fn invalid_column(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidColumnSpec {
            key: key.into(),
            reason: reason.into(),
        })
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Configuration Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for ConfigError {}
