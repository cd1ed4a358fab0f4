//! Target resolution error types.

/// Kinds of target resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TargetErrorKind {
    /// No column configuration is registered for the resolved target
    #[display("No table configuration registered for target '{}'", _0)]
    MissingConfiguration(String),
    /// The request declared a target that is not configured
    #[display("Request declared unknown target '{}'", _0)]
    UnknownTarget(String),
}

/// Target error with location tracking.
///
/// These map to client errors at the HTTP boundary.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Target Error: {} at line {} in {}", kind, line, file)]
pub struct TargetError {
    /// The kind of error that occurred
    pub kind: TargetErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl TargetError {
    /// Create a new target error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TargetErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
