//! Error types for tsqlgen

use thiserror::Error;

/// Result type alias for descriptor construction and statement synthesis
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while configuring descriptors or synthesizing statements.
///
/// Every failure in this crate is a configuration-time programmer error: it
/// is raised synchronously, never retried, and no partial SQL text is ever
/// returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A caller passed something unusable: an invalid identifier, an unknown
    /// or ineligible column, or a statement request with nothing to do
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The descriptor graph cannot support the requested statement, e.g. a
    /// key-dependent operation on a table with no key columns
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl BuildError {
    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Create an invalid-operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Check if this is an argument error
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_))
    }

    /// Check if this is an invalid-operation error
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation(_))
    }
}
