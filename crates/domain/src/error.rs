//! Unified error types for the domain layer
//!
//! Provides a common error type for value objects, form path handling and
//! patch construction, so the engine never has to fall back to strings.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., blank entity name)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects and enums parsed from control names)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Two form paths disagree on whether a segment is an object or a leaf
    #[error("Path conflict at '{path}': {message}")]
    PathConflict { path: String, message: String },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if name.trim().is_empty() {
    ///     return Err(DomainError::validation("Entity name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a path conflict error
    pub fn path_conflict(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PathConflict {
            path: path.into(),
            message: message.into(),
        }
    }
}
