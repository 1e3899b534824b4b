//! # Error Types
//!
//! Structured error types for epc_core. Table arithmetic, the calculation
//! engine, the contract store and the document renderer all report through
//! [`EpcError`], so callers can match on a variant or forward the JSON form.
//!
//! ## Example
//!
//! ```rust
//! use epc_core::errors::{EpcError, EpcResult};
//!
//! fn heated_area(raw: &str) -> EpcResult<f64> {
//!     raw.parse().map_err(|_| EpcError::invalid_input("heated_area", raw, "not a number"))
//! }
//!
//! assert!(heated_area("12.5").is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for epc_core operations
pub type EpcResult<T> = Result<T, EpcError>;

/// Structured error type for contract operations.
///
/// The renderer variants keep the `template:`, `pandoc:` and `latex:`
/// prefixes in their messages; existing log parsers match on them.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EpcError {
    /// A row's length disagrees with the table's column count
    #[error("wrong cell count: table has {expected} columns, row has {actual} cells")]
    WrongCellCount { expected: usize, actual: usize },

    /// Arithmetic requested on a column index out of range
    #[error("bad column index {index}: table has {columns} columns")]
    BadColumnIndex { index: usize, columns: usize },

    /// Sum/average requested on a column whose kind disallows it
    #[error("invalid action: cannot {action} a {kind} column")]
    InvalidAction { action: String, kind: String },

    /// A contract references a table that is not in its catalog
    #[error("dependency missing: table '{table}' is not in the catalog")]
    DependencyMissing { table: String },

    /// The calculation pass failed; carries a backtrace for diagnostics
    #[error("calculation failed: {reason}")]
    CalculationFailed { reason: String, backtrace: String },

    /// Template execution failed
    #[error("template: {reason}")]
    TemplateFailure { reason: String },

    /// Markdown converter exited non-zero or could not be started
    #[error("pandoc: {reason}")]
    MarkdownFailure { reason: String },

    /// LaTeX engine exited non-zero, timed out or could not be started
    #[error("latex: {reason}")]
    LatexFailure { reason: String },

    /// The caller cancelled the operation
    #[error("operation cancelled")]
    Cancelled,

    /// An input value is invalid
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// Stored file was written by an incompatible schema version
    #[error("Version mismatch: file is version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EpcError {
    /// Create a WrongCellCount error
    pub fn wrong_cell_count(expected: usize, actual: usize) -> Self {
        EpcError::WrongCellCount { expected, actual }
    }

    /// Create a BadColumnIndex error
    pub fn bad_column_index(index: usize, columns: usize) -> Self {
        EpcError::BadColumnIndex { index, columns }
    }

    /// Create an InvalidAction error
    pub fn invalid_action(action: impl Into<String>, kind: impl Into<String>) -> Self {
        EpcError::InvalidAction {
            action: action.into(),
            kind: kind.into(),
        }
    }

    /// Create a DependencyMissing error
    pub fn dependency_missing(table: impl Into<String>) -> Self {
        EpcError::DependencyMissing {
            table: table.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EpcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EpcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        EpcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    pub fn template(reason: impl Into<String>) -> Self {
        EpcError::TemplateFailure {
            reason: reason.into(),
        }
    }

    pub fn markdown(reason: impl Into<String>) -> Self {
        EpcError::MarkdownFailure {
            reason: reason.into(),
        }
    }

    pub fn latex(reason: impl Into<String>) -> Self {
        EpcError::LatexFailure {
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        EpcError::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EpcError::FileLocked { .. } | EpcError::Cancelled)
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EpcError::WrongCellCount { .. } => "WRONG_CELL_COUNT",
            EpcError::BadColumnIndex { .. } => "BAD_COLUMN_INDEX",
            EpcError::InvalidAction { .. } => "INVALID_ACTION",
            EpcError::DependencyMissing { .. } => "DEPENDENCY_MISSING",
            EpcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            EpcError::TemplateFailure { .. } => "TEMPLATE_FAILURE",
            EpcError::MarkdownFailure { .. } => "MARKDOWN_FAILURE",
            EpcError::LatexFailure { .. } => "LATEX_FAILURE",
            EpcError::Cancelled => "CANCELLED",
            EpcError::InvalidInput { .. } => "INVALID_INPUT",
            EpcError::FileError { .. } => "FILE_ERROR",
            EpcError::FileLocked { .. } => "FILE_LOCKED",
            EpcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            EpcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EpcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for EpcError {
    fn from(err: serde_json::Error) -> Self {
        EpcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = EpcError::wrong_cell_count(3, 2);
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: EpcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EpcError::dependency_missing("summary").error_code(), "DEPENDENCY_MISSING");
        assert_eq!(EpcError::Cancelled.error_code(), "CANCELLED");
    }

    #[test]
    fn test_renderer_prefixes() {
        assert_eq!(EpcError::template("boom").to_string(), "template: boom");
        assert_eq!(EpcError::markdown("exit 2").to_string(), "pandoc: exit 2");
        assert_eq!(EpcError::latex("exit 1").to_string(), "latex: exit 1");
    }
}
