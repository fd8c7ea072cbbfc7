//! Error types for the compatibility layer
//!
//! Error codes:
//! - DOCSHIM_INVALID_FIELD
//! - DOCSHIM_INVALID_DOCUMENT
//! - DOCSHIM_UNKNOWN_COLLECTION
//! - DOCSHIM_QUERY_FAILED
//! - DOCSHIM_MISSING_INSERTED_ID
//! - DOCSHIM_CONFIG
//!
//! Compilation is lenient: unknown operators and failed identifier coercion
//! never produce an error. Only unusable input shapes and execution failures do.

use std::fmt;

use thiserror::Error;

/// Result type for compatibility layer operations
pub type CompatResult<T> = Result<T, CompatError>;

/// Stable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidField,
    InvalidDocument,
    UnknownCollection,
    QueryFailed,
    MissingInsertedId,
    Config,
}

impl ErrorCode {
    /// Returns the string code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidField => "DOCSHIM_INVALID_FIELD",
            ErrorCode::InvalidDocument => "DOCSHIM_INVALID_DOCUMENT",
            ErrorCode::UnknownCollection => "DOCSHIM_UNKNOWN_COLLECTION",
            ErrorCode::QueryFailed => "DOCSHIM_QUERY_FAILED",
            ErrorCode::MissingInsertedId => "DOCSHIM_MISSING_INSERTED_ID",
            ErrorCode::Config => "DOCSHIM_CONFIG",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compatibility layer errors
#[derive(Debug, Error)]
pub enum CompatError {
    // ==================
    // Compilation errors
    // ==================
    /// A field translated to something that cannot be used as a column name
    #[error("Invalid field name: {0}")]
    InvalidField(String),

    /// Filter, update or document was not a JSON object
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// No table backs the requested collection
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    // ==================
    // Execution errors
    // ==================
    /// Driver-level failure (connection, type mismatch, constraint violation)
    #[error("Query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// Executor-level failure not originating from the driver
    #[error("Query failed: {0}")]
    Execution(String),

    /// INSERT ... RETURNING id produced no id
    #[error("Insert into {0} returned no id")]
    MissingInsertedId(String),

    // ==================
    // Configuration
    // ==================
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CompatError {
    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidField(field.into())
    }

    /// Create an invalid document error
    pub fn invalid_document(reason: impl Into<String>) -> Self {
        Self::InvalidDocument(reason.into())
    }

    /// Create an execution error
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution(reason.into())
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CompatError::InvalidField(_) => ErrorCode::InvalidField,
            CompatError::InvalidDocument(_) => ErrorCode::InvalidDocument,
            CompatError::UnknownCollection(_) => ErrorCode::UnknownCollection,
            CompatError::Database(_) | CompatError::Execution(_) => ErrorCode::QueryFailed,
            CompatError::MissingInsertedId(_) => ErrorCode::MissingInsertedId,
            CompatError::Config(_) => ErrorCode::Config,
        }
    }

    /// Returns true for errors raised while running a statement
    pub fn is_execution(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::QueryFailed | ErrorCode::MissingInsertedId
        )
    }
}
