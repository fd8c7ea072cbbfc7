//! CLI-specific error types
//!
//! Library errors keep their own `DOCSHIM_*` code; CLI-only failures use
//! the `DOCSHIM_CLI_*` codes below.

use std::fmt;
use std::io;

use crate::error::CompatError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// stdin/stdout failure
    IoError,
    /// Argument was not valid JSON
    InvalidJson,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::IoError => "DOCSHIM_CLI_IO_ERROR",
            Self::InvalidJson => "DOCSHIM_CLI_INVALID_JSON",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub enum CliError {
    Cli {
        code: CliErrorCode,
        message: String,
    },
    Compat(CompatError),
}

impl CliError {
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Cli {
            code: CliErrorCode::IoError,
            message: msg.into(),
        }
    }

    pub fn invalid_json(msg: impl Into<String>) -> Self {
        Self::Cli {
            code: CliErrorCode::InvalidJson,
            message: msg.into(),
        }
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            Self::Cli { code, .. } => code.code(),
            Self::Compat(err) => err.code().as_str(),
        }
    }

    /// Message without the code prefix
    pub fn message(&self) -> String {
        match self {
            Self::Cli { message, .. } => message.clone(),
            Self::Compat(err) => err.to_string(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Compat(err) => Some(err),
            Self::Cli { .. } => None,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_json(format!("JSON error: {}", e))
    }
}

impl From<CompatError> for CliError {
    fn from(e: CompatError) -> Self {
        Self::Compat(e)
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through() {
        let err = CliError::from(CompatError::UnknownCollection("reels".to_string()));
        assert_eq!(err.code_str(), "DOCSHIM_UNKNOWN_COLLECTION");
        assert_eq!(err.message(), "Unknown collection: reels");

        let err: CliError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.code_str(), "DOCSHIM_CLI_INVALID_JSON");
        assert!(err.to_string().starts_with("DOCSHIM_CLI_INVALID_JSON: JSON error"));
    }
}
