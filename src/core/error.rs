//! Error types for the logger system

use super::level::ParseLevelError;
use super::output::ParseOutputError;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// A single rule broken by a [`Config`](super::config::Config)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigViolation {
    #[error("service name is required")]
    MissingService,

    #[error("environment is required")]
    MissingEnv,

    #[error("environment must be one of: dev, development, staging, prod, production (got: {0})")]
    InvalidEnv(String),

    #[error("log level is required")]
    MissingLevel,

    #[error(transparent)]
    InvalidLevel(#[from] ParseLevelError),

    #[error("output type is required")]
    MissingOutput,

    #[error(transparent)]
    InvalidOutput(#[from] ParseOutputError),

    #[error("file path is required when output is file")]
    MissingFilePath,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Every violated configuration rule, reported together
    #[error("invalid config: {}", join_violations(.violations))]
    InvalidConfig { violations: Vec<ConfigViolation> },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// File rotation error
    #[error("File rotation failed for '{path}': {message}")]
    FileRotationError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ParseLevelError> for LoggerError {
    fn from(err: ParseLevelError) -> Self {
        LoggerError::InvalidConfig {
            violations: vec![ConfigViolation::InvalidLevel(err)],
        }
    }
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file rotation error
    pub fn file_rotation(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileRotationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// The configuration rules this error reports, empty for non-config errors
    #[must_use]
    pub fn violations(&self) -> &[ConfigViolation] {
        match self {
            LoggerError::InvalidConfig { violations } => violations,
            _ => &[],
        }
    }
}
