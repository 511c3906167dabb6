//! Error types shared by the stores, the dispatcher, and the binary.

use crate::types::TaskId;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for programmatic error handling and structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation errors
    MissingArgument,
    InvalidTaskId,

    // Not found errors
    TaskNotFound,

    // Storage errors
    IoError,
    DatabaseError,
    MigrationError,
    MalformedData,

    ConfigError,
}

/// Errors surfaced by task operations.
#[derive(Debug, Error)]
pub enum TdError {
    /// A required positional argument was not supplied.
    #[error("{command}: missing {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    /// A task id argument did not parse as a positive integer.
    #[error("{command}: invalid 'taskId': {reason}")]
    InvalidId {
        command: &'static str,
        reason: String,
    },

    #[error("No task found with given id.")]
    NotFound(TaskId),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),

    /// Persisted JSON could not be decoded (or encoded).
    #[error("malformed task file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No id remains after the largest one in use.
    #[error("cannot assign a task id after {0}")]
    IdOverflow(TaskId),

    #[error("config error: {0}")]
    Config(String),
}

impl TdError {
    pub fn missing(command: &'static str, what: &'static str) -> Self {
        Self::MissingArgument { command, what }
    }

    pub fn invalid_id(command: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidId {
            command,
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Malformed {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingArgument { .. } => ErrorCode::MissingArgument,
            Self::InvalidId { .. } => ErrorCode::InvalidTaskId,
            Self::NotFound(_) => ErrorCode::TaskNotFound,
            Self::Io { .. } => ErrorCode::IoError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Migration(_) => ErrorCode::MigrationError,
            Self::Malformed { .. } | Self::IdOverflow(_) => ErrorCode::MalformedData,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Argument problems, as opposed to storage or config failures.
    pub fn is_usage(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::MissingArgument | ErrorCode::InvalidTaskId
        )
    }
}

/// Result type for task operations.
pub type TdResult<T> = std::result::Result<T, TdError>;
