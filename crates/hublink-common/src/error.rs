//! Unified error types for the hublink workspace.
//!
//! Every fallible operation in the workspace returns [`HublinkError`].
//! Request-level callers usually only care about the coarse
//! [`ErrorKind`] a failure maps to.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum HublinkError {
    /// A required resource or request field was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The apply engine rejected a removal script.
    #[error("stop failed: {message}")]
    StopError {
        /// Description of the rejected removal.
        message: String,
    },

    /// The apply engine rejected a model update.
    #[error("model update failed: {message}")]
    ModelUpdateFailed {
        /// Description of the rejected update.
        message: String,
    },

    /// A binding specification entry could not be parsed.
    #[error("invalid binding \"{entry}\": {reason}")]
    InvalidBinding {
        /// The offending binding entry.
        entry: String,
        /// Why the entry was rejected.
        reason: String,
    },

    /// A script line could not be parsed or breaks dependency order.
    #[error("invalid script at line {line}: {message}")]
    InvalidScript {
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// The apply engine dropped its completion callback without firing it.
    #[error("apply engine abandoned {operation} without reporting an outcome")]
    ApplyAbandoned {
        /// Operation whose script was abandoned.
        operation: &'static str,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Coarse classification of a [`HublinkError`] as reported to requesters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing identifying fields or resources.
    NotFound,
    /// A removal script was rejected.
    StopError,
    /// Any other apply rejection.
    ModelUpdateFailed,
    /// The request itself is malformed.
    InvalidRequest,
    /// Local failure unrelated to the request contents.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::StopError => write!(f, "STOP_ERROR"),
            Self::ModelUpdateFailed => write!(f, "MODEL_UPDATE_FAILED"),
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

impl HublinkError {
    /// Returns the request-level kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StopError { .. } => ErrorKind::StopError,
            Self::ModelUpdateFailed { .. } | Self::ApplyAbandoned { .. } => {
                ErrorKind::ModelUpdateFailed
            }
            Self::InvalidBinding { .. } | Self::InvalidScript { .. } => ErrorKind::InvalidRequest,
            Self::Config { .. } | Self::Io { .. } | Self::Serialization { .. } => {
                ErrorKind::Internal
            }
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, HublinkError>;
