//! Error types and handling for nullinate operations

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::rewrite::RewriteError;

/// Main error type for nullinate operations
#[derive(Debug, Error)]
pub enum NullinateError {
    /// The source file has syntax errors; only the first one is reported
    #[error("Parse error: {message} at {line}:{column} ({count} error(s) in file)")]
    Parse {
        message: String,
        line: usize,
        column: usize,
        count: usize,
    },

    /// A declaration could not be rewritten without corrupting its layout
    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Solution or project file could not be read or understood
    #[error("Project error in '{path}': {message}")]
    Project { path: PathBuf, message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad command-line input, e.g. an unsupported file extension
    #[error("{message}")]
    Usage { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Parse,
    Rewrite,
    Config,
    Project,
    Io,
    Usage,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Rewrite => "rewrite",
            ErrorKind::Config => "config",
            ErrorKind::Project => "project",
            ErrorKind::Io => "io",
            ErrorKind::Usage => "usage",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl NullinateError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            NullinateError::Parse { .. } => ErrorKind::Parse,
            NullinateError::Rewrite(_) => ErrorKind::Rewrite,
            NullinateError::Config { .. } => ErrorKind::Config,
            NullinateError::Project { .. } => ErrorKind::Project,
            NullinateError::Io { .. } => ErrorKind::Io,
            NullinateError::Usage { .. } => ErrorKind::Usage,
            NullinateError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Parse | ErrorKind::Rewrite | ErrorKind::Io
        )
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>, line: usize, column: usize, count: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
            count,
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a project error
    pub fn project_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Project {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a usage error
    pub fn usage_error(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for NullinateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_recoverability() {
        let parse = NullinateError::parse("expected `)`", 3, 14, 2);
        assert_eq!(parse.kind(), ErrorKind::Parse);
        assert!(parse.is_recoverable());
        assert_eq!(
            parse.to_string(),
            "Parse error: expected `)` at 3:14 (2 error(s) in file)"
        );

        let usage = NullinateError::usage_error("unsupported input");
        assert_eq!(usage.kind(), ErrorKind::Usage);
        assert!(!usage.is_recoverable());
        assert!(!NullinateError::config_error("bad").is_recoverable());
    }

    #[test]
    fn test_rewrite_error_is_transparent() {
        let error = NullinateError::from(RewriteError::UnsupportedTrivia {
            declaration: "method `Foo`".to_string(),
            line: 2,
            column: 5,
            reason: "attribute list is not delimited by `[` and `]`".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::Rewrite);
        assert_eq!(error.kind().to_string(), "rewrite");
        assert_eq!(
            error.to_string(),
            "cannot remove marker from method `Foo` at 2:5: attribute list is not delimited by `[` and `]`"
        );
    }
}
