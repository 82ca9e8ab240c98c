//! Errors raised while rewriting a single file

use thiserror::Error;

/// A declaration the rewriter refused to edit
///
/// `line` and `column` are 1-based and point at the first token of the
/// declaration or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("cannot remove marker from {declaration} at {line}:{column}: {reason}")]
    UnsupportedTrivia {
        declaration: String,
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("malformed attribute on {declaration} at {line}:{column}: {reason}")]
    MalformedAttribute {
        declaration: String,
        line: usize,
        column: usize,
        reason: String,
    },
}

impl RewriteError {
    pub fn declaration(&self) -> &str {
        match self {
            Self::UnsupportedTrivia { declaration, .. }
            | Self::MalformedAttribute { declaration, .. } => declaration,
        }
    }

    /// `(line, column)`, both 1-based
    pub fn position(&self) -> (usize, usize) {
        match self {
            Self::UnsupportedTrivia { line, column, .. }
            | Self::MalformedAttribute { line, column, .. } => (*line, *column),
        }
    }
}
