//! Error handling module for the Markdown front end.
//!
//! Lexing has no error states and malformed Markdown never produces an error
//! while parsing. The two variants here cover what is left: a parser
//! consistency check that only fires on a parser defect, and rejected
//! structural edits on a [`Document`](crate::ast::Document).
use crate::lexer::Position;
use thiserror::Error;

/// Main error type for the Markdown front end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkdownError {
    /// The parser's cursor did not sit on the token kind its dispatch promised.
    #[error("Internal parser error at line {}, column {}: {message}", position.line, position.column)]
    Internal { position: Position, message: String },

    /// A structural edit was rejected and the tree was left untouched.
    #[error("Transform error: {message}")]
    Transform { message: String },
}

/// Convenience type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, MarkdownError>;

impl MarkdownError {
    /// Creates a new internal consistency error with position information.
    pub fn internal_error(position: Position, message: impl Into<String>) -> Self {
        MarkdownError::Internal {
            position,
            message: message.into(),
        }
    }

    /// Creates a new transform error.
    pub fn transform_error(message: impl Into<String>) -> Self {
        MarkdownError::Transform {
            message: message.into(),
        }
    }

    /// Returns the position associated with this error, if any.
    pub fn position(&self) -> Option<Position> {
        match self {
            MarkdownError::Internal { position, .. } => Some(*position),
            MarkdownError::Transform { .. } => None,
        }
    }

    /// Returns true if the caller can keep using the data it was working on.
    ///
    /// A rejected edit leaves the tree unchanged. An internal error means the
    /// parser itself is broken and its output cannot be trusted.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MarkdownError::Internal { .. } => false,
            MarkdownError::Transform { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let position = Position {
            line: 1,
            column: 5,
            offset: 4,
        };
        let error = MarkdownError::Internal {
            position,
            message: "expected heading_mark, found text".to_string(),
        };

        let error_str = format!("{}", error);
        assert!(error_str.contains("line 1"));
        assert!(error_str.contains("column 5"));
        assert!(error_str.contains("expected heading_mark"));
    }

    #[test]
    fn test_error_constructors() {
        let position = Position {
            line: 2,
            column: 10,
            offset: 15,
        };

        let internal = MarkdownError::internal_error(position, "cursor mismatch");
        assert_eq!(internal.position(), Some(position));
        assert!(!internal.is_recoverable());

        let transform = MarkdownError::transform_error("cannot move the document root");
        assert_eq!(transform.position(), None);
        assert!(transform.is_recoverable());
        assert_eq!(
            transform.to_string(),
            "Transform error: cannot move the document root"
        );
    }
}
