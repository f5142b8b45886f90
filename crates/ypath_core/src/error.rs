//! Error types shared by the scanner, the selector parser and the resolver

use std::fmt;

/// Kind of failure encountered while scanning, parsing or resolving a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrecognized or unterminated token, or a token not allowed at this position
    InvalidToken,
    /// Bracket content is not a valid index, or the index overflows
    InvalidIndex,
    /// Path ends where a selector is required (after a trailing `.`)
    UnexpectedEnd,
    /// Selector cannot be applied to the shape of the current node
    InvalidNodeType,
    /// Selector is valid but matches nothing
    NodeNotFound,
    /// Parser reached a branch that should be unreachable
    Internal,
}

impl ErrorKind {
    /// Short name of the error kind
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::InvalidToken => "invalid token",
            ErrorKind::InvalidIndex => "invalid index",
            ErrorKind::UnexpectedEnd => "unexpected end of path",
            ErrorKind::InvalidNodeType => "selector cannot match node type",
            ErrorKind::NodeNotFound => "no node matches selector",
            ErrorKind::Internal => "internal error, please report",
        }
    }

    /// True for errors raised from the path text alone, without looking at a tree
    pub fn is_syntax(self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidToken | ErrorKind::InvalidIndex | ErrorKind::UnexpectedEnd
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Error with the byte offset into the original path and the offending text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} {}: {}", message_prefix(.kind), .offset, .snippet)]
pub struct PathError {
    pub kind: ErrorKind,
    pub offset: usize,
    pub snippet: String,
}

fn message_prefix(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidToken => "invalid token at position",
        ErrorKind::InvalidIndex => "index expected at position",
        ErrorKind::UnexpectedEnd => "unexpected end of path at position",
        ErrorKind::InvalidNodeType => "node type mismatch at path position",
        ErrorKind::NodeNotFound => "node not found at path position",
        ErrorKind::Internal => "internal error at position",
    }
}

impl PathError {
    pub fn new(kind: ErrorKind, offset: usize, snippet: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            snippet: snippet.into(),
        }
    }
}

/// A path that could not be resolved completely
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct ResolveError<'p> {
    pub error: PathError,
    /// Unresolved part of the path, starting at the selector that failed
    pub remaining: &'p str,
}

impl ResolveError<'_> {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind
    }

    /// Drops the borrowed remainder
    pub fn into_path_error(self) -> PathError {
        self.error
    }
}
