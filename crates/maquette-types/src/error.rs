//! The error taxonomy for tool execution.
//!
//! Every failure the engine can produce falls into one of five kinds, and
//! all of them are recoverable: the agent reads the kind and message out of
//! the invocation result and reissues a corrected command. There is no
//! fatal class: a failure that gave the agent no signal to self-correct
//! would defeat the point of reporting it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of tool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed command shape: unknown tool, unknown command, missing or
    /// mistyped argument. Caught at ingestion, before any engine work.
    Validation,
    /// Missing path, missing match text, or missing history entry.
    NotFound,
    /// The replace target occurs more than once. The engine never guesses
    /// which occurrence was intended.
    AmbiguousMatch,
    /// Undo on a file with no recorded edits.
    EmptyHistory,
    /// Rename target already exists.
    Conflict,
}

impl ErrorKind {
    /// Stable string form, matching the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AmbiguousMatch => "ambiguous_match",
            ErrorKind::EmptyHistory => "empty_history",
            ErrorKind::Conflict => "conflict",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed tool execution: taxonomy kind plus a descriptive message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ToolError {
    /// Which kind of failure this is.
    pub kind: ErrorKind,
    /// Human- and agent-readable description.
    pub message: String,
}

impl ToolError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Malformed command shape.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Missing path, match text, or history entry.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Replace target matched more than once.
    pub fn ambiguous_match(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AmbiguousMatch, message)
    }

    /// Undo with nothing to undo.
    pub fn empty_history(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyHistory, message)
    }

    /// Rename target already exists.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = ToolError::not_found("no such file: /a.jsx");
        assert_eq!(err.to_string(), "not_found: no such file: /a.jsx");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_value(ErrorKind::AmbiguousMatch).unwrap();
        assert_eq!(json, serde_json::json!("ambiguous_match"));
    }

    #[test]
    fn tool_error_round_trips_through_json() {
        let err = ToolError::conflict("target exists: /b.jsx");
        let json = serde_json::to_string(&err).unwrap();
        let back: ToolError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn as_str_matches_serde_form() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::NotFound,
            ErrorKind::AmbiguousMatch,
            ErrorKind::EmptyHistory,
            ErrorKind::Conflict,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::json!(kind.as_str()));
        }
    }
}
