//! Error classification shared by every layer that reports failures to callers.

use serde::Serialize;

/// User-facing error taxonomy. Serialized into the `errorKind` response field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input; no upstream call was made.
    Validation,
    /// Network failure or non-2xx status from an upstream dependency.
    Transport,
    /// Upstream answered but the payload lacked what we needed.
    Upstream,
    /// Poll budget exhausted without a terminal result.
    Timeout,
    /// Nothing matched the query, locally or in the registry.
    NotFound,
    /// Last-resort catch.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Transport => "transport",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by crate error types so callers can classify without matching.
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}
