//! Error types
//!
//! Data-shape problems (unmatched canonical names, missing record fields) are
//! recovered where they happen and never reach this type. Everything here is a
//! structural or contract failure that aborts the parse.

use std::io;

use thiserror::Error;

use crate::reader::Diagnostic;

/// Result alias used across the pipeline layers.
pub type Result<T> = std::result::Result<T, Error>;

/// Unrecoverable pipeline failure.
#[derive(Debug, Error)]
pub enum Error {
    /// The tag event source reported a fatal tokenizer error.
    #[error("malformed input: {0}")]
    Malformed(Diagnostic),

    /// An end event did not match the innermost open element.
    ///
    /// `expected` is `None` when the path stack was already empty.
    #[error("nesting error: expected </{}>, got </{found}>", expected.as_deref().unwrap_or("(none)"))]
    Nesting {
        expected: Option<String>,
        found: String,
    },

    /// Calls made out of order: feed before start, store with no open record, ...
    #[error("usage error: {0}")]
    Usage(String),

    /// A rule table entry is missing a parameter its handler needs.
    #[error("rule {name:?}: {message}")]
    Rule { name: String, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }

    /// Attach the canonical name to a rule error raised without one.
    pub(crate) fn in_rule(self, rule: &str) -> Self {
        match self {
            Error::Rule { name, message } if name.is_empty() => Error::Rule {
                name: rule.to_string(),
                message,
            },
            other => other,
        }
    }

    /// True for failures caused by the input document rather than the caller.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Malformed(_) | Error::Nesting { .. })
    }
}
