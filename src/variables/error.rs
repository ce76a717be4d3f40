//! Errors surfaced by template substitution.

use thiserror::Error;

use crate::environment::EnvError;
use crate::history::HistoryError;

/// Errors that abort an `untemplate` call.
///
/// Candidate-level misses never appear here: they only move evaluation on to
/// the next candidate.
#[derive(Debug, Error)]
pub enum VarError {
    /// `{{` with no `}}` after it
    #[error("Unclosed braces: '{0}'")]
    UnclosedBraces(String),

    /// Nested braces, an embedded `@`, or an empty default
    #[error("Malformed placeholder {placeholder}: {reason}")]
    MalformedPlaceholder { placeholder: String, reason: String },

    /// No candidate resolved and no default was given, or a shortcut failed
    #[error("Failed to substitute for {placeholder}: {reason}")]
    SubstitutionFailed { placeholder: String, reason: String },

    #[error("No key found after @")]
    EmptyShortcut,

    #[error("Invalid char '{0}' found immediately after @")]
    InvalidShortcutChar(char),

    /// A `--with` argument that is not `key=value`
    #[error("Bad with argument {0}")]
    InvalidWith(String),

    /// An environment name matched several files
    #[error(transparent)]
    Environment(#[from] EnvError),

    /// A recorded exchange name matched several files
    #[error(transparent)]
    Exchange(#[from] HistoryError),
}

impl VarError {
    pub(crate) fn malformed(placeholder: &str, reason: impl Into<String>) -> Self {
        VarError::MalformedPlaceholder {
            placeholder: placeholder.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn failed(placeholder: &str, reason: impl Into<String>) -> Self {
        VarError::SubstitutionFailed {
            placeholder: placeholder.to_string(),
            reason: reason.into(),
        }
    }
}
