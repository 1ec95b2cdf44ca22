//! Error types for parsing and validation.

use thiserror::Error;

/// Errors that can occur while reading a network document.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FrontendError {
    /// Syntax error during parsing.
    ///
    /// Carries the Pest error text, including line/column information.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Semantic validation error (unknown parent, wrong table size, ...).
    #[error("validation error: {0}")]
    ValidationError(String),
}

impl FrontendError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}
