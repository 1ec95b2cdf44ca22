//! Error types for baynet inference.

use thiserror::Error;

impl From<baynet_frontend::FrontendError> for ExecError {
    fn from(err: baynet_frontend::FrontendError) -> Self {
        match err {
            baynet_frontend::FrontendError::ParseError(msg) => ExecError::ParseError(msg),
            baynet_frontend::FrontendError::ValidationError(msg) => {
                ExecError::ValidationError(msg)
            }
            _ => ExecError::Internal(format!("unexpected frontend error: {:?}", err)),
        }
    }
}

/// Errors that can occur while loading a network or answering a query.
///
/// Malformed query text is not an error: it degrades to a format string in
/// the answer. The variants here are structural failures that would otherwise
/// produce silently wrong numbers.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ExecError {
    /// Syntax error in a network document.
    #[error("parse error: {0}")]
    ParseError(String),

    /// Semantic error in a network document or configuration.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The parent/child graph contains a cycle.
    #[error("network contains a cycle through '{0}'")]
    CyclicNetwork(String),

    /// A variable name (or id) that is not part of the network or factor.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// A value that is not in the variable's outcome domain.
    #[error("unknown outcome '{value}' for variable '{variable}'")]
    UnknownOutcome { variable: String, value: String },

    /// Numerical failure such as normalizing an empty or zero-mass factor.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// I/O failure while reading a network or batch input.
    #[error("io error: {0}")]
    Io(String),

    /// Internal inconsistency (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ExecError {
    fn from(err: std::io::Error) -> Self {
        ExecError::Io(err.to_string())
    }
}
