//! Error types for rule registration and file selection

/// Errors while building rules or selectors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// Custom rule payload lacks a required string field
    #[error("rule must have name, pattern, replacement (missing '{0}')")]
    MissingField(&'static str),

    /// Custom rule payload is not a JSON object
    #[error("invalid rule payload: {0}")]
    InvalidPayload(String),

    /// Selector pattern does not compile
    #[error("invalid selector pattern '{pattern}': {message}")]
    InvalidSelectorPattern { pattern: String, message: String },
}
