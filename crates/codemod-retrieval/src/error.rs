//! Error types for the retrieval layer

/// Errors raised by retrieval collaborators
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Guidance query failed
    #[error("guidance query failed: {0}")]
    Query(String),

    /// Page could not be fetched
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Vector store rejected a batch
    #[error("upsert failed: {0}")]
    Upsert(String),

    /// Guidance payload is not valid JSON
    #[error("invalid guidance payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl RetrievalError {
    /// Fetch error for a URL
    #[must_use]
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Result type for retrieval operations
pub type Result<T> = std::result::Result<T, RetrievalError>;
