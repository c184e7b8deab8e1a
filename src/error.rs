//! Error types for trialscope.

use thiserror::Error;

/// Result type for trialscope operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for trialscope operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Tagger initialization failed.
    #[error("Tagger initialization failed: {0}")]
    TaggerInit(String),

    /// A tagger was loaded but reports no entity-recognition capability.
    ///
    /// Fatal for the whole aggregation run: callers must discard any
    /// previously held mention table rather than display stale results.
    #[error("Tagger '{0}' has no entity-recognition capability")]
    MissingNer(String),

    /// Tagging a document failed.
    #[error("Tagging failed: {0}")]
    Tagging(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An aggregation run was cancelled between documents.
    ///
    /// No partial mention table is surfaced for a cancelled run.
    #[error("Aggregation cancelled")]
    Cancelled,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a tagger initialization error.
    pub fn tagger_init(msg: impl Into<String>) -> Self {
        Error::TaggerInit(msg.into())
    }

    /// Create a missing-NER-capability error.
    pub fn missing_ner(tagger: impl Into<String>) -> Self {
        Error::MissingNer(tagger.into())
    }

    /// Create a tagging error.
    pub fn tagging(msg: impl Into<String>) -> Self {
        Error::Tagging(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
