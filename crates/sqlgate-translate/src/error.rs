//! Error types for translation backends.

use thiserror::Error;

/// Errors raised by [`crate::Translator`] implementations.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The request never produced a response.
    #[error("request to {backend} failed: {source}")]
    Request {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a failure status.
    #[error("{backend} returned HTTP {status}: {body}")]
    Backend {
        backend: &'static str,
        status: u16,
        body: String,
    },

    /// The backend answered 2xx but the body had no usable text.
    #[error("unexpected response from {backend}: {reason}")]
    MalformedResponse {
        backend: &'static str,
        reason: String,
    },

    /// No SQL could be extracted from the reply.
    #[error("the model returned no SQL")]
    EmptyResponse,

    /// A training example was rejected before being stored.
    #[error("invalid training example: {0}")]
    InvalidExample(String),
}
