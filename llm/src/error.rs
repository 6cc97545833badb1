//! Error types for completion providers.

use thiserror::Error;

/// Result type alias for completion operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur while talking to a generation service.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Provider not configured (no API key).
    #[error("completion provider not configured")]
    ProviderNotConfigured,

    /// The service answered with a non-success status.
    #[error("API request failed with status {status}: {message}")]
    ApiRequest { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The service answered but carried no usable text.
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error (connect, timeout, body decode).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
