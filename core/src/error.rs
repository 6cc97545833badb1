//! Error types for the document and question pipelines.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in the core pipelines.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Neither extraction strategy produced text.
    #[error("failed to extract text from document: {0}")]
    Extraction(String),

    /// The caller supplied no usable input.
    #[error("{0}")]
    Input(String),

    /// The generation service returned text without the expected structure.
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),

    /// Glossary data could not be parsed.
    #[error("invalid glossary: {0}")]
    Glossary(#[from] serde_json::Error),

    /// A matching pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex_lite::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
