//! Error types for MemVault

use thiserror::Error;

/// Result type alias using MemVault's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for MemVault
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required request field is absent or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Embedding provider error
    #[error("Embedding provider error: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    Index(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if error is a client error (caller's fault, maps to 400)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MissingField(_))
    }
}
