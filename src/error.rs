//! Keysentry error types

use thiserror::Error;

/// Keysentry error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis backend error (transport failure, API error, unusable response)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Audit log error
    #[error("Audit log error: {0}")]
    Audit(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for keysentry operations
pub type Result<T> = std::result::Result<T, Error>;
