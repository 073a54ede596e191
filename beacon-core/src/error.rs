//! Error types for beacon-core

use thiserror::Error;

/// Main error type for the beacon-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Event or configuration value failed validation
    #[error("validation error: {0}")]
    Validation(String),

    /// Classified transport failure (HTTP status, network, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// Delivery gave up after retries with offline fallback disabled
    #[error("delivery failed after {attempts} attempts: {message}")]
    Delivery { attempts: usize, message: String },

    /// Durable store operation failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Repository was disposed; no further dispatch is possible
    #[error("repository has been disposed")]
    Disposed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

/// Result type alias for beacon-core
pub type Result<T> = std::result::Result<T, Error>;
