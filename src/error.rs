//! Hearth error types

use thiserror::Error;

/// Hearth error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Memory subsystem error
    #[error("Memory error: {0}")]
    Memory(String),

    /// Model backend error
    #[error("Model error: {0}")]
    Model(String),

    /// Model backend gave up after exhausting its retry budget
    #[error("Model call failed after {attempts} attempts: {last_error}")]
    ModelExhausted {
        /// Total attempts made, including the first
        attempts: u32,
        /// Error from the final attempt
        last_error: String,
    },

    /// Invalid inbound request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

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

/// Result type alias for Hearth operations
pub type Result<T> = std::result::Result<T, Error>;
