//! Error types for mixed-backend generation.

use thiserror::Error;

/// Failures reported by a token source (the backend transport).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Malformed response: {0}")]
    Protocol(String),

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

/// Errors surfaced to callers of the generator and the CLI.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Generation failed at position {position} (backend {backend}): {source}")]
    GenerationFailed {
        position: usize,
        backend: String,
        #[source]
        source: ProviderError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Input error: {0}")]
    InputError(String),
}

impl From<config::ConfigError> for GenerationError {
    fn from(err: config::ConfigError) -> Self {
        GenerationError::ConfigError(err.to_string())
    }
}
