//! Server error types.

use std::io;

use raidwatch_providers::ProviderError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (signal handler installation, etc.).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// An upstream failed in a way that prevents starting.
    #[error("upstream error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
