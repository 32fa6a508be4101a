//! Bot error types.

use raidwatch_core::{RenderError, TracingError};
use raidwatch_providers::ProviderError;
use raidwatch_server::ServerError;
use thiserror::Error;

/// Result type for bot operations.
pub type BotResult<T> = Result<T, BotError>;

/// Errors that can stop the bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An upstream call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The dashboard could not be rendered.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// The daemon failed to start.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Logging could not be initialized.
    #[error("failed to initialize logging: {0}")]
    Tracing(#[from] TracingError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
