//! The rendered dashboard and the renderer seam.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::Classification;

/// A rendered dashboard ready to be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    /// PNG-encoded image.
    pub image: Vec<u8>,
    /// HTML caption.
    pub caption: String,
}

impl Dashboard {
    /// Creates a new dashboard.
    pub fn new(image: Vec<u8>, caption: impl Into<String>) -> Self {
        Self {
            image,
            caption: caption.into(),
        }
    }
}

/// Errors that can occur while rendering a dashboard.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Image encoding failed.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// Drawing failed.
    #[error("failed to draw dashboard: {0}")]
    Draw(String),
}

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Turns classified events into a publishable dashboard.
pub trait DashboardRenderer: Send + Sync {
    /// Renders `classification` as seen at `now`.
    fn render(&self, classification: &Classification, now: DateTime<Utc>)
    -> RenderResult<Dashboard>;
}
