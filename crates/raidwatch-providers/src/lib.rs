//! Upstream integrations: where events come from and where dashboards go.
//!
//! - [`EventSource`] - Anything that yields the event schedule
//! - [`EventsApiClient`] - HTTP implementation against the events-schedule API
//! - [`ChatTransport`] - Publishes and edits the dashboard message
//! - [`telegram::TelegramClient`] - Telegram Bot API implementation
//! - [`ProviderError`] - Typed errors shared by both sides
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                      ┌─────────────────┐
//! │  Events API     │                      │  Telegram API   │
//! └────────┬────────┘                      └────────▲────────┘
//!          │                                        │
//!          ▼                                        │
//! ┌─────────────────┐                      ┌────────┴────────┐
//! │ EventsApiClient │                      │ TelegramClient  │
//! └────────┬────────┘                      └────────▲────────┘
//!          │ EventSource              ChatTransport │
//!          ▼                                        │
//!   Vec<Event> ──► classify ──► render ──► Dashboard
//! ```

pub mod error;
pub mod events_api;
pub mod source;
pub mod telegram;
pub mod transport;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use events_api::{EventsApiClient, EventsApiConfig, parse_schedule};
pub use source::{BoxFuture, EventSource};
pub use telegram::{TelegramClient, TelegramConfig};
pub use transport::{ChatTransport, MessageId};
