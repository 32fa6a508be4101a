//! Telegram Bot API transport.
//!
//! [`TelegramClient`] implements [`ChatTransport`](crate::transport::ChatTransport)
//! on top of three Bot API methods:
//!
//! - `sendPhoto` (multipart upload of the PNG with an HTML caption)
//! - `editMessageMedia` (multipart, the photo is referenced as `attach://dashboard`)
//! - `pinChatMessage` (silent pin)
//!
//! plus `getMe` for validating the token at startup.
//!
//! Every Bot API response is an envelope `{ok, result | error_code, description, parameters}`.
//! Failed envelopes are mapped onto [`ProviderErrorCode`](crate::error::ProviderErrorCode)
//! by [`classify_api_error`], so callers never look at description strings.
//!
//! # Example
//!
//! ```ignore
//! use raidwatch_providers::telegram::{TelegramClient, TelegramConfig};
//!
//! let config = TelegramConfig::new(token, chat_id)?;
//! let client = TelegramClient::new(config)?;
//! let me = client.get_me().await?;
//! let id = client.send_photo(&dashboard).await?;
//! ```

mod api;
mod client;
mod config;

pub use api::{BotUser, classify_api_error};
pub use client::TelegramClient;
pub use config::TelegramConfig;
