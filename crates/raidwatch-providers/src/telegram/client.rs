//! Telegram Bot API client.

use raidwatch_core::Dashboard;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::api::{BotUser, PROVIDER_NAME, SentMessage, decode_response};
use super::config::TelegramConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::source::BoxFuture;
use crate::transport::{ChatTransport, MessageId};

/// Name of the multipart field carrying the photo in `editMessageMedia`.
const MEDIA_ATTACHMENT: &str = "dashboard";

/// Telegram Bot API client bound to a single chat.
#[derive(Debug)]
pub struct TelegramClient {
    http_client: Client,
    config: TelegramConfig,
}

impl TelegramClient {
    /// Creates a new client.
    pub fn new(config: TelegramConfig) -> ProviderResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::network(format!("failed to create HTTP client: {}", e))
                    .with_provider(PROVIDER_NAME)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the target chat id.
    pub fn chat_id(&self) -> i64 {
        self.config.chat_id
    }

    /// Returns the bot account behind the token.
    pub async fn get_me(&self) -> ProviderResult<BotUser> {
        let request = self.http_client.get(self.config.method_url("getMe"));
        self.execute(request).await
    }

    async fn send(&self, dashboard: &Dashboard) -> ProviderResult<MessageId> {
        let form = Form::new()
            .text("chat_id", self.config.chat_id.to_string())
            .text("caption", dashboard.caption.clone())
            .text("parse_mode", "HTML")
            .part("photo", photo_part(dashboard)?);

        let request = self
            .http_client
            .post(self.config.method_url("sendPhoto"))
            .multipart(form);
        let message: SentMessage = self.execute(request).await?;
        debug!(message_id = message.message_id, "photo sent");
        Ok(MessageId(message.message_id))
    }

    async fn edit(&self, message_id: MessageId, dashboard: &Dashboard) -> ProviderResult<()> {
        let media = json!({
            "type": "photo",
            "media": format!("attach://{}", MEDIA_ATTACHMENT),
            "caption": dashboard.caption,
            "parse_mode": "HTML",
        });

        let form = Form::new()
            .text("chat_id", self.config.chat_id.to_string())
            .text("message_id", message_id.0.to_string())
            .text("media", media.to_string())
            .part(MEDIA_ATTACHMENT, photo_part(dashboard)?);

        let request = self
            .http_client
            .post(self.config.method_url("editMessageMedia"))
            .multipart(form);
        // The result is the edited Message (or `true` for inline messages).
        let _: serde_json::Value = self.execute(request).await?;
        Ok(())
    }

    async fn pin(&self, message_id: MessageId) -> ProviderResult<()> {
        let body = json!({
            "chat_id": self.config.chat_id,
            "message_id": message_id.0,
            "disable_notification": true,
        });

        let request = self
            .http_client
            .post(self.config.method_url("pinChatMessage"))
            .json(&body);
        let _: serde_json::Value = self.execute(request).await?;
        Ok(())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ProviderResult<T> {
        // reqwest errors embed the request URL, which contains the token.
        let response = request.send().await.map_err(|e| {
            let err = if e.is_timeout() {
                ProviderError::network("request timeout")
            } else if e.is_connect() {
                ProviderError::network("connection failed")
            } else {
                ProviderError::network("request failed")
            };
            err.with_provider(PROVIDER_NAME)
                .with_source(e.without_url())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network("failed to read response")
                .with_provider(PROVIDER_NAME)
                .with_source(e.without_url())
        })?;

        decode_response(status, &body)
    }
}

fn photo_part(dashboard: &Dashboard) -> ProviderResult<Part> {
    Part::bytes(dashboard.image.clone())
        .file_name("dashboard.png")
        .mime_str("image/png")
        .map_err(|e| {
            ProviderError::internal(format!("invalid photo part: {}", e)).with_provider(PROVIDER_NAME)
        })
}

impl ChatTransport for TelegramClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn verify(&self) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(async move {
            let me = self.get_me().await?;
            Ok(match me.username {
                Some(username) => format!("@{}", username),
                None => me.first_name,
            })
        })
    }

    fn send_photo<'a>(&'a self, dashboard: &'a Dashboard) -> BoxFuture<'a, ProviderResult<MessageId>> {
        Box::pin(self.send(dashboard))
    }

    fn edit_photo<'a>(
        &'a self,
        message_id: MessageId,
        dashboard: &'a Dashboard,
    ) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.edit(message_id, dashboard))
    }

    fn pin_message(&self, message_id: MessageId) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(self.pin(message_id))
    }
}
