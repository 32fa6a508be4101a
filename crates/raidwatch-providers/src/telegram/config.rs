//! Telegram transport configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

/// Configuration for the Telegram transport.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot API base URL (without the `/bot<token>` suffix).
    pub api_base: Url,

    /// Bot token issued by BotFather.
    pub token: String,

    /// Target chat.
    pub chat_id: i64,

    /// Request timeout.
    pub timeout: Duration,
}

impl TelegramConfig {
    /// Default Bot API base URL.
    pub const DEFAULT_API_BASE: &'static str = "https://api.telegram.org";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration against the public Bot API.
    pub fn new(token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            api_base: Url::parse(Self::DEFAULT_API_BASE).expect("default API base is a valid URL"),
            token: token.into(),
            chat_id,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the Bot API base URL (e.g. a local Bot API server).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_api_base(mut self, api_base: impl AsRef<str>) -> Result<Self, url::ParseError> {
        self.api_base = Url::parse(api_base.as_ref())?;
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the endpoint URL for a Bot API method.
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.as_str().trim_end_matches('/'),
            self.token,
            method
        )
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base.as_str())
            .field("token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TelegramConfig::new("123:abc", -100);
        assert_eq!(config.api_base.as_str(), "https://api.telegram.org/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.chat_id, -100);
    }

    #[test]
    fn method_url() {
        let config = TelegramConfig::new("123:abc", 1);
        assert_eq!(
            config.method_url("sendPhoto"),
            "https://api.telegram.org/bot123:abc/sendPhoto"
        );

        let local = TelegramConfig::new("123:abc", 1)
            .with_api_base("http://localhost:8081/")
            .unwrap();
        assert_eq!(local.method_url("getMe"), "http://localhost:8081/bot123:abc/getMe");
    }

    #[test]
    fn debug_redacts_token() {
        let config = TelegramConfig::new("123:secret", 1);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn invalid_api_base() {
        assert!(TelegramConfig::new("t", 1).with_api_base("not a url").is_err());
    }
}
