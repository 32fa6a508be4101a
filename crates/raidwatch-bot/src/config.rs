//! Bot configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/raidwatch/config.toml` by default. Every section is optional;
//! missing keys take their defaults. Command-line flags (and their
//! environment variables) override the file.
//!
//! `telegram.bot_token` supports secret references:
//! - `pass::path/in/store` resolved via `pass show`
//! - `env::VAR_NAME` resolved from the environment
//! - plain text used as-is

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use raidwatch_core::{CaptionFormatter, CaptionOptions, DisplayCatalog};
use raidwatch_providers::{EventsApiConfig, TelegramConfig};
use raidwatch_server::{ControllerConfig, SchedulerConfig};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cli::Cli;
use crate::error::{BotError, BotResult};

// ---------------------------------------------------------------------------
// BotConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the raidwatch bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Telegram settings.
    pub telegram: TelegramSettings,

    /// Events API settings.
    pub events: EventsSettings,

    /// Update loop settings.
    pub updates: UpdateSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Telegram settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    /// Bot token (supports `pass::` and `env::` prefixes).
    pub bot_token: Option<String>,

    /// Chat the dashboard is posted to.
    pub chat_id: Option<i64>,

    /// Bot API base URL.
    pub api_base: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: TelegramConfig::DEFAULT_API_BASE.to_string(),
            timeout_secs: TelegramConfig::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Events API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsSettings {
    /// Schedule endpoint.
    pub api_url: String,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// How long a fetched schedule is reused, in minutes.
    pub cache_ttl_minutes: u64,
}

impl Default for EventsSettings {
    fn default() -> Self {
        Self {
            api_url: EventsApiConfig::DEFAULT_URL.to_string(),
            user_agent: EventsApiConfig::DEFAULT_USER_AGENT.to_string(),
            timeout_secs: EventsApiConfig::DEFAULT_TIMEOUT_SECS,
            cache_ttl_minutes: 2,
        }
    }
}

/// Update loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateSettings {
    /// Seconds between dashboard updates.
    pub interval_secs: u64,

    /// Log a status line every N successful updates (0 disables it).
    pub status_log_every: u64,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            status_log_every: ControllerConfig::default().status_log_every,
        }
    }
}

/// Display settings.
///
/// The tables are merged over the built-in catalog, so only additions and
/// changes need to be listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Footer clock offset in whole hours east of UTC.
    pub utc_offset_hours: i32,

    /// Label printed after the footer clock.
    pub clock_label: String,

    /// Event display names keyed by raw identifier.
    pub event_names: BTreeMap<String, String>,

    /// Event icons keyed by raw identifier.
    pub event_icons: BTreeMap<String, String>,

    /// Map display names keyed by raw identifier.
    pub map_names: BTreeMap<String, String>,

    /// Map accent colours (`#rrggbb`) keyed by raw identifier.
    pub map_colors: BTreeMap<String, String>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: 3,
            clock_label: "МСК".to_string(),
            event_names: BTreeMap::new(),
            event_icons: BTreeMap::new(),
            map_names: BTreeMap::new(),
            map_colors: BTreeMap::new(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from the default path, or defaults if it does
    /// not exist.
    pub fn load() -> BotResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> BotResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BotError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            BotError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("raidwatch")
    }

    /// Applies command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref token) = cli.bot_token {
            self.telegram.bot_token = Some(token.clone());
        }
        if let Some(chat_id) = cli.chat_id {
            self.telegram.chat_id = Some(chat_id);
        }
        if let Some(ref url) = cli.api_url {
            self.events.api_url = url.clone();
        }
        if let Some(interval) = cli.update_interval {
            self.updates.interval_secs = interval;
        }
        if let Some(ttl) = cli.cache_ttl {
            self.events.cache_ttl_minutes = ttl;
        }
    }

    /// Checks the configuration.
    ///
    /// With `require_telegram`, the bot token and chat id must be present
    /// and the token reference must resolve.
    pub fn validate(&self, require_telegram: bool) -> BotResult<()> {
        Url::parse(&self.events.api_url)
            .map_err(|e| BotError::config(format!("events.api_url: {}", e)))?;
        Url::parse(&self.telegram.api_base)
            .map_err(|e| BotError::config(format!("telegram.api_base: {}", e)))?;

        for (key, value) in [
            ("updates.interval_secs", self.updates.interval_secs),
            ("events.cache_ttl_minutes", self.events.cache_ttl_minutes),
            ("events.timeout_secs", self.events.timeout_secs),
            ("telegram.timeout_secs", self.telegram.timeout_secs),
        ] {
            if value == 0 {
                return Err(BotError::config(format!("{} must be greater than zero", key)));
            }
        }

        if !(-23..=23).contains(&self.display.utc_offset_hours) {
            return Err(BotError::config(format!(
                "display.utc_offset_hours must be within -23..=23, got {}",
                self.display.utc_offset_hours
            )));
        }

        self.catalog()
            .validate()
            .map_err(|e| BotError::config(format!("display.{}", e)))?;

        if require_telegram {
            self.resolve_token()?;
            self.chat_id()?;
        }
        Ok(())
    }

    /// Resolves the bot token, expanding secret references.
    pub fn resolve_token(&self) -> BotResult<String> {
        let raw = self.telegram.bot_token.as_deref().ok_or_else(|| {
            BotError::config(format!(
                "bot token not set. Pass --bot-token, set BOT_TOKEN, or add to {}:\n  \
                 [telegram]\n  \
                 bot_token = \"env::BOT_TOKEN\"",
                Self::default_path().display()
            ))
        })?;
        crate::secret::resolve(raw)
            .map_err(|e| BotError::config(format!("failed to resolve bot token: {}", e)))
    }

    fn chat_id(&self) -> BotResult<i64> {
        self.telegram.chat_id.ok_or_else(|| {
            BotError::config("chat id not set. Pass --chat-id, set CHAT_ID, or set telegram.chat_id")
        })
    }

    /// Returns the built-in catalog with the configured tables applied.
    pub fn catalog(&self) -> DisplayCatalog {
        let overrides = DisplayCatalog {
            event_names: self.display.event_names.clone(),
            event_icons: self.display.event_icons.clone(),
            map_names: self.display.map_names.clone(),
            map_colors: self.display.map_colors.clone(),
        };
        DisplayCatalog::default().merged(&overrides)
    }

    /// Builds the caption formatter.
    pub fn caption_formatter(&self) -> CaptionFormatter {
        let options = CaptionOptions::default()
            .with_utc_offset_hours(self.display.utc_offset_hours)
            .with_clock_label(&self.display.clock_label);
        CaptionFormatter::new(self.catalog(), options)
    }

    /// Builds the events API client configuration.
    pub fn events_api_config(&self) -> BotResult<EventsApiConfig> {
        let config = EventsApiConfig::new(&self.events.api_url)
            .map_err(|e| BotError::config(format!("events.api_url: {}", e)))?;
        Ok(config
            .with_timeout(Duration::from_secs(self.events.timeout_secs))
            .with_user_agent(&self.events.user_agent))
    }

    /// Builds the Telegram client configuration. Resolves the token.
    pub fn telegram_config(&self) -> BotResult<TelegramConfig> {
        TelegramConfig::new(self.resolve_token()?, self.chat_id()?)
            .with_api_base(&self.telegram.api_base)
            .map(|config| config.with_timeout(Duration::from_secs(self.telegram.timeout_secs)))
            .map_err(|e| BotError::config(format!("telegram.api_base: {}", e)))
    }

    /// Returns the event cache TTL.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.events.cache_ttl_minutes.saturating_mul(60))
    }

    /// Returns the scheduler configuration.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(Duration::from_secs(self.updates.interval_secs))
    }

    /// Returns the controller configuration.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            status_log_every: self.updates.status_log_every,
        }
    }

    /// Returns a copy safe to print: an inline bot token is replaced.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.telegram.bot_token = config
            .telegram
            .bot_token
            .as_deref()
            .map(crate::secret::redact);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use raidwatch_core::Rgb;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn telegram_ready() -> BotConfig {
        let mut config = BotConfig::default();
        config.telegram.bot_token = Some("123456:ABC".to_string());
        config.telegram.chat_id = Some(-100123);
        config
    }

    #[test]
    fn empty_file_gives_defaults() {
        let file = write_config("");
        let config = BotConfig::load_from(file.path()).unwrap();
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(120));
        assert_eq!(config.scheduler_config().interval, Duration::from_secs(5));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let file = write_config(
            r##"
[telegram]
bot_token = "env::BOT_TOKEN"
chat_id = -1001234567890

[updates]
interval_secs = 10

[display]
clock_label = "UTC"
utc_offset_hours = 0

[display.map_colors]
Dam = "#112233"
"##,
        );
        let config = BotConfig::load_from(file.path()).unwrap();

        assert_eq!(config.telegram.chat_id, Some(-1001234567890));
        assert_eq!(config.telegram.timeout_secs, 30);
        assert_eq!(config.updates.interval_secs, 10);
        assert_eq!(config.updates.status_log_every, 12);
        assert_eq!(config.events.api_url, EventsApiConfig::DEFAULT_URL);

        let catalog = config.catalog();
        assert_eq!(catalog.map_color("Dam"), Rgb(0x11, 0x22, 0x33));
        // Untouched entries come from the built-in catalog.
        assert_eq!(catalog.map_name("Spaceport"), "Космопорт");
    }

    #[test]
    fn malformed_file_errors() {
        let file = write_config("[updates]\ninterval_secs = \"soon\"\n");
        let err = BotConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn cli_overrides_file() {
        let cli = Cli::try_parse_from([
            "raidwatch",
            "--bot-token",
            "999:override",
            "--chat-id",
            "42",
            "--api-url",
            "http://localhost:8080/events",
            "--update-interval",
            "7",
            "--cache-ttl",
            "5",
        ])
        .unwrap();

        let mut config = telegram_ready();
        config.apply_cli(&cli);

        assert_eq!(config.telegram.bot_token.as_deref(), Some("999:override"));
        assert_eq!(config.telegram.chat_id, Some(42));
        assert_eq!(config.events.api_url, "http://localhost:8080/events");
        assert_eq!(config.updates.interval_secs, 7);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn huge_cache_ttl_saturates() {
        let mut config = BotConfig::default();
        config.events.cache_ttl_minutes = u64::MAX;
        assert_eq!(config.cache_ttl(), Duration::from_secs(u64::MAX));

        config.events.cache_ttl_minutes = u64::MAX / 60 + 1;
        assert_eq!(config.cache_ttl(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn validate_requires_telegram_only_when_asked() {
        let config = BotConfig::default();
        config.validate(false).unwrap();

        let err = config.validate(true).unwrap_err();
        assert!(err.to_string().contains("bot token not set"));

        let mut config = telegram_ready();
        config.telegram.chat_id = None;
        assert!(config.validate(true).unwrap_err().to_string().contains("chat id"));

        telegram_ready().validate(true).unwrap();
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = telegram_ready();
        config.updates.interval_secs = 0;
        assert!(config.validate(true).unwrap_err().to_string().contains("interval_secs"));

        let mut config = telegram_ready();
        config.events.cache_ttl_minutes = 0;
        assert!(config.validate(true).is_err());

        let mut config = telegram_ready();
        config.events.api_url = "not a url".to_string();
        assert!(config.validate(true).unwrap_err().to_string().contains("api_url"));

        let mut config = telegram_ready();
        config
            .display
            .map_colors
            .insert("Dam".to_string(), "#zzzzzz".to_string());
        assert!(config.validate(true).unwrap_err().to_string().contains("map_colors.Dam"));

        let mut config = telegram_ready();
        config.display.utc_offset_hours = 30;
        assert!(config.validate(true).is_err());
    }

    #[test]
    fn unresolvable_token_reference_errors() {
        let mut config = telegram_ready();
        config.telegram.bot_token = Some("env::_RAIDWATCH_UNSET_TOKEN_VAR".to_string());
        let err = config.validate(true).unwrap_err();
        assert!(err.to_string().contains("failed to resolve bot token"));
    }

    #[test]
    fn builds_client_configs() {
        let config = telegram_ready();

        let telegram = config.telegram_config().unwrap();
        assert_eq!(telegram.chat_id, -100123);
        assert_eq!(telegram.timeout, Duration::from_secs(30));

        let events = config.events_api_config().unwrap();
        assert_eq!(events.timeout, Duration::from_secs(10));
        assert_eq!(events.user_agent, "ARC-Raiders-TG-Bot/1.0");

        let formatter = config.caption_formatter();
        assert_eq!(formatter.options().clock_label, "МСК");
    }

    #[test]
    fn redacted_hides_inline_token() {
        let config = telegram_ready().redacted();
        assert_eq!(config.telegram.bot_token.as_deref(), Some("<redacted>"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(!toml_str.contains("123456:ABC"));
    }
}
