//! Configuration commands.

use std::path::Path;

use crate::config::BotConfig;
use crate::error::{BotError, BotResult};

/// Dumps the effective configuration to stdout. Inline tokens are redacted.
pub fn dump(config: &BotConfig, path: &Path) -> BotResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| BotError::config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validates the configuration, including the bot token reference.
pub fn validate(config: &BotConfig) -> BotResult<()> {
    config.validate(true)?;
    println!("Configuration is valid.");
    Ok(())
}

/// Shows the configuration file path.
pub fn path(path: &Path) -> BotResult<()> {
    let marker = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("config: {}{}", path.display(), marker);
    Ok(())
}
