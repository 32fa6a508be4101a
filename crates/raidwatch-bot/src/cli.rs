//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// raidwatch - ARC Raiders event dashboard for Telegram
#[derive(Debug, Parser)]
#[command(name = "raidwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "RAIDWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    // --- Overrides for config.toml ---
    /// Telegram bot token (supports `env::` and `pass::` references)
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Target chat id
    #[arg(long, env = "CHAT_ID", allow_negative_numbers = true)]
    pub chat_id: Option<i64>,

    /// Events schedule endpoint
    #[arg(long, env = "API_URL")]
    pub api_url: Option<String>,

    /// Seconds between dashboard updates
    #[arg(long, env = "UPDATE_INTERVAL")]
    pub update_interval: Option<u64>,

    /// Minutes the event schedule is cached
    #[arg(long, env = "API_REFRESH_INTERVAL")]
    pub cache_ttl: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bot in the foreground (default)
    Run,

    /// Render the dashboard once without posting it
    Preview {
        /// Where to write the PNG
        #[arg(long, short, default_value = "dashboard.png")]
        output: PathBuf,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["raidwatch"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn overrides_parse() {
        let cli = Cli::try_parse_from([
            "raidwatch",
            "--chat-id",
            "-1001234567890",
            "--update-interval",
            "10",
            "--cache-ttl",
            "3",
            "preview",
            "--output",
            "out.png",
        ])
        .unwrap();

        assert_eq!(cli.chat_id, Some(-1001234567890));
        assert_eq!(cli.update_interval, Some(10));
        assert_eq!(cli.cache_ttl, Some(3));
        assert!(matches!(cli.command, Some(Command::Preview { ref output }) if output == &PathBuf::from("out.png")));
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = Cli::try_parse_from(["raidwatch", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Validate
            })
        ));
    }
}
