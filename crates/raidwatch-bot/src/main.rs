//! raidwatch CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use raidwatch_bot::cli::{Cli, Command, ConfigAction};
use raidwatch_bot::commands;
use raidwatch_bot::config::BotConfig;
use raidwatch_bot::error::BotResult;
use raidwatch_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(TracingConfig::from_flags(cli.debug, cli.log_json)) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "raidwatch failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> BotResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(BotConfig::default_path);
    let mut config = if cli.config.is_some() {
        BotConfig::load_from(&config_path)?
    } else {
        BotConfig::load()?
    };
    config.apply_cli(&cli);

    match cli.command {
        None | Some(Command::Run) => commands::run::run(&config).await,
        Some(Command::Preview { output }) => commands::preview::preview(&config, &output).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
