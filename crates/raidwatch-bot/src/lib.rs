//! CLI, configuration, and daemon entry point
//!
//! This crate provides the `raidwatch` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use config::BotConfig;
pub use error::{BotError, BotResult};
