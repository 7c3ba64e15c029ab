//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading (Config, BotConfig, SlackConfig)
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks that report every problem at once

mod defaults;
mod types;
mod validation;

pub use types::{
    BotConfig, Config, ConfigError, DatabaseConfig, ENV_APP_TOKEN, ENV_BOT_TOKEN, ENV_DATABASE,
    ServerConfig, SlackConfig,
};
pub use validation::{ValidationError, validate};
