//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.prefix is required")]
    EmptyPrefix,
    #[error("bot.prefix must be a single lower-case word, got '{0}'")]
    InvalidPrefix(String),
    #[error("bot.cooldown_secs must be greater than 0")]
    ZeroCooldown,
    #[error("bot.rank_limit must be greater than 0")]
    ZeroRankLimit,
    #[error("bot.event_buffer must be greater than 0")]
    ZeroEventBuffer,
    #[error("slack.bot_token is required (or set KARMABOT_BOT_TOKEN)")]
    MissingBotToken,
    #[error("slack.app_token is required (or set KARMABOT_APP_TOKEN)")]
    MissingAppToken,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Messages are lower-cased before matching, so the prefix must be too
    let prefix = &config.bot.prefix;
    if prefix.is_empty() {
        errors.push(ValidationError::EmptyPrefix);
    } else if prefix.chars().any(|c| c.is_whitespace() || c.is_uppercase()) {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }

    if config.bot.cooldown_secs == 0 {
        errors.push(ValidationError::ZeroCooldown);
    }
    if config.bot.rank_limit == 0 {
        errors.push(ValidationError::ZeroRankLimit);
    }
    if config.bot.event_buffer == 0 {
        errors.push(ValidationError::ZeroEventBuffer);
    }

    // Credentials
    if config.slack.bot_token.trim().is_empty() {
        errors.push(ValidationError::MissingBotToken);
    }
    if config.slack.app_token.trim().is_empty() {
        errors.push(ValidationError::MissingAppToken);
    }

    // Database path validation
    let db_path = Path::new(&config.database.path);
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(config.database.path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
