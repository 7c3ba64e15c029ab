//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_api_base, default_cooldown_secs, default_database_path, default_event_buffer,
    default_metrics_port, default_prefix, default_rank_limit,
};

/// Overrides `slack.bot_token`.
pub const ENV_BOT_TOKEN: &str = "KARMABOT_BOT_TOKEN";
/// Overrides `slack.app_token`.
pub const ENV_APP_TOKEN: &str = "KARMABOT_APP_TOKEN";
/// Overrides `database.path`.
pub const ENV_DATABASE: &str = "KARMABOT_DATABASE";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Command and scoring behaviour.
    #[serde(default)]
    pub bot: BotConfig,
    /// Slack credentials and endpoint.
    #[serde(default)]
    pub slack: SlackConfig,
    /// Ledger storage.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Metrics endpoint.
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Replace credentials and the database path with values from `lookup`.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a configured token.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_BOT_TOKEN) {
            self.slack.bot_token = token;
        }
        if let Some(token) = get(ENV_APP_TOKEN) {
            self.slack.app_token = token;
        }
        if let Some(path) = get(ENV_DATABASE) {
            self.database.path = path;
        }
    }
}

/// Command and scoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Invocation keyword for commands (default: "kb").
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Seconds an actor must wait before scoring the same word again (default: 10).
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Entries shown by `rank` without `all` (default: 10).
    #[serde(default = "default_rank_limit")]
    pub rank_limit: u32,
    /// Capacity of the inbound event queue (default: 256).
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl BotConfig {
    /// Cooldown window as a `Duration`.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            cooldown_secs: default_cooldown_secs(),
            rank_limit: default_rank_limit(),
            event_buffer: default_event_buffer(),
        }
    }
}

/// Slack credentials.
#[derive(Clone, Deserialize)]
pub struct SlackConfig {
    /// Bot user OAuth token (`xoxb-...`), used for the Web API.
    #[serde(default)]
    pub bot_token: String,
    /// App-level token (`xapp-...`), used to open Socket Mode connections.
    #[serde(default)]
    pub app_token: String,
    /// Web API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            app_token: String::new(),
            api_base: default_api_base(),
        }
    }
}

// Tokens must never reach the logs.
impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"<redacted>")
            .field("app_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// Metrics endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Prometheus metrics HTTP port (default: 9090, 0 disables).
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            metrics_port: default_metrics_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.bot.prefix, "kb");
        assert_eq!(config.bot.cooldown(), Duration::from_secs(10));
        assert_eq!(config.bot.rank_limit, 10);
        assert_eq!(config.bot.event_buffer, 256);
        assert_eq!(config.slack.api_base, "https://slack.com/api");
        assert_eq!(config.database.path, "karmabot.db");
        assert_eq!(config.server.metrics_port, 9090);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
[bot]
cooldown_secs = 30

[slack]
bot_token = "xoxb-1"
app_token = "xapp-1"

[server]
metrics_port = 0
"#,
        )
        .unwrap();

        assert_eq!(config.bot.cooldown_secs, 30);
        assert_eq!(config.bot.prefix, "kb");
        assert_eq!(config.slack.bot_token, "xoxb-1");
        assert_eq!(config.server.metrics_port, 0);
    }

    #[test]
    fn test_env_overrides() {
        let mut config: Config = toml::from_str(
            r#"
[slack]
bot_token = "xoxb-file"
app_token = "xapp-file"
"#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_BOT_TOKEN, "xoxb-env"),
            (ENV_APP_TOKEN, "  "),
            (ENV_DATABASE, "/var/lib/karmabot/karma.db"),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.slack.bot_token, "xoxb-env");
        // Blank values keep the file setting
        assert_eq!(config.slack.app_token, "xapp-file");
        assert_eq!(config.database.path, "/var/lib/karmabot/karma.db");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("karmabot.toml");
        std::fs::write(&path, "[bot]\nprefix = \"karma\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.bot.prefix, "karma");

        assert!(matches!(
            Config::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));

        std::fs::write(&path, "[bot\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let mut config = Config::default();
        config.slack.bot_token = "xoxb-secret".into();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("xoxb-secret"));
    }
}
