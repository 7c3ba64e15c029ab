//! Per-channel settings repository.

use crate::db::DbError;
use sqlx::SqlitePool;
use std::fmt;

/// A recognized channel setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    /// Notify only when the new score is a multiple of this value.
    NotifyKarma,
    /// Append a thumbs emoji to karma notices (0 or 1).
    UseKarmaEmojis,
}

impl Setting {
    pub const ALL: [Setting; 2] = [Setting::NotifyKarma, Setting::UseKarmaEmojis];

    /// Storage and command-line name.
    pub fn key(&self) -> &'static str {
        match self {
            Self::NotifyKarma => "notify_karma",
            Self::UseKarmaEmojis => "use_karma_emojis",
        }
    }

    /// Look up a setting by its name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Whether `value` is acceptable for this setting.
    pub fn accepts(&self, value: i64) -> bool {
        match self {
            Self::NotifyKarma => value > 0,
            Self::UseKarmaEmojis => value == 0 || value == 1,
        }
    }

    /// Value used when the channel never configured the setting.
    pub fn default_value(&self) -> i64 {
        match self {
            Self::NotifyKarma => 1,
            Self::UseKarmaEmojis => 0,
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Effective settings of one channel, defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSettings {
    pub use_emojis: bool,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            use_emojis: Setting::UseKarmaEmojis.default_value() == 1,
        }
    }
}

/// Repository for settings operations.
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored value, or `None` if not configured.
    ///
    /// Values that no longer parse or validate are treated as not configured.
    pub async fn get(&self, channel: &str, setting: Setting) -> Result<Option<i64>, DbError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE channel = ? AND name = ?")
                .bind(channel)
                .bind(setting.key())
                .fetch_optional(self.pool)
                .await?;

        Ok(value
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| setting.accepts(*v)))
    }

    /// Store a value. Callers validate with [`Setting::accepts`] first.
    pub async fn set(&self, channel: &str, setting: Setting, value: i64) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO settings (channel, name, value)
            VALUES (?, ?, ?)
            ON CONFLICT (channel, name) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(channel)
        .bind(setting.key())
        .bind(value.to_string())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Load the settings that shape karma notices.
    ///
    /// `notify_karma` is read by [`KarmaRepository::apply_delta`](crate::db::KarmaRepository::apply_delta)
    /// in the same transaction as the score change.
    pub async fn load(&self, channel: &str) -> Result<ChannelSettings, DbError> {
        let mut settings = ChannelSettings::default();

        if let Some(emojis) = self.get(channel, Setting::UseKarmaEmojis).await? {
            settings.use_emojis = emojis == 1;
        }

        Ok(settings)
    }
}
