//! Messaging platform boundary.
//!
//! The bot only talks to the platform through the [`Platform`] trait and
//! the [`PlatformEvent`] stream. [`slack`] is the concrete adapter.

pub mod slack;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a platform adapter.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered but reported a failure (`"ok": false`).
    #[error("api error: {0}")]
    Api(String),

    /// Credentials were rejected. Never retried.
    #[error("invalid credentials: {0}")]
    InvalidAuth(String),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
}

impl PlatformError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Api(_) => "api",
            Self::InvalidAuth(_) => "invalid_auth",
            Self::Decode(_) => "decode",
            Self::Socket(_) => "socket",
        }
    }

    /// API error strings that mean the token itself is bad.
    pub fn from_api_error(error: &str) -> Self {
        match error {
            "invalid_auth" | "not_authed" | "account_inactive" | "token_revoked"
            | "token_expired" => Self::InvalidAuth(error.to_string()),
            other => Self::Api(other.to_string()),
        }
    }
}

/// A chat message as delivered by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEvent {
    /// Channel id (not name).
    pub channel: String,
    /// Author's user id.
    pub user: String,
    /// Raw message text.
    pub text: String,
    /// Message timestamp, also its id.
    pub ts: String,
    /// Parent thread timestamp when posted inside a thread.
    pub thread_ts: Option<String>,
    /// Platform subtype (`message_changed`, `bot_message`, ...).
    pub subtype: Option<String>,
}

impl MessageEvent {
    /// Thread a reply to this message should go to.
    ///
    /// Inside a thread this is the thread itself; otherwise the message
    /// becomes the root of a new thread.
    pub fn reply_thread(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

/// Events fed to the bot's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Message(MessageEvent),
    /// Non-fatal platform error, logged and skipped.
    Error(String),
    /// Credentials rejected; the bot must stop.
    InvalidAuth(String),
}

/// Outbound operations the bot needs from the platform.
#[async_trait]
pub trait Platform: Send + Sync {
    /// The bot's own user id, used to ignore its own messages.
    async fn bot_user_id(&self) -> Result<String, PlatformError>;

    /// Post `text` to `channel`, inside `thread_ts` when given.
    async fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<(), PlatformError>;

    /// Normalized display name of a user: lower-case, spaces replaced by `.`.
    async fn display_name(&self, user_id: &str) -> Result<String, PlatformError>;

    /// User ids of every member of a channel.
    async fn channel_members(&self, channel_id: &str) -> Result<Vec<String>, PlatformError>;

    /// Normalized name of a channel, used as the ledger's channel key.
    async fn channel_name(&self, channel_id: &str) -> Result<String, PlatformError>;
}

/// Normalize a profile name into a karma word.
pub fn normalize_display_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_display_name() {
        assert_eq!(normalize_display_name("Ada Lovelace"), "ada.lovelace");
        assert_eq!(normalize_display_name(" bob "), "bob");
    }

    #[test]
    fn test_reply_thread() {
        let mut event = MessageEvent {
            ts: "1700000000.000100".into(),
            ..Default::default()
        };
        assert_eq!(event.reply_thread(), "1700000000.000100");

        event.thread_ts = Some("1699999999.000001".into());
        assert_eq!(event.reply_thread(), "1699999999.000001");
    }

    #[test]
    fn test_auth_errors_are_fatal() {
        assert!(matches!(
            PlatformError::from_api_error("invalid_auth"),
            PlatformError::InvalidAuth(_)
        ));
        assert!(matches!(
            PlatformError::from_api_error("account_inactive"),
            PlatformError::InvalidAuth(_)
        ));
        assert!(matches!(
            PlatformError::from_api_error("channel_not_found"),
            PlatformError::Api(_)
        ));
    }
}
