//! Unified error handling for karmabot.
//!
//! Command errors carry everything needed to render the user-facing reply;
//! bot errors are the fatal conditions that end the event loop.

use crate::db::DbError;
use crate::platform::PlatformError;
use kb_proto::format_mention;
use thiserror::Error;

// ============================================================================
// Command Errors (command processing)
// ============================================================================

/// Errors that can occur while processing an administrative command.
///
/// Every variant renders to a chat reply via [`CommandError::reply`].
#[derive(Debug, Error)]
pub enum CommandError {
    /// Wrong argument count or a non-integer where one is required.
    #[error("incorrect parameters, usage: {0}")]
    Usage(String),

    /// `action` reads like "set karma on this channel".
    #[error("user {who} may not {action}")]
    PermissionDenied { who: String, action: &'static str },

    #[error("word {word} is already in use as an alias")]
    AliasCycle { word: String },

    #[error("alias {alias} for word {word} already exists")]
    AliasExists { word: String, alias: String },

    #[error("invalid alias {alias} for word {word}")]
    InvalidAlias { word: String, alias: String },

    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    #[error("invalid value {value} for setting {setting}")]
    InvalidSettingValue { setting: String, value: String },

    #[error("no user mention, usage: {0}")]
    NoUserDetected(String),

    #[error("channel has no admins")]
    NoAdmins,

    #[error("user {0} is already an admin")]
    AlreadyAdmin(String),

    #[error("user {0} is not an admin")]
    NotAdmin(String),

    #[error("store error: {0}")]
    Store(#[from] DbError),
}

impl CommandError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::AliasCycle { .. } => "alias_cycle",
            Self::AliasExists { .. } => "alias_exists",
            Self::InvalidAlias { .. } => "invalid_alias",
            Self::UnknownSetting(_) => "unknown_setting",
            Self::InvalidSettingValue { .. } => "invalid_setting_value",
            Self::NoUserDetected(_) => "no_user_detected",
            Self::NoAdmins => "no_admins",
            Self::AlreadyAdmin(_) => "already_admin",
            Self::NotAdmin(_) => "not_admin",
            Self::Store(_) => "store_error",
        }
    }

    /// Render the chat reply for this error.
    pub fn reply(&self) -> String {
        match self {
            Self::Usage(usage) => format!("Incorrect parameters. Usage {} :warning:", usage),
            Self::PermissionDenied { who, action } => format!(
                "User {} has no permissions to {} :no_entry_sign:",
                format_mention(who),
                action
            ),
            Self::AliasCycle { word } => format!(
                "Word `{}` is already in use as an alias in this channel, operation not permitted :no_entry_sign:",
                word
            ),
            Self::AliasExists { word, alias } => format!(
                "Alias `{}` for word `{}` already exists on this channel :warning:",
                alias, word
            ),
            Self::InvalidAlias { word, alias } => {
                format!("Invalid alias `{}` for word `{}` :warning:", alias, word)
            }
            Self::UnknownSetting(name) => format!(
                "Incorrect setting name, setting `{}` is not a valid setting :warning:",
                name
            ),
            Self::InvalidSettingValue { setting, value } => format!(
                "Invalid value `{}` for setting `{}` :warning:",
                value, setting
            ),
            Self::NoUserDetected(usage) => {
                format!("No user detected. Usage {} :warning:", usage)
            }
            Self::NoAdmins => {
                "Channel has no admins configured. Deletion canceled. :warning:".to_string()
            }
            Self::AlreadyAdmin(user) => format!(
                "User {} is already an admin for this channel :warning:",
                format_mention(user)
            ),
            Self::NotAdmin(user) => format!(
                "User {} is not admin for this channel. Deletion canceled. :warning:",
                format_mention(user)
            ),
            Self::Store(_) => "Database error. Please try again later. :warning:".to_string(),
        }
    }
}

/// Result type for command handlers.
pub type CommandResult = Result<String, CommandError>;

// ============================================================================
// Bot Errors (fatal to the event loop)
// ============================================================================

/// Errors that stop the bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Credentials rejected by the platform. Never retried.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    #[error("store error: {0}")]
    Store(#[from] DbError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            CommandError::Usage("kb get karma word".into()),
            CommandError::PermissionDenied {
                who: "u1".into(),
                action: "set karma on this channel",
            },
            CommandError::AliasCycle { word: "a".into() },
            CommandError::AliasExists {
                word: "a".into(),
                alias: "b".into(),
            },
            CommandError::InvalidAlias {
                word: "a".into(),
                alias: "a".into(),
            },
            CommandError::UnknownSetting("x".into()),
            CommandError::InvalidSettingValue {
                setting: "notify_karma".into(),
                value: "0".into(),
            },
            CommandError::NoUserDetected("kb set admin @user".into()),
            CommandError::NoAdmins,
            CommandError::AlreadyAdmin("u1".into()),
            CommandError::NotAdmin("u1".into()),
            CommandError::Store(DbError::Integrity("bad".into())),
        ];

        let mut codes: Vec<_> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_replies_mention_users_upper_case() {
        let err = CommandError::PermissionDenied {
            who: "u1abc".into(),
            action: "set karma on this channel",
        };
        assert_eq!(
            err.reply(),
            "User <@U1ABC> has no permissions to set karma on this channel :no_entry_sign:"
        );
        assert_eq!(
            CommandError::NotAdmin("u2".into()).reply(),
            "User <@U2> is not admin for this channel. Deletion canceled. :warning:"
        );
    }

    #[test]
    fn test_store_reply_hides_details() {
        let err = CommandError::Store(DbError::Integrity("page 7 corrupt".into()));
        assert!(!err.reply().contains("page 7"));
        assert_eq!(err.error_code(), "store_error");
    }
}
