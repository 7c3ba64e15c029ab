//! User mention markup.
//!
//! Chat platforms render user references as `<@ID>` (optionally `<@ID|label>`)
//! and the channel-wide broadcast as `<!here>`. After normalization the ID is
//! lower-case; the platform expects it upper-case again when we echo it back.

use crate::error::ProtoError;

/// Broadcast mention that targets everyone present in a channel.
pub const HERE: &str = "<!here>";

/// A parsed mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mention<'a> {
    /// A single user, by platform id.
    User(&'a str),
    /// Everyone in the channel.
    Here,
}

/// Parse `<@id>`, `<@id|label>` or `<!here>`.
pub fn parse_mention(text: &str) -> Option<Mention<'_>> {
    if text == HERE {
        return Some(Mention::Here);
    }

    let inner = text.strip_prefix("<@")?.strip_suffix('>')?;
    let id = inner.split('|').next().unwrap_or(inner);

    if id.is_empty() || !id.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(Mention::User(id))
}

/// Parse a user mention, rejecting anything else (including `<!here>`).
pub fn parse_user_mention(text: &str) -> Result<&str, ProtoError> {
    match parse_mention(text) {
        Some(Mention::User(id)) => Ok(id),
        _ => Err(ProtoError::InvalidMention(text.to_string())),
    }
}

/// Check whether `text` is exactly one user mention.
#[inline]
pub fn is_user_mention(text: &str) -> bool {
    matches!(parse_mention(text), Some(Mention::User(_)))
}

/// Render a user id as mention markup the platform will highlight.
pub fn format_mention(user_id: &str) -> String {
    format!("<@{}>", user_id.to_uppercase())
}

/// Render a user id the way it appears in normalized message text.
///
/// This is the form used as a ledger and alias key for users.
pub fn mention_key(user_id: &str) -> String {
    format!("<@{}>", user_id.to_lowercase())
}
