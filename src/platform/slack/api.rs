//! Slack Web API and Socket Mode wire types.
//!
//! Only the fields the bot reads are modelled; everything else is ignored.

use serde::{Deserialize, Serialize};

use crate::platform::{MessageEvent, PlatformError};

/// Every Web API response: `ok`, an optional `error`, then the method's fields.
///
/// Body types default every field so error responses still decode.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> ApiResponse<T> {
    /// Turn an `"ok": false` response into an error.
    pub fn into_result(self) -> Result<T, PlatformError> {
        if self.ok {
            Ok(self.body)
        } else {
            let error = self.error.unwrap_or_else(|| "unknown_error".to_string());
            Err(PlatformError::from_api_error(&error))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthTest {
    pub user_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConnectionsOpen {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UsersInfo {
    pub user: User,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub real_name: String,
    pub profile: Profile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub display_name_normalized: String,
    pub real_name: String,
}

impl User {
    /// Display name, falling back to the real name.
    pub fn best_name(&self) -> &str {
        [
            self.profile.display_name_normalized.as_str(),
            self.profile.real_name.as_str(),
            self.real_name.as_str(),
        ]
        .into_iter()
        .find(|n| !n.trim().is_empty())
        .unwrap_or(self.id.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConversationsMembers {
    pub members: Vec<String>,
    pub response_metadata: ResponseMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponseMetadata {
    pub next_cursor: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConversationsInfo {
    pub channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub name: String,
    pub name_normalized: String,
}

impl Channel {
    pub fn best_name(&self) -> &str {
        if self.name_normalized.is_empty() {
            &self.name
        } else {
            &self.name_normalized
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostMessage {
    pub ts: String,
}

#[derive(Debug, Serialize)]
pub struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<&'a str>,
}

// ============================================================================
// Socket Mode
// ============================================================================

/// A Socket Mode frame.
#[derive(Debug, Deserialize)]
pub struct SocketEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub envelope_id: Option<String>,
    #[serde(default)]
    pub payload: Option<EventsApiPayload>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Acknowledgement sent back for every envelope.
#[derive(Debug, Serialize)]
pub struct SocketAck<'a> {
    pub envelope_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EventsApiPayload {
    #[serde(default)]
    pub event: Option<SlackEvent>,
}

/// An Events API event; only `message` events are used.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SlackEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub channel: String,
    pub user: String,
    pub text: String,
    pub ts: String,
    pub thread_ts: Option<String>,
    pub subtype: Option<String>,
}

impl SlackEvent {
    /// Convert a `message` event; anything else yields `None`.
    pub fn into_message(self) -> Option<MessageEvent> {
        if self.kind != "message" {
            return None;
        }
        Some(MessageEvent {
            channel: self.channel,
            user: self.user,
            text: self.text,
            ts: self.ts,
            thread_ts: self.thread_ts,
            subtype: self.subtype,
        })
    }
}
