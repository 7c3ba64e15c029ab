//! Recording in-memory [`Platform`].

use async_trait::async_trait;
use karmabot::platform::{Platform, PlatformError};
use std::collections::HashMap;
use std::sync::Mutex;

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub channel: String,
    pub text: String,
    pub thread_ts: Option<String>,
}

/// Platform double with fixed users and channels.
///
/// Knows `#general` (`C1`) and `#random` (`C2`); users are added with
/// [`with_user`](Self::with_user).
pub struct MockPlatform {
    bot_user: String,
    auth_error: Option<String>,
    send_error: Option<String>,
    users: HashMap<String, String>,
    channels: HashMap<String, String>,
    members: HashMap<String, Vec<String>>,
    sent: Mutex<Vec<Sent>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        let channels = [("C1", "general"), ("C2", "random")]
            .into_iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect();

        Self {
            bot_user: "UBOT".to_string(),
            auth_error: None,
            send_error: None,
            users: HashMap::new(),
            channels,
            members: HashMap::new(),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Register a user's normalized display name.
    pub fn with_user(mut self, id: &str, name: &str) -> Self {
        self.users.insert(id.to_string(), name.to_string());
        self
    }

    /// Set the member list of a channel.
    pub fn with_members(mut self, channel: &str, members: &[&str]) -> Self {
        self.members.insert(
            channel.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    /// Reject the bot's credentials.
    pub fn rejecting_auth(mut self) -> Self {
        self.auth_error = Some("invalid_auth".to_string());
        self
    }

    /// Fail every `send_message` call.
    pub fn rejecting_sends(mut self) -> Self {
        self.send_error = Some("channel_is_archived".to_string());
        self
    }

    /// Drain recorded messages.
    pub fn take_sent(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn bot_user_id(&self) -> Result<String, PlatformError> {
        match &self.auth_error {
            Some(reason) => Err(PlatformError::InvalidAuth(reason.clone())),
            None => Ok(self.bot_user.clone()),
        }
    }

    async fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<(), PlatformError> {
        if let Some(error) = &self.send_error {
            return Err(PlatformError::Api(error.clone()));
        }
        self.sent.lock().unwrap().push(Sent {
            channel: channel.to_string(),
            text: text.to_string(),
            thread_ts: thread_ts.map(str::to_string),
        });
        Ok(())
    }

    async fn display_name(&self, user_id: &str) -> Result<String, PlatformError> {
        self.users
            .get(&user_id.to_uppercase())
            .cloned()
            .ok_or_else(|| PlatformError::Api("user_not_found".to_string()))
    }

    async fn channel_members(&self, channel_id: &str) -> Result<Vec<String>, PlatformError> {
        Ok(self.members.get(channel_id).cloned().unwrap_or_default())
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String, PlatformError> {
        self.channels
            .get(channel_id)
            .cloned()
            .ok_or_else(|| PlatformError::Api("channel_not_found".to_string()))
    }
}
