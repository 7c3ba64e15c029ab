//! Slack adapter: Web API client plus the Socket Mode event stream.
//!
//! The Web API side (this module) implements [`Platform`] with a bot token.
//! [`socket`] opens Socket Mode connections with the app token and feeds
//! [`PlatformEvent`](crate::platform::PlatformEvent)s into the bot's queue.

mod api;
pub mod socket;

pub use socket::run_socket_mode;

use crate::config::SlackConfig;
use crate::platform::{Platform, PlatformError, normalize_display_name};
use api::{
    ApiResponse, AuthTest, ConnectionsOpen, ConversationsInfo, ConversationsMembers, PostMessage,
    PostMessageRequest, UsersInfo,
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::debug;

/// Timeout for Web API calls.
const API_TIMEOUT: Duration = Duration::from_secs(10);

/// How long resolved user and channel names are reused.
const NAME_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Page size for `conversations.members`.
const MEMBERS_PAGE: &str = "200";

/// Cached lookup with expiry.
#[derive(Debug, Clone)]
struct CachedName {
    name: String,
    expires_at: Instant,
}

/// Slack Web API client.
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    app_token: String,
    /// Bot user id from `auth.test`.
    bot_user: OnceCell<String>,
    /// User id -> normalized display name.
    users: DashMap<String, CachedName>,
    /// Channel id -> normalized channel name.
    channels: DashMap<String, CachedName>,
}

impl SlackClient {
    /// Create a client from configuration.
    pub fn new(config: &SlackConfig) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .user_agent(concat!("karmabot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            app_token: config.app_token.clone(),
            bot_user: OnceCell::new(),
            users: DashMap::new(),
            channels: DashMap::new(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// Call a form-encoded Web API method.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        token: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PlatformError> {
        let bytes = self
            .http
            .post(self.url(method))
            .bearer_auth(token)
            .form(params)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let response: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        response.into_result()
    }

    /// Request a fresh Socket Mode websocket URL (app token).
    pub async fn open_socket_url(&self) -> Result<String, PlatformError> {
        let open: ConnectionsOpen = self
            .call("apps.connections.open", &self.app_token, &[])
            .await?;
        Ok(open.url)
    }

    fn cached(cache: &DashMap<String, CachedName>, key: &str) -> Option<String> {
        cache
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.name.clone())
    }

    fn remember(cache: &DashMap<String, CachedName>, key: &str, name: &str) {
        cache.insert(
            key.to_string(),
            CachedName {
                name: name.to_string(),
                expires_at: Instant::now() + NAME_CACHE_TTL,
            },
        );
    }
}

#[async_trait]
impl Platform for SlackClient {
    async fn bot_user_id(&self) -> Result<String, PlatformError> {
        self.bot_user
            .get_or_try_init(|| async {
                let auth: AuthTest = self.call("auth.test", &self.bot_token, &[]).await?;
                debug!(user_id = %auth.user_id, "authenticated bot user");
                Ok::<_, PlatformError>(auth.user_id)
            })
            .await
            .cloned()
    }

    async fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<(), PlatformError> {
        let request = PostMessageRequest {
            channel,
            text,
            thread_ts,
        };

        let bytes = self
            .http
            .post(self.url("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let response: ApiResponse<PostMessage> = serde_json::from_slice(&bytes)?;
        let posted = response.into_result()?;
        debug!(channel = %channel, ts = %posted.ts, "message posted");
        Ok(())
    }

    async fn display_name(&self, user_id: &str) -> Result<String, PlatformError> {
        if let Some(name) = Self::cached(&self.users, user_id) {
            return Ok(name);
        }

        let info: UsersInfo = self
            .call("users.info", &self.bot_token, &[("user", user_id)])
            .await?;
        let name = normalize_display_name(info.user.best_name());

        Self::remember(&self.users, user_id, &name);
        Ok(name)
    }

    async fn channel_members(&self, channel_id: &str) -> Result<Vec<String>, PlatformError> {
        let mut members = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut params = vec![("channel", channel_id), ("limit", MEMBERS_PAGE)];
            if !cursor.is_empty() {
                params.push(("cursor", cursor.as_str()));
            }

            let page: ConversationsMembers = self
                .call("conversations.members", &self.bot_token, &params)
                .await?;
            members.extend(page.members);

            if page.response_metadata.next_cursor.is_empty() {
                break;
            }
            cursor = page.response_metadata.next_cursor;
        }

        Ok(members)
    }

    async fn channel_name(&self, channel_id: &str) -> Result<String, PlatformError> {
        if let Some(name) = Self::cached(&self.channels, channel_id) {
            return Ok(name);
        }

        let info: ConversationsInfo = self
            .call("conversations.info", &self.bot_token, &[("channel", channel_id)])
            .await?;
        let name = info.channel.best_name().to_lowercase();

        Self::remember(&self.channels, channel_id, &name);
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serve a fake Web API on an ephemeral port and return a client for it.
    async fn client_for(app: Router) -> SlackClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        SlackClient::new(&SlackConfig {
            bot_token: "xoxb-test".into(),
            app_token: "xapp-test".into(),
            api_base: format!("http://{}/api/", addr),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_display_name_is_normalized_and_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/api/users.info",
            post(move |Form(form): Form<HashMap<String, String>>| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    assert_eq!(form.get("user").map(String::as_str), Some("U1"));
                    Json(serde_json::json!({
                        "ok": true,
                        "user": {"id": "U1", "profile": {"display_name_normalized": "Ada Lovelace"}}
                    }))
                }
            }),
        );
        let client = client_for(app).await;

        assert_eq!(client.display_name("U1").await.unwrap(), "ada.lovelace");
        assert_eq!(client.display_name("U1").await.unwrap(), "ada.lovelace");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_channel_members_follows_cursor() {
        let app = Router::new().route(
            "/api/conversations.members",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                let body = match form.get("cursor").map(String::as_str) {
                    None => serde_json::json!({
                        "ok": true,
                        "members": ["U1", "U2"],
                        "response_metadata": {"next_cursor": "page2"}
                    }),
                    Some("page2") => serde_json::json!({
                        "ok": true,
                        "members": ["U3"],
                        "response_metadata": {"next_cursor": ""}
                    }),
                    Some(_) => serde_json::json!({"ok": false, "error": "invalid_cursor"}),
                };
                Json(body)
            }),
        );
        let client = client_for(app).await;

        assert_eq!(client.channel_members("C1").await.unwrap(), vec!["U1", "U2", "U3"]);
    }

    #[tokio::test]
    async fn test_invalid_auth_surfaces() {
        let app = Router::new().route(
            "/api/auth.test",
            post(|| async { Json(serde_json::json!({"ok": false, "error": "invalid_auth"})) }),
        );
        let client = client_for(app).await;

        assert!(matches!(
            client.bot_user_id().await,
            Err(PlatformError::InvalidAuth(_))
        ));
    }

    #[tokio::test]
    async fn test_channel_name_prefers_normalized() {
        let app = Router::new().route(
            "/api/conversations.info",
            post(|| async {
                Json(serde_json::json!({
                    "ok": true,
                    "channel": {"id": "C1", "name": "General", "name_normalized": "general"}
                }))
            }),
        );
        let client = client_for(app).await;

        assert_eq!(client.channel_name("C1").await.unwrap(), "general");
    }
}
