//! Integration test common infrastructure.
//!
//! Provides an in-memory platform that records outbound messages and a
//! harness that feeds chat lines into a [`Bot`] backed by a memory database.

#![allow(dead_code)]

pub mod platform;

pub use platform::{MockPlatform, Sent};

use karmabot::bot::Bot;
use karmabot::config::BotConfig;
use karmabot::db::Database;
use karmabot::platform::MessageEvent;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Channel id of `#general` on the mock platform.
pub const GENERAL: &str = "C1";
/// Channel id of `#random` on the mock platform.
pub const RANDOM: &str = "C2";

/// A bot wired to a [`MockPlatform`] and a fresh memory database.
pub struct TestBot {
    pub bot: Bot,
    pub platform: Arc<MockPlatform>,
    pub db: Database,
    clock: AtomicU64,
}

impl TestBot {
    /// Default configuration and platform.
    pub async fn new() -> Self {
        Self::with(BotConfig::default(), MockPlatform::new()).await
    }

    pub async fn with(config: BotConfig, platform: MockPlatform) -> Self {
        let db = Database::new(":memory:")
            .await
            .expect("Failed to open memory database");
        let platform = Arc::new(platform);
        let bot = Bot::new(&config, db.clone(), platform.clone())
            .await
            .expect("Failed to build bot");

        Self {
            bot,
            platform,
            db,
            clock: AtomicU64::new(1),
        }
    }

    /// Next message timestamp, in the platform's `seconds.micros` form.
    pub fn next_ts(&self) -> String {
        let n = self.clock.fetch_add(1, Ordering::Relaxed);
        format!("1700000000.{:06}", n)
    }

    /// Post a top-level message in `#general` and return what the bot sent.
    pub async fn say(&self, user: &str, text: &str) -> Vec<Sent> {
        self.say_in(GENERAL, user, text, None).await
    }

    /// Post a message and return what the bot sent in response.
    pub async fn say_in(
        &self,
        channel: &str,
        user: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Vec<Sent> {
        let event = MessageEvent {
            channel: channel.to_string(),
            user: user.to_string(),
            text: text.to_string(),
            ts: self.next_ts(),
            thread_ts: thread_ts.map(str::to_string),
            subtype: None,
        };
        self.deliver(&event).await
    }

    /// Deliver a prepared event and return what the bot sent.
    pub async fn deliver(&self, event: &MessageEvent) -> Vec<Sent> {
        self.platform.take_sent();
        self.bot.handle_message(event).await;
        self.platform.take_sent()
    }

    /// Text of the single message the bot sent for `text`.
    pub async fn reply(&self, user: &str, text: &str) -> String {
        let sent = self.say(user, text).await;
        assert_eq!(sent.len(), 1, "expected one reply to {text:?}, got {sent:?}");
        sent[0].text.clone()
    }

    /// Current score of `word` in `#general`.
    pub async fn score(&self, word: &str) -> Option<i64> {
        self.db
            .karma()
            .current_score("general", word)
            .await
            .expect("Failed to read score")
    }
}
