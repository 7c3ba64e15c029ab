//! Per-actor cooldown for karma scoring.
//!
//! An actor who scores a word in a channel cannot score that same word
//! there again until the window has passed. Windows live only in memory;
//! a restart forgets them.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// (channel, word, actor)
type CooldownKey = (String, String, String);

/// Thread-safe cooldown tracker.
#[derive(Debug)]
pub struct CooldownTracker {
    /// Expiry instant of each open window.
    windows: DashMap<CooldownKey, Instant>,
    window: Duration,
}

impl CooldownTracker {
    /// Create a tracker with the given window length.
    pub fn new(window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            window,
        }
    }

    /// Check whether `actor` may score `word` in `channel` now.
    ///
    /// An allowed check opens a new window; a suppressed one leaves the
    /// existing window untouched.
    pub fn allow(&self, channel: &str, word: &str, actor: &str) -> bool {
        self.allow_at(channel, word, actor, Instant::now())
    }

    /// [`allow`](Self::allow) against an explicit clock.
    pub fn allow_at(&self, channel: &str, word: &str, actor: &str, now: Instant) -> bool {
        let key = (channel.to_string(), word.to_string(), actor.to_string());

        let mut expiry = self.windows.entry(key).or_insert(now);
        if now < *expiry {
            debug!(channel = %channel, word = %word, actor = %actor, "karma cooldown active");
            return false;
        }

        *expiry = now + self.window;
        true
    }

    /// Drop expired windows. Called periodically from a maintenance task.
    pub fn prune(&self) -> usize {
        self.prune_at(Instant::now())
    }

    fn prune_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, expiry| *expiry > now);
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            debug!(removed, "pruned expired cooldown windows");
        }
        removed
    }

    /// Number of tracked windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
