//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Bot Defaults
// =============================================================================

pub fn default_prefix() -> String {
    kb_proto::DEFAULT_PREFIX.to_string()
}

pub fn default_cooldown_secs() -> u64 {
    10
}

pub fn default_rank_limit() -> u32 {
    10
}

pub fn default_event_buffer() -> usize {
    256
}

// =============================================================================
// Slack Defaults
// =============================================================================

pub fn default_api_base() -> String {
    "https://slack.com/api".to_string()
}

// =============================================================================
// Storage / Server Defaults
// =============================================================================

pub fn default_database_path() -> String {
    "karmabot.db".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}
