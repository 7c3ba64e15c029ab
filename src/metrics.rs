//! Prometheus metrics collection for karmabot.
//!
//! Exposed on the `/metrics` HTTP endpoint (see [`crate::http`]).
//!
//! - `karmabot_karma_updates_total{direction}` - Applied karma deltas
//! - `karmabot_karma_suppressed_total{reason}` - Deltas dropped by cooldown or self-karma
//! - `karmabot_command_total{group,operation}` - Commands processed
//! - `karmabot_command_duration_seconds{group,operation}` - Command latency histogram
//! - `karmabot_command_errors_total{group,error}` - Commands answered with an error reply
//! - `karmabot_messages_dropped_total{reason}` - Messages abandoned before processing finished

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Event stream
// ========================================================================

/// Message events accepted from the platform.
pub static MESSAGES_RECEIVED: OnceLock<IntCounter> = OnceLock::new();

/// Messages dropped (lookup failures, full queue).
pub static MESSAGES_DROPPED: OnceLock<IntCounterVec> = OnceLock::new();

/// Socket reconnect attempts.
pub static PLATFORM_RECONNECTS: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Karma ledger
// ========================================================================

/// Applied karma deltas by direction.
pub static KARMA_UPDATES: OnceLock<IntCounterVec> = OnceLock::new();

/// Suppressed karma deltas by reason.
pub static KARMA_SUPPRESSED: OnceLock<IntCounterVec> = OnceLock::new();

/// Karma notices posted.
pub static NOTIFICATIONS_SENT: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Commands
// ========================================================================

pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize the Prometheus metrics registry.
///
/// Call at startup before any metrics are recorded; later calls are no-ops.
/// Until then every `record_*` helper does nothing.
pub fn init() {
    INIT.call_once(register_all);
}

fn register_all() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(MESSAGES_RECEIVED, IntCounter::new("karmabot_messages_received_total", "Message events received"));
    register!(MESSAGES_DROPPED, IntCounterVec::new(Opts::new("karmabot_messages_dropped_total", "Messages dropped before processing finished"), &["reason"]));
    register!(PLATFORM_RECONNECTS, IntCounter::new("karmabot_platform_reconnects_total", "Socket reconnect attempts"));

    register!(KARMA_UPDATES, IntCounterVec::new(Opts::new("karmabot_karma_updates_total", "Applied karma deltas"), &["direction"]));
    register!(KARMA_SUPPRESSED, IntCounterVec::new(Opts::new("karmabot_karma_suppressed_total", "Suppressed karma deltas"), &["reason"]));
    register!(NOTIFICATIONS_SENT, IntCounter::new("karmabot_notifications_sent_total", "Karma notices posted"));

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("karmabot_command_total", "Commands processed by group and operation"), &["group", "operation"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("karmabot_command_duration_seconds", "Command latency by group and operation")
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["group", "operation"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("karmabot_command_errors_total", "Command error replies by group and code"), &["group", "error"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record an inbound message event.
#[inline]
pub fn record_message() {
    if let Some(c) = MESSAGES_RECEIVED.get() {
        c.inc();
    }
}

/// Record a dropped message.
#[inline]
pub fn record_dropped(reason: &str) {
    if let Some(c) = MESSAGES_DROPPED.get() {
        c.with_label_values(&[reason]).inc();
    }
}

/// Record a socket reconnect attempt.
#[inline]
pub fn record_reconnect() {
    if let Some(c) = PLATFORM_RECONNECTS.get() {
        c.inc();
    }
}

/// Record an applied karma delta.
#[inline]
pub fn record_karma_update(delta: i64) {
    let direction = if delta >= 0 { "up" } else { "down" };
    if let Some(c) = KARMA_UPDATES.get() {
        c.with_label_values(&[direction]).inc();
    }
}

/// Record a suppressed karma delta (`cooldown` or `self`).
#[inline]
pub fn record_suppressed(reason: &str) {
    if let Some(c) = KARMA_SUPPRESSED.get() {
        c.with_label_values(&[reason]).inc();
    }
}

/// Record a posted karma notice.
#[inline]
pub fn record_notification() {
    if let Some(c) = NOTIFICATIONS_SENT.get() {
        c.inc();
    }
}

/// Record a command execution with latency.
#[inline]
pub fn record_command(group: &str, operation: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[group, operation]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[group, operation]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(group: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[group, error]).inc();
    }
}
