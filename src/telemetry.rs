//! Telemetry utilities for command timing and message correlation.

use std::time::Instant;

use kb_proto::{Group, Operation};

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    group: Group,
    operation: Operation,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(group: Group, operation: Operation) -> Self {
        Self {
            group,
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(self.group.as_str(), self.operation.as_str(), duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for one inbound chat message.
    pub fn message(channel: &str, user: &str, ts: &str) -> Span {
        info_span!("message", channel = %channel, user = %user, ts = %ts)
    }

    /// Create a span for a command execution.
    pub fn command(group: &str, operation: &str, channel: &str) -> Span {
        info_span!("command", group = %group, operation = %operation, channel = %channel)
    }

    /// Create a span for one socket session.
    pub fn socket(attempt: u32) -> Span {
        info_span!("socket", attempt = attempt)
    }
}
