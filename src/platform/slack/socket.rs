//! Socket Mode connection loop.
//!
//! Opens a websocket via `apps.connections.open`, acknowledges every
//! envelope and forwards message events to the bot. Disconnects and socket
//! errors reconnect with capped exponential backoff; rejected credentials
//! end the loop.

use super::SlackClient;
use super::api::{SocketAck, SocketEnvelope};
use crate::platform::{MessageEvent, PlatformError, PlatformEvent};
use crate::telemetry::spans;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{Instrument, debug, error, info, warn};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Why a socket session ended without an error.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Reconnect,
    /// The event receiver is gone.
    Stop,
}

/// What an envelope asks of the connection loop.
#[derive(Debug, PartialEq, Eq)]
enum Routed {
    Hello,
    Disconnect(String),
    Message(MessageEvent),
    Ignore,
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

fn route(envelope: SocketEnvelope) -> Routed {
    match envelope.kind.as_str() {
        "hello" => Routed::Hello,
        "disconnect" => Routed::Disconnect(envelope.reason.unwrap_or_default()),
        "events_api" => envelope
            .payload
            .and_then(|p| p.event)
            .and_then(|e| e.into_message())
            .map_or(Routed::Ignore, Routed::Message),
        _ => Routed::Ignore,
    }
}

/// Run Socket Mode until credentials are rejected or `events` is closed.
pub async fn run_socket_mode(client: Arc<SlackClient>, events: mpsc::Sender<PlatformEvent>) {
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt: u32 = 0;

    'reconnect_loop: loop {
        attempt = attempt.saturating_add(1);

        let outcome = session(&client, &events, &mut backoff)
            .instrument(spans::socket(attempt))
            .await;

        match outcome {
            Ok(SessionEnd::Stop) => {
                info!("event receiver closed, stopping socket");
                break 'reconnect_loop;
            }
            Ok(SessionEnd::Reconnect) => {}
            Err(PlatformError::InvalidAuth(reason)) => {
                error!(reason = %reason, "credentials rejected, not reconnecting");
                let _ = events.send(PlatformEvent::InvalidAuth(reason)).await;
                break 'reconnect_loop;
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "socket session failed");
                if events.send(PlatformEvent::Error(e.to_string())).await.is_err() {
                    break 'reconnect_loop;
                }
            }
        }

        if events.is_closed() {
            break 'reconnect_loop;
        }

        crate::metrics::record_reconnect();
        info!(delay_secs = backoff.as_secs(), "reconnecting");
        tokio::time::sleep(backoff).await;
        backoff = next_backoff(backoff);
    }
}

async fn session(
    client: &SlackClient,
    events: &mpsc::Sender<PlatformEvent>,
    backoff: &mut Duration,
) -> Result<SessionEnd, PlatformError> {
    let url = client.open_socket_url().await?;
    let (mut ws, _) = connect_async(url.as_str()).await?;
    info!("socket connected");

    while let Some(frame) = ws.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(frame) => {
                info!(frame = ?frame, "socket closed by server");
                return Ok(SessionEnd::Reconnect);
            }
            _ => continue,
        };

        let envelope: SocketEnvelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "undecodable socket frame");
                continue;
            }
        };

        if let Some(envelope_id) = envelope.envelope_id.as_deref() {
            let ack = serde_json::to_string(&SocketAck { envelope_id })?;
            ws.send(Message::Text(ack)).await?;
        }

        match route(envelope) {
            Routed::Hello => {
                debug!("socket hello");
                *backoff = INITIAL_BACKOFF;
            }
            Routed::Disconnect(reason) => {
                info!(reason = %reason, "disconnect requested");
                let _ = ws.close(None).await;
                return Ok(SessionEnd::Reconnect);
            }
            Routed::Message(message) => match events.try_send(PlatformEvent::Message(message)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!("event queue full, dropping message");
                    crate::metrics::record_dropped("queue_full");
                }
                Err(TrySendError::Closed(_)) => return Ok(SessionEnd::Stop),
            },
            Routed::Ignore => {}
        }
    }

    Ok(SessionEnd::Reconnect)
}
