//! HTTP server for Prometheus metrics endpoint.
//!
//! Runs on a separate tokio task and serves `/metrics` for Prometheus scraping.

use axum::{Router, routing::get};
use std::net::SocketAddr;

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Build the metrics router.
pub fn router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Run the HTTP server for Prometheus metrics.
///
/// Binds to `0.0.0.0:port` and serves the `/metrics` endpoint.
/// This is a long-running task that should be spawned in the background.
pub async fn run_http_server(port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind metrics HTTP server");
            return;
        }
    };
    tracing::info!(%addr, "Prometheus HTTP server listening");

    if let Err(e) = axum::serve(listener, router()).await {
        tracing::error!(error = %e, "HTTP server error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_endpoint_serves_text() {
        crate::metrics::init();
        crate::metrics::record_message();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router()).await;
        });

        let body = reqwest::get(format!("http://{}/metrics", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("karmabot_messages_received_total"));
    }
}
