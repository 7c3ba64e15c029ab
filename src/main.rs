//! karmabot - per-channel karma ledger for team chat.
//!
//! Connects to Slack over Socket Mode and keeps score of `word++` / `word--`.

use karmabot::bot::Bot;
use karmabot::config::{Config, validate};
use karmabot::db::Database;
use karmabot::platform::slack::{SlackClient, run_socket_mode};
use karmabot::{http, metrics};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Set to `json` for machine-readable logs.
const ENV_LOG_FORMAT: &str = "KARMABOT_LOG_FORMAT";

/// How often expired cooldown windows are dropped.
const COOLDOWN_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(ENV_LOG_FORMAT).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "karmabot.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {}",
            errors.len(),
            config_path
        ));
    }

    info!(
        prefix = %config.bot.prefix,
        cooldown_secs = config.bot.cooldown_secs,
        database = %config.database.path,
        "Starting karmabot"
    );

    // Counters are recorded even when the endpoint is disabled.
    metrics::init();
    let metrics_port = config.server.metrics_port;
    if metrics_port == 0 {
        info!("Metrics endpoint disabled");
    } else {
        tokio::spawn(async move {
            http::run_http_server(metrics_port).await;
        });
        info!(port = metrics_port, "Prometheus HTTP server started");
    }

    let db = Database::new(&config.database.path).await?;

    let slack = Arc::new(SlackClient::new(&config.slack)?);

    let bot = match Bot::new(&config.bot, db.clone(), slack.clone()).await {
        Ok(bot) => bot,
        Err(e) => {
            error!(error = %e, "Failed to start bot");
            db.close().await;
            return Err(e.into());
        }
    };

    // Cooldown pruning task
    {
        let cooldown = bot.cooldown();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(COOLDOWN_PRUNE_INTERVAL);
            loop {
                interval.tick().await;
                let removed = cooldown.prune();
                if removed > 0 {
                    tracing::debug!(removed = removed, "Expired cooldown windows pruned");
                }
            }
        });
    }

    let (tx, rx) = mpsc::channel(config.bot.event_buffer);
    let socket = tokio::spawn(run_socket_mode(Arc::clone(&slack), tx));

    let result = tokio::select! {
        result = bot.run(rx) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            Ok(())
        }
    };

    socket.abort();
    db.close().await;

    if let Err(e) = result {
        error!(error = %e, "Bot stopped with error");
        return Err(e.into());
    }

    info!("karmabot stopped");
    Ok(())
}
