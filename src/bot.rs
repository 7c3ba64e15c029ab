//! Bot orchestrator.
//!
//! [`Bot`] owns everything a message needs: the ledger store, the command
//! processor, the cooldown tracker and the platform handle. Events are
//! consumed one at a time from a bounded queue, so messages of a channel are
//! handled in arrival order.
//!
//! A message is either a command (`kb get karma pizza`), answered with a
//! reply, or free text scanned for karma tokens. Each token becomes one or
//! more deltas; every delta is alias-resolved, checked against self-karma
//! and the cooldown, applied, and possibly announced.

use crate::commands::{CommandProcessor, now};
use crate::config::BotConfig;
use crate::cooldown::CooldownTracker;
use crate::db::Database;
use crate::error::BotError;
use crate::metrics;
use crate::notify::karma_notice;
use crate::platform::{MessageEvent, Platform, PlatformError, PlatformEvent};
use crate::telemetry::spans;
use kb_proto::{Mention, karma_tokens, mention_key, normalize, parse_command, parse_mention};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, warn};

/// The bot context.
pub struct Bot {
    db: Database,
    commands: CommandProcessor,
    cooldown: Arc<CooldownTracker>,
    platform: Arc<dyn Platform>,
    prefix: String,
    /// The bot's own user id, lower-cased.
    bot_user: String,
}

impl Bot {
    /// Build the bot and authenticate against the platform.
    ///
    /// Rejected credentials surface as [`BotError::AuthFailure`].
    pub async fn new(
        config: &BotConfig,
        db: Database,
        platform: Arc<dyn Platform>,
    ) -> Result<Self, BotError> {
        let bot_user = platform.bot_user_id().await.map_err(auth_error)?;
        info!(bot_user = %bot_user, "bot identity resolved");

        Ok(Self {
            commands: CommandProcessor::new(db.clone(), config.prefix.clone(), config.rank_limit),
            cooldown: Arc::new(CooldownTracker::new(config.cooldown())),
            db,
            platform,
            prefix: config.prefix.clone(),
            bot_user: bot_user.to_lowercase(),
        })
    }

    /// Shared handle to the cooldown tracker, for the pruning task.
    pub fn cooldown(&self) -> Arc<CooldownTracker> {
        Arc::clone(&self.cooldown)
    }

    /// Consume events until the queue closes or credentials are rejected.
    pub async fn run(&self, mut events: mpsc::Receiver<PlatformEvent>) -> Result<(), BotError> {
        info!("bot event loop started");

        while let Some(event) = events.recv().await {
            match event {
                PlatformEvent::Message(message) => self.handle_message(&message).await,
                PlatformEvent::Error(error) => warn!(error = %error, "platform error"),
                PlatformEvent::InvalidAuth(reason) => return Err(BotError::AuthFailure(reason)),
            }
        }

        info!("event queue closed, bot stopping");
        Ok(())
    }

    /// Handle one inbound chat message.
    pub async fn handle_message(&self, event: &MessageEvent) {
        if let Some(subtype) = &event.subtype {
            debug!(subtype = %subtype, "ignoring message subtype");
            return;
        }
        if event.user.is_empty() || event.user.to_lowercase() == self.bot_user {
            return;
        }

        metrics::record_message();
        let span = spans::message(&event.channel, &event.user, &event.ts);
        self.process_message(event).instrument(span).await
    }

    async fn process_message(&self, event: &MessageEvent) {
        let channel = match self.platform.channel_name(&event.channel).await {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "channel lookup failed, dropping message");
                metrics::record_dropped("channel_lookup");
                return;
            }
        };

        let text = normalize(&event.text);

        if let Some(command) = parse_command(&text, &self.prefix) {
            let reply = self.commands.process(&channel, &event.user, &command).await;
            if !reply.is_empty()
                && let Err(e) = self
                    .platform
                    .send_message(&event.channel, &reply, event.thread_ts.as_deref())
                    .await
            {
                warn!(error = %e, "failed to post command reply");
            }
            return;
        }

        let actor = event.user.to_lowercase();

        for token in karma_tokens(&text) {
            let delta = token.modifier.delta();

            let result = match parse_mention(token.candidate) {
                Some(Mention::Here) => self.score_here(event, &channel, &actor, delta).await,
                Some(Mention::User(id)) if id == actor => {
                    debug!(actor = %actor, "self karma via mention ignored");
                    metrics::record_suppressed("self");
                    Ok(())
                }
                Some(Mention::User(id)) => match self.user_word(&channel, id).await {
                    Ok(word) => self.score(event, &channel, &actor, &word, delta).await,
                    Err(e) => Err(e),
                },
                None => self.score(event, &channel, &actor, token.candidate, delta).await,
            };

            if let Err(e) = result {
                warn!(candidate = %token.candidate, delta, error = %e, "karma delta aborted");
            }
        }
    }

    /// Ledger word for a user: their mention key when it has an alias,
    /// otherwise their display name.
    async fn user_word(&self, channel: &str, user_id: &str) -> Result<String, BotError> {
        let key = mention_key(user_id);
        if self.db.aliases().get(channel, &key).await?.is_some() {
            return Ok(key);
        }
        Ok(self.platform.display_name(user_id).await?)
    }

    /// Apply `delta` to every channel member except the actor.
    async fn score_here(
        &self,
        event: &MessageEvent,
        channel: &str,
        actor: &str,
        delta: i64,
    ) -> Result<(), BotError> {
        let members = self.platform.channel_members(&event.channel).await?;
        debug!(members = members.len(), "broadcast karma");

        for member in members {
            let member = member.to_lowercase();
            if member == actor || member == self.bot_user {
                continue;
            }

            let outcome = match self.user_word(channel, &member).await {
                Ok(word) => self.score(event, channel, actor, &word, delta).await,
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                warn!(member = %member, error = %e, "broadcast karma delta aborted");
            }
        }
        Ok(())
    }

    /// Resolve, gate, apply and announce a single delta.
    async fn score(
        &self,
        event: &MessageEvent,
        channel: &str,
        actor: &str,
        raw: &str,
        delta: i64,
    ) -> Result<(), BotError> {
        let aliases = self.db.aliases();
        let word = aliases.resolve(channel, raw).await?;

        if let Some(own) = aliases.get(channel, &mention_key(actor)).await?
            && (own == raw || own == word)
        {
            debug!(actor = %actor, word = %word, "self karma via alias ignored");
            metrics::record_suppressed("self");
            return Ok(());
        }

        if !self.cooldown.allow(channel, &word, actor) {
            metrics::record_suppressed("cooldown");
            return Ok(());
        }

        let update = self
            .db
            .karma()
            .apply_delta(channel, &word, delta, actor, now())
            .await?;
        metrics::record_karma_update(delta);
        info!(channel = %channel, word = %word, delta, score = update.score, "karma updated");

        if !update.notify {
            return Ok(());
        }

        let settings = self.db.settings().load(channel).await?;
        let global = self.db.karma().global_score(&word).await?;

        if let Some(notice) = karma_notice(&word, delta, update, &settings, global) {
            match self
                .platform
                .send_message(&event.channel, &notice, Some(event.reply_thread()))
                .await
            {
                Ok(()) => metrics::record_notification(),
                Err(e) => warn!(word = %word, error = %e, "karma notice not posted"),
            }
        }
        Ok(())
    }
}

fn auth_error(e: PlatformError) -> BotError {
    match e {
        PlatformError::InvalidAuth(reason) => BotError::AuthFailure(reason),
        other => BotError::Platform(other),
    }
}
