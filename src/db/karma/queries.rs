//! Karma repository for database queries.

use super::models::{KarmaUpdate, RankEntry};
use crate::db::{DbError, Setting};
use sqlx::SqlitePool;

/// Whether a score lands on the channel's notify threshold.
///
/// `every` is validated positive at settings-write time; anything else
/// falls back to notifying on every change.
pub(crate) fn should_notify(score: i64, every: i64) -> bool {
    let every = if every > 0 { every } else { 1 };
    score % every == 0
}

/// Repository for karma ledger operations.
pub struct KarmaRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> KarmaRepository<'a> {
    /// Create a new karma repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add `delta` to the score of `word` in `channel`, creating the entry at zero.
    ///
    /// The read-modify-write is a single upsert statement, so concurrent
    /// deltas to the same key serialize inside SQLite and none are lost.
    pub async fn apply_delta(
        &self,
        channel: &str,
        word: &str,
        delta: i64,
        actor: &str,
        timestamp: i64,
    ) -> Result<KarmaUpdate, DbError> {
        let mut tx = self.pool.begin().await?;

        let score: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO karma (channel, word, score, last_actor, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (channel, word) DO UPDATE SET
                score = score + excluded.score,
                last_actor = excluded.last_actor,
                updated_at = excluded.updated_at
            RETURNING score
            "#,
        )
        .bind(channel)
        .bind(word)
        .bind(delta)
        .bind(actor)
        .bind(timestamp)
        .fetch_one(&mut *tx)
        .await?;

        let every: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE channel = ? AND name = ?")
                .bind(channel)
                .bind(Setting::NotifyKarma.key())
                .fetch_optional(&mut *tx)
                .await?;

        tx.commit().await?;

        let every = every.and_then(|v| v.parse::<i64>().ok()).unwrap_or(1);

        Ok(KarmaUpdate {
            score,
            notify: should_notify(score, every),
        })
    }

    /// Current score, or `None` if the word was never scored in this channel.
    pub async fn current_score(&self, channel: &str, word: &str) -> Result<Option<i64>, DbError> {
        let score = sqlx::query_scalar("SELECT score FROM karma WHERE channel = ? AND word = ?")
            .bind(channel)
            .bind(word)
            .fetch_optional(self.pool)
            .await?;

        Ok(score)
    }

    /// Sum of the word's score across all channels.
    ///
    /// The literal word is alias-resolved per channel before summing, since
    /// the same word may point at different ledger keys in different channels.
    pub async fn global_score(&self, word: &str) -> Result<i64, DbError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(k.score), 0)
            FROM karma k
            WHERE k.word = COALESCE(
                (SELECT a.target FROM aliases a WHERE a.channel = k.channel AND a.source = ?),
                ?
            )
            "#,
        )
        .bind(word)
        .bind(word)
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }

    /// Channel ranking by score, highest first; ties ordered by word.
    ///
    /// `limit` of `None` returns every entry.
    pub async fn rank(&self, channel: &str, limit: Option<u32>) -> Result<Vec<RankEntry>, DbError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT word, score
            FROM karma
            WHERE channel = ?
            ORDER BY score DESC, word ASC
            LIMIT ?
            "#,
        )
        .bind(channel)
        .bind(limit.map(i64::from).unwrap_or(-1))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(word, score)| RankEntry { word, score })
            .collect())
    }

    /// Ranking of words summed across every channel.
    pub async fn global_rank(&self, limit: Option<u32>) -> Result<Vec<RankEntry>, DbError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT word, SUM(score) AS total
            FROM karma
            GROUP BY word
            ORDER BY total DESC, word ASC
            LIMIT ?
            "#,
        )
        .bind(limit.map(i64::from).unwrap_or(-1))
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(word, score)| RankEntry { word, score })
            .collect())
    }
}
