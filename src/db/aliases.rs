//! Alias repository.
//!
//! An alias maps a typed word (the source) onto the ledger key that
//! actually receives its karma (the target), within one channel.
//! Resolution is a single hop: a target can never itself be a source.

use crate::db::DbError;
use sqlx::SqlitePool;

/// Result of an alias creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasOutcome {
    /// The alias was stored.
    Created,
    /// The source already has an alias; nothing changed.
    Exists { target: String },
    /// Storing it would chain aliases (or map a word onto itself);
    /// `conflict` is the word already taking part in another alias.
    Rejected { conflict: String },
}

/// Repository for alias operations.
pub struct AliasRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AliasRepository<'a> {
    /// Create a new alias repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a word to its ledger key in `channel`.
    pub async fn resolve(&self, channel: &str, word: &str) -> Result<String, DbError> {
        Ok(self
            .get(channel, word)
            .await?
            .unwrap_or_else(|| word.to_string()))
    }

    /// Alias configured for `source`, if any.
    pub async fn get(&self, channel: &str, source: &str) -> Result<Option<String>, DbError> {
        let target = sqlx::query_scalar("SELECT target FROM aliases WHERE channel = ? AND source = ?")
            .bind(channel)
            .bind(source)
            .fetch_optional(self.pool)
            .await?;

        Ok(target)
    }

    /// All sources that resolve to `target` in `channel`, sorted.
    pub async fn sources_for(&self, channel: &str, target: &str) -> Result<Vec<String>, DbError> {
        let sources = sqlx::query_scalar(
            "SELECT source FROM aliases WHERE channel = ? AND target = ? ORDER BY source",
        )
        .bind(channel)
        .bind(target)
        .fetch_all(self.pool)
        .await?;

        Ok(sources)
    }

    /// Store `source -> target` unless it would break single-hop resolution.
    ///
    /// Checks and insert share one transaction so two racing creations
    /// cannot both pass the chain check.
    pub async fn set(
        &self,
        channel: &str,
        source: &str,
        target: &str,
        created_by: &str,
    ) -> Result<AliasOutcome, DbError> {
        if source == target {
            return Ok(AliasOutcome::Rejected {
                conflict: source.to_string(),
            });
        }

        let mut tx = self.pool.begin().await?;

        let source_is_target: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM aliases WHERE channel = ? AND target = ?")
                .bind(channel)
                .bind(source)
                .fetch_one(&mut *tx)
                .await?;

        if source_is_target > 0 {
            return Ok(AliasOutcome::Rejected {
                conflict: source.to_string(),
            });
        }

        let target_is_source: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM aliases WHERE channel = ? AND source = ?")
                .bind(channel)
                .bind(target)
                .fetch_one(&mut *tx)
                .await?;

        if target_is_source > 0 {
            return Ok(AliasOutcome::Rejected {
                conflict: target.to_string(),
            });
        }

        let existing: Option<String> =
            sqlx::query_scalar("SELECT target FROM aliases WHERE channel = ? AND source = ?")
                .bind(channel)
                .bind(source)
                .fetch_optional(&mut *tx)
                .await?;

        if let Some(target) = existing {
            return Ok(AliasOutcome::Exists { target });
        }

        sqlx::query(
            r#"
            INSERT INTO aliases (channel, source, target, created_by, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(channel)
        .bind(source)
        .bind(target)
        .bind(created_by)
        .bind(chrono::Utc::now().timestamp())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(AliasOutcome::Created)
    }

    /// Remove the `source -> target` alias. Returns whether a row was removed.
    pub async fn delete(&self, channel: &str, source: &str, target: &str) -> Result<bool, DbError> {
        let result =
            sqlx::query("DELETE FROM aliases WHERE channel = ? AND source = ? AND target = ?")
                .bind(channel)
                .bind(source)
                .bind(target)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
