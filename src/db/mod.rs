//! Database module for persistent storage.
//!
//! Provides async SQLite database access using SQLx for:
//! - The karma ledger (per-channel word scores, global aggregation, ranks)
//! - Word aliases
//! - Channel administrators
//! - Channel settings
//!
//! Every statement is parameterized; no SQL is assembled from user text.

mod admins;
mod aliases;
mod karma;
mod settings;

pub use admins::{AdminRecord, AdminRepository};
pub use aliases::{AliasOutcome, AliasRepository};
pub use karma::{KarmaRepository, KarmaUpdate, RankEntry};
pub use settings::{ChannelSettings, Setting, SettingsRepository};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
    #[error("migration error: {0}")]
    Migration(sqlx::migrate::MigrateError),
    #[error("integrity check failed: {0}")]
    Integrity(String),
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout - a stuck writer must not stall the event loop forever.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Open (or create) the database, running migrations if needed.
    ///
    /// `":memory:"` opens a private in-memory database, used by tests.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            // Uniquely named shared-cache memory database per call.
            // `file::memory:` would collide across parallel tests.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:karmabot-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                // Closing the only connection would drop the in-memory database
                .idle_timeout(None)
                .max_lifetime(None)
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        Self::run_migrations(&pool).await?;

        // WAL lets rank/get queries read while a karma update is being written
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;

        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&pool)
            .await?;

        let integrity_result: String = sqlx::query_scalar("PRAGMA integrity_check")
            .fetch_one(&pool)
            .await?;

        if integrity_result != "ok" {
            tracing::error!(
                integrity_check = %integrity_result,
                "Database integrity check FAILED - corruption detected!"
            );
            return Err(DbError::Integrity(integrity_result));
        }

        info!("Database integrity check passed");

        Ok(Self { pool })
    }

    /// Get reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection, waiting for in-flight statements.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database closed");
    }

    /// Run embedded migrations.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(DbError::Migration)?;

        info!("Database migrations checked/applied");
        Ok(())
    }

    /// Get karma ledger repository.
    pub fn karma(&self) -> KarmaRepository<'_> {
        KarmaRepository::new(&self.pool)
    }

    /// Get alias repository.
    pub fn aliases(&self) -> AliasRepository<'_> {
        AliasRepository::new(&self.pool)
    }

    /// Get admin repository.
    pub fn admins(&self) -> AdminRepository<'_> {
        AdminRepository::new(&self.pool)
    }

    /// Get settings repository.
    pub fn settings(&self) -> SettingsRepository<'_> {
        SettingsRepository::new(&self.pool)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Sqlx(err)
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err)
    }
}
