//! Channel administrator repository.
//!
//! User ids are stored lower-cased; callers may pass either case.

use crate::db::DbError;
use sqlx::SqlitePool;

/// A channel administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRecord {
    pub user_id: String,
    pub added_by: String,
    pub added_at: i64,
}

/// Repository for admin operations.
pub struct AdminRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Admins of a channel in the order they were added.
    pub async fn list(&self, channel: &str) -> Result<Vec<AdminRecord>, DbError> {
        let rows = sqlx::query_as::<_, (String, String, i64)>(
            r#"
            SELECT user_id, added_by, added_at
            FROM admins
            WHERE channel = ?
            ORDER BY added_at ASC, user_id ASC
            "#,
        )
        .bind(channel)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, added_by, added_at)| AdminRecord {
                user_id,
                added_by,
                added_at,
            })
            .collect())
    }

    /// Check whether `user_id` administers `channel`.
    pub async fn is_admin(&self, channel: &str, user_id: &str) -> Result<bool, DbError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE channel = ? AND user_id = ?")
                .bind(channel)
                .bind(user_id.to_lowercase())
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Number of admins in a channel.
    pub async fn count(&self, channel: &str) -> Result<i64, DbError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE channel = ?")
            .bind(channel)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Add an admin. Returns `false` if the user already was one.
    pub async fn add(&self, channel: &str, user_id: &str, added_by: &str) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO admins (channel, user_id, added_by, added_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (channel, user_id) DO NOTHING
            "#,
        )
        .bind(channel)
        .bind(user_id.to_lowercase())
        .bind(added_by.to_lowercase())
        .bind(chrono::Utc::now().timestamp())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add the first admin of a channel.
    ///
    /// Succeeds only while the channel has no admins; the emptiness check and
    /// the insert are one statement, so two racing bootstraps cannot both win.
    pub async fn bootstrap(
        &self,
        channel: &str,
        user_id: &str,
        added_by: &str,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO admins (channel, user_id, added_by, added_at)
            SELECT ?, ?, ?, ?
            WHERE NOT EXISTS (SELECT 1 FROM admins WHERE channel = ?)
            "#,
        )
        .bind(channel)
        .bind(user_id.to_lowercase())
        .bind(added_by.to_lowercase())
        .bind(chrono::Utc::now().timestamp())
        .bind(channel)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove an admin. Returns whether a row was removed.
    pub async fn remove(&self, channel: &str, user_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM admins WHERE channel = ? AND user_id = ?")
            .bind(channel)
            .bind(user_id.to_lowercase())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[tokio::test]
    async fn test_bootstrap_only_when_empty() {
        let db = Database::new(":memory:").await.unwrap();
        let admins = db.admins();

        assert!(admins.bootstrap("general", "U1", "U1").await.unwrap());
        assert!(!admins.bootstrap("general", "U2", "U2").await.unwrap());
        assert_eq!(admins.count("general").await.unwrap(), 1);

        // Each channel bootstraps independently
        assert!(admins.bootstrap("random", "U2", "U2").await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_are_case_insensitive() {
        let db = Database::new(":memory:").await.unwrap();
        let admins = db.admins();
        admins.bootstrap("general", "U1ABC", "U1ABC").await.unwrap();

        assert!(admins.is_admin("general", "u1abc").await.unwrap());
        assert!(admins.is_admin("general", "U1ABC").await.unwrap());
        assert!(!admins.is_admin("random", "u1abc").await.unwrap());

        let list = admins.list("general").await.unwrap();
        assert_eq!(list[0].user_id, "u1abc");
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let db = Database::new(":memory:").await.unwrap();
        let admins = db.admins();
        admins.bootstrap("general", "u1", "u1").await.unwrap();

        assert!(admins.add("general", "u2", "u1").await.unwrap());
        assert!(!admins.add("general", "U2", "u1").await.unwrap());
        assert_eq!(admins.count("general").await.unwrap(), 2);

        assert!(admins.remove("general", "u2").await.unwrap());
        assert!(!admins.remove("general", "u2").await.unwrap());

        let list = admins.list("general").await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].added_by, "u1");
    }
}
