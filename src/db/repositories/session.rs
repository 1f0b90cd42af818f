//! Session repository
//!
//! Database operations for authentication sessions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Session;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    async fn create(&self, session: &Session) -> Result<()>;

    /// Get a session by its token
    async fn get(&self, token: &str) -> Result<Option<Session>>;

    /// Delete a session by its token
    async fn delete(&self, token: &str) -> Result<()>;

    /// Delete all expired sessions, returning the number removed
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based session repository implementation
pub struct SqlxSessionRepository {
    pool: SqlitePool,
}

impl SqlxSessionRepository {
    /// Create a new SQLx session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create session")?;
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT id, user_id, expires_at, created_at FROM sessions WHERE id = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get session")?;

        Ok(row.map(|r| Session {
            id: r.get("id"),
            user_id: r.get("user_id"),
            expires_at: r.get("expires_at"),
            created_at: r.get("created_at"),
        }))
    }

    async fn delete(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::{Duration, Utc};

    async fn setup() -> (SqlitePool, SqlxSessionRepository) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        sqlx::query(
            "INSERT INTO users (email, username, first_name, last_name, password_hash) VALUES ('a@example.com', 'a', 'A', 'A', 'h')",
        )
        .execute(&pool)
        .await
        .expect("Failed to create user");

        (pool.clone(), SqlxSessionRepository::new(pool))
    }

    fn session(token: &str, hours: i64) -> Session {
        Session {
            id: token.to_string(),
            user_id: 1,
            expires_at: Utc::now() + Duration::hours(hours),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let (_pool, repo) = setup().await;

        repo.create(&session("tok", 1)).await.expect("Create failed");

        let found = repo.get("tok").await.expect("Get failed").expect("Missing");
        assert_eq!(found.user_id, 1);

        repo.delete("tok").await.expect("Delete failed");
        assert!(repo.get("tok").await.expect("Get failed").is_none());
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let (_pool, repo) = setup().await;

        repo.create(&session("live", 1)).await.unwrap();
        repo.create(&session("dead", -1)).await.unwrap();

        let removed = repo.delete_expired().await.expect("Cleanup failed");
        assert_eq!(removed, 1);
        assert!(repo.get("live").await.unwrap().is_some());
        assert!(repo.get("dead").await.unwrap().is_none());
    }
}
