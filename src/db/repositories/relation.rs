//! Relation repository (Relation Store)
//!
//! Database operations for the toggleable (subject, object) relations:
//! favorites, shopping cart entries and author subscriptions. All three are
//! stored in separate tables selected by `RelationKind` but share identical
//! access patterns, so one repository serves them all.
//!
//! Every relation table carries a UNIQUE index over (subject, object). That
//! index, not the application, is what guarantees at most one row per pair:
//! `insert` surfaces a unique-index violation as a distinct outcome so the
//! service layer can report a clean conflict instead of a raw database error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{Relation, RelationKind};

/// Relation repository trait
#[async_trait]
pub trait RelationRepository: Send + Sync {
    /// Check whether the (subject, object) pair exists
    async fn exists(&self, kind: RelationKind, subject_id: i64, object_id: i64) -> Result<bool>;

    /// Insert the pair. Returns `None` when the unique index rejected a
    /// duplicate, `Some` with the created relation otherwise.
    async fn insert(
        &self,
        kind: RelationKind,
        subject_id: i64,
        object_id: i64,
    ) -> Result<Option<Relation>>;

    /// Delete exactly the (subject, object) pair, returning the number of
    /// rows removed (0 or 1).
    async fn delete(&self, kind: RelationKind, subject_id: i64, object_id: i64) -> Result<u64>;

    /// All object ids related to the subject, ordered by insertion
    async fn objects_for(&self, kind: RelationKind, subject_id: i64) -> Result<Vec<i64>>;
}

/// SQLx-based relation repository implementation
pub struct SqlxRelationRepository {
    pool: SqlitePool,
}

impl SqlxRelationRepository {
    /// Create a new SQLx relation repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn RelationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl RelationRepository for SqlxRelationRepository {
    async fn exists(&self, kind: RelationKind, subject_id: i64, object_id: i64) -> Result<bool> {
        let sql = format!(
            "SELECT COUNT(*) as count FROM {} WHERE user_id = ? AND {} = ?",
            kind.table(),
            kind.object_column()
        );

        let row = sqlx::query(&sql)
            .bind(subject_id)
            .bind(object_id)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to check {} existence", kind))?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn insert(
        &self,
        kind: RelationKind,
        subject_id: i64,
        object_id: i64,
    ) -> Result<Option<Relation>> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO {} (user_id, {}, created_at) VALUES (?, ?, ?)",
            kind.table(),
            kind.object_column()
        );

        let result = sqlx::query(&sql)
            .bind(subject_id)
            .bind(object_id)
            .bind(now)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(Some(Relation {
                id: done.last_insert_rowid(),
                kind,
                subject_id,
                object_id,
                created_at: now,
            })),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to insert {}", kind)),
        }
    }

    async fn delete(&self, kind: RelationKind, subject_id: i64, object_id: i64) -> Result<u64> {
        // Only the exact pair is ever removed, never "the subject's first
        // relation of this kind"
        let sql = format!(
            "DELETE FROM {} WHERE user_id = ? AND {} = ?",
            kind.table(),
            kind.object_column()
        );

        let result = sqlx::query(&sql)
            .bind(subject_id)
            .bind(object_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete {}", kind))?;

        Ok(result.rows_affected())
    }

    async fn objects_for(&self, kind: RelationKind, subject_id: i64) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT {} as object_id FROM {} WHERE user_id = ? ORDER BY id",
            kind.object_column(),
            kind.table()
        );

        let rows = sqlx::query(&sql)
            .bind(subject_id)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to list {} objects", kind))?;

        Ok(rows.iter().map(|r| r.get("object_id")).collect())
    }
}
