// SQLite OrderedStore Implementation

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::SqlitePool;
use tracing::trace;
use waitroom_core::error::{AppError, Result};
use waitroom_core::port::OrderedStore;

// Helper to convert sqlx::Error to AppError with structured information.
// Every store failure is StoreUnavailable; the message keeps the cause.
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            // SQLite error codes: https://www.sqlite.org/rescode.html
            match db_err.code().as_deref() {
                Some("5") => AppError::StoreUnavailable(format!(
                    "Database locked (SQLITE_BUSY): {}",
                    db_err.message()
                )),
                Some("13") => {
                    AppError::StoreUnavailable(format!("Database full: {}", db_err.message()))
                }
                Some(code) => AppError::StoreUnavailable(format!(
                    "Database error [{}]: {}",
                    code,
                    db_err.message()
                )),
                None => AppError::StoreUnavailable(format!("Database error: {}", db_err.message())),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            AppError::StoreUnavailable(format!("Connection pool unavailable: {}", err))
        }
        _ => {
            // Connection, protocol, decode errors
            AppError::StoreUnavailable(err.to_string())
        }
    }
}

/// Sorted sets stored as rows of `sorted_set_members`.
///
/// Order is `(score, seq)` where `seq` is the row's insertion sequence.
pub struct SqliteOrderedStore {
    pool: SqlitePool,
}

impl SqliteOrderedStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderedStore for SqliteOrderedStore {
    async fn insert_if_absent(&self, key: &str, member: &str, score: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO sorted_set_members (key, member, score)
            VALUES (?, ?, ?)
            ON CONFLICT (key, member) DO NOTHING
            "#,
        )
        .bind(key)
        .bind(member)
        .bind(score)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn upsert(&self, key: &str, member: &str, score: i64) -> Result<()> {
        // REPLACE deletes the old row, so the member gets a fresh seq
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO sorted_set_members (key, member, score)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(key)
        .bind(member)
        .bind(score)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn rank_of(&self, key: &str, member: &str) -> Result<Option<u64>> {
        let rank: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT (
                SELECT COUNT(*) FROM sorted_set_members o
                WHERE o.key = m.key
                  AND (o.score < m.score OR (o.score = m.score AND o.seq < m.seq))
            )
            FROM sorted_set_members m
            WHERE m.key = ? AND m.member = ?
            "#,
        )
        .bind(key)
        .bind(member)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rank.map(|r| r as u64))
    }

    async fn pop_lowest(&self, key: &str, count: u64) -> Result<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        // Single statement: selection and removal happen atomically
        let mut rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            DELETE FROM sorted_set_members
            WHERE seq IN (
                SELECT seq FROM sorted_set_members
                WHERE key = ?
                ORDER BY score ASC, seq ASC
                LIMIT ?
            )
            RETURNING member, score, seq
            "#,
        )
        .bind(key)
        .bind(i64::try_from(count).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        // RETURNING order is unspecified
        rows.sort_by_key(|(_, score, seq)| (*score, *seq));

        trace!(key = %key, requested = count, popped = rows.len(), "pop_lowest");

        Ok(rows.into_iter().map(|(member, _, _)| member).collect())
    }

    async fn cardinality(&self, key: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sorted_set_members WHERE key = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count as u64)
    }

    fn scan_keys<'a>(&'a self, pattern: &'a str) -> BoxStream<'a, Result<String>> {
        // SQLite GLOB: `*`, `?` and `[...]`, case-sensitive
        sqlx::query_scalar::<sqlx::Sqlite, String>(
            "SELECT DISTINCT key FROM sorted_set_members WHERE key GLOB ?",
        )
        .bind(pattern)
        .fetch(&self.pool)
        .map(|row| row.map_err(map_sqlx_error))
        .boxed()
    }
}
