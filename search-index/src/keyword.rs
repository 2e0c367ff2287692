//! # Keyword Index (C2): SQLite FTS5
//!
//! BM25 ranking via FTS5's built-in `rank`/`bm25()` (§4.5, §9 C). The score
//! this returns is treated as opaque and monotone-better by everyone above
//! this crate; `bm25()` itself is lower-is-better, so it is negated here to
//! match the "higher is better" convention `KeywordHit` promises.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, instrument};

use search_traits::connector::SyncContext;
use search_traits::{ChunkId, KeywordHit, KeywordIndex, TraitError};

use crate::error::IndexError;

pub struct SqliteKeywordIndex {
    pool: SqlitePool,
}

impl SqliteKeywordIndex {
    /// Opens the index against `database_url` (e.g. `sqlite::memory:` or a
    /// file path), running its FTS5 migration.
    pub async fn open(database_url: &str) -> Result<Self, IndexError> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(IndexError::Database)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| IndexError::Migration(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// FTS5 MATCH queries treat `query` as a small grammar (AND/OR/NOT,
/// column filters, `"..."` phrases). A search box's free text is none of
/// that; quoting each whitespace-separated term as its own phrase makes
/// arbitrary user input safe to pass through.
fn to_match_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl KeywordIndex for SqliteKeywordIndex {
    #[instrument(skip(self, _ctx, text), fields(chunk_id = %chunk_id))]
    async fn index(&self, _ctx: &SyncContext, chunk_id: ChunkId, text: &str) -> search_traits::Result<()> {
        sqlx::query::<Sqlite>("DELETE FROM chunk_fts WHERE chunk_id = ?")
            .bind(chunk_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(IndexError::Database)?;

        sqlx::query::<Sqlite>("INSERT INTO chunk_fts (chunk_id, content) VALUES (?, ?)")
            .bind(chunk_id.as_str())
            .bind(text)
            .execute(&self.pool)
            .await
            .map_err(IndexError::Database)?;

        debug!("indexed chunk");
        Ok(())
    }

    async fn delete(&self, _ctx: &SyncContext, chunk_id: ChunkId) -> search_traits::Result<()> {
        sqlx::query::<Sqlite>("DELETE FROM chunk_fts WHERE chunk_id = ?")
            .bind(chunk_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(IndexError::Database)?;
        Ok(())
    }

    #[instrument(skip(self, _ctx, query), fields(query_len = query.len()))]
    async fn search(
        &self,
        _ctx: &SyncContext,
        query: &str,
        limit: usize,
    ) -> search_traits::Result<Vec<KeywordHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let match_query = to_match_query(query);

        let rows: Vec<(String, f64)> = sqlx::query_as(
            "SELECT chunk_id, bm25(chunk_fts) AS score FROM chunk_fts
             WHERE chunk_fts MATCH ? ORDER BY rank LIMIT ?",
        )
        .bind(match_query)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(IndexError::Database)?;

        rows.into_iter()
            .map(|(id, score)| {
                ChunkId::from_string(&id)
                    .map(|chunk_id| KeywordHit {
                        chunk_id,
                        score: -score,
                    })
                    .map_err(|e| TraitError::from(IndexError::InvalidInput(e.to_string())))
            })
            .collect()
    }

    async fn close(&self) -> search_traits::Result<()> {
        Ok(())
    }
}
