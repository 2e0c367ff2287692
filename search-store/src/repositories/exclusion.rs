//! Repository for `Exclusion` (spec §3). A tombstone: any future sync
//! producing a `RawDocument` matching `(source_id, uri)` must skip it
//! (§4.3 step 1, §8 invariant).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};

use search_traits::{DocumentId, ExclusionId, SourceId};

use crate::error::StoreError;
use crate::models::{Exclusion, ExclusionRow};
use crate::Result;

#[async_trait]
pub trait ExclusionRepository: Send + Sync {
    async fn exclude(
        &self,
        source_id: SourceId,
        document_id: Option<DocumentId>,
        uri: &str,
        reason: &str,
    ) -> Result<Exclusion>;

    /// Whether `(source_id, uri)` is currently excluded. This is the hot
    /// path the per-document pipeline's exclusion gate calls once per
    /// `RawDocument` (§4.3 step 1).
    async fn is_excluded(&self, source_id: SourceId, uri: &str) -> Result<bool>;

    async fn list_by_source(&self, source_id: SourceId) -> Result<Vec<Exclusion>>;
    async fn remove(&self, id: ExclusionId) -> Result<()>;
}

pub struct SqliteExclusionRepository {
    pool: SqlitePool,
}

impl SqliteExclusionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_exclusion(row: ExclusionRow) -> Result<Exclusion> {
    Ok(Exclusion {
        id: ExclusionId::from_string(&row.id).map_err(|e| StoreError::InvalidInput {
            field: "id".to_string(),
            message: e.to_string(),
        })?,
        source_id: SourceId::from_string(&row.source_id).map_err(|e| StoreError::InvalidInput {
            field: "source_id".to_string(),
            message: e.to_string(),
        })?,
        document_id: row
            .document_id
            .map(|s| {
                DocumentId::from_string(&s).map_err(|e| StoreError::InvalidInput {
                    field: "document_id".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?,
        uri: row.uri,
        reason: row.reason,
        excluded_at: DateTime::from_timestamp_millis(row.excluded_at).unwrap_or_default(),
    })
}

#[async_trait]
impl ExclusionRepository for SqliteExclusionRepository {
    async fn exclude(
        &self,
        source_id: SourceId,
        document_id: Option<DocumentId>,
        uri: &str,
        reason: &str,
    ) -> Result<Exclusion> {
        let id = ExclusionId::new();
        let now = Utc::now();
        sqlx::query::<Sqlite>(
            "INSERT INTO exclusions (id, source_id, document_id, uri, reason, excluded_at) VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(source_id, uri) DO UPDATE SET reason = excluded.reason, excluded_at = excluded.excluded_at",
        )
        .bind(id.as_str())
        .bind(source_id.as_str())
        .bind(document_id.map(|d| d.as_str()))
        .bind(uri)
        .bind(reason)
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(Exclusion {
            id,
            source_id,
            document_id,
            uri: uri.to_string(),
            reason: reason.to_string(),
            excluded_at: now,
        })
    }

    async fn is_excluded(&self, source_id: SourceId, uri: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM exclusions WHERE source_id = ? AND uri = ?",
        )
        .bind(source_id.as_str())
        .bind(uri)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn list_by_source(&self, source_id: SourceId) -> Result<Vec<Exclusion>> {
        let rows = sqlx::query_as::<_, ExclusionRow>(
            "SELECT * FROM exclusions WHERE source_id = ? ORDER BY excluded_at ASC",
        )
        .bind(source_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_exclusion).collect()
    }

    async fn remove(&self, id: ExclusionId) -> Result<()> {
        sqlx::query::<Sqlite>("DELETE FROM exclusions WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
