//! Repository for `SyncState` (spec §3). At most one row per source; the
//! orchestrator treats a missing row the same as an empty cursor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};

use search_traits::SourceId;

use crate::error::StoreError;
use crate::models::{SyncState, SyncStateRow};
use crate::Result;

#[async_trait]
pub trait SyncStateRepository: Send + Sync {
    async fn get(&self, source_id: SourceId) -> Result<Option<SyncState>>;
    async fn upsert(&self, state: &SyncState) -> Result<()>;
    async fn delete(&self, source_id: SourceId) -> Result<()>;
}

pub struct SqliteSyncStateRepository {
    pool: SqlitePool,
}

impl SqliteSyncStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_state(row: SyncStateRow) -> Result<SyncState> {
    Ok(SyncState {
        source_id: SourceId::from_string(&row.source_id).map_err(|e| StoreError::InvalidInput {
            field: "source_id".to_string(),
            message: e.to_string(),
        })?,
        cursor: row.cursor,
        last_sync: DateTime::from_timestamp_millis(row.last_sync).unwrap_or_default(),
    })
}

#[async_trait]
impl SyncStateRepository for SqliteSyncStateRepository {
    async fn get(&self, source_id: SourceId) -> Result<Option<SyncState>> {
        let row = sqlx::query_as::<_, SyncStateRow>("SELECT * FROM sync_states WHERE source_id = ?")
            .bind(source_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_state).transpose()
    }

    async fn upsert(&self, state: &SyncState) -> Result<()> {
        sqlx::query::<Sqlite>(
            "INSERT INTO sync_states (source_id, cursor, last_sync) VALUES (?, ?, ?)
             ON CONFLICT(source_id) DO UPDATE SET cursor = excluded.cursor, last_sync = excluded.last_sync",
        )
        .bind(state.source_id.as_str())
        .bind(&state.cursor)
        .bind(state.last_sync.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, source_id: SourceId) -> Result<()> {
        sqlx::query::<Sqlite>("DELETE FROM sync_states WHERE source_id = ?")
            .bind(source_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::repositories::{SourceRepository, SqliteSourceRepository};
    use crate::Source;

    async fn seed_source(pool: &SqlitePool) -> SourceId {
        let repo = SqliteSourceRepository::new(pool.clone());
        let source = Source::new("filesystem", "docs");
        repo.create(&source).await.unwrap();
        source.id
    }

    #[tokio::test]
    async fn missing_state_returns_none() {
        let pool = create_test_pool().await.unwrap();
        let source_id = seed_source(&pool).await;
        let repo = SqliteSyncStateRepository::new(pool);
        assert!(repo.get(source_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_source() {
        let pool = create_test_pool().await.unwrap();
        let source_id = seed_source(&pool).await;
        let repo = SqliteSyncStateRepository::new(pool);

        let state = SyncState {
            source_id,
            cursor: "cursor-1".to_string(),
            last_sync: Utc::now(),
        };
        repo.upsert(&state).await.unwrap();

        let updated = SyncState {
            cursor: "cursor-2".to_string(),
            ..state
        };
        repo.upsert(&updated).await.unwrap();

        let fetched = repo.get(source_id).await.unwrap().unwrap();
        assert_eq!(fetched.cursor, "cursor-2");
    }
}
