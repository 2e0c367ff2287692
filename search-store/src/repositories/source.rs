//! Repository for `Source` (spec §3).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use std::collections::HashMap;

use search_traits::{CredentialsId, SourceId};

use crate::error::StoreError;
use crate::models::{Source, SourceRow};
use crate::Result;

#[async_trait]
pub trait SourceRepository: Send + Sync {
    async fn create(&self, source: &Source) -> Result<()>;
    async fn get(&self, id: SourceId) -> Result<Source>;
    async fn list(&self) -> Result<Vec<Source>>;
    async fn update(&self, source: &Source) -> Result<()>;
    async fn delete(&self, id: SourceId) -> Result<()>;
}

pub struct SqliteSourceRepository {
    pool: SqlitePool,
}

impl SqliteSourceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_source(row: SourceRow) -> Result<Source> {
    Ok(Source {
        id: SourceId::from_string(&row.id).map_err(|e| StoreError::InvalidInput {
            field: "id".to_string(),
            message: e.to_string(),
        })?,
        source_type: row.source_type,
        name: row.name,
        config: serde_json::from_str::<HashMap<String, String>>(&row.config)
            .map_err(|e| StoreError::Other(e.to_string()))?,
        auth_provider_id: row.auth_provider_id,
        credentials_id: row
            .credentials_id
            .map(|s| {
                CredentialsId::from_string(&s).map_err(|e| StoreError::InvalidInput {
                    field: "credentials_id".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?,
        created_at: DateTime::from_timestamp_millis(row.created_at).unwrap_or_default(),
        updated_at: DateTime::from_timestamp_millis(row.updated_at).unwrap_or_default(),
    })
}

#[async_trait]
impl SourceRepository for SqliteSourceRepository {
    async fn create(&self, source: &Source) -> Result<()> {
        let config = serde_json::to_string(&source.config).map_err(|e| StoreError::Other(e.to_string()))?;
        sqlx::query::<Sqlite>(
            "INSERT INTO sources (id, source_type, name, config, auth_provider_id, credentials_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(source.id.as_str())
        .bind(&source.source_type)
        .bind(&source.name)
        .bind(config)
        .bind(&source.auth_provider_id)
        .bind(source.credentials_id.map(|c| c.as_str()))
        .bind(source.created_at.timestamp_millis())
        .bind(source.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: SourceId) -> Result<Source> {
        let row = sqlx::query_as::<_, SourceRow>("SELECT * FROM sources WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Source", id.as_str()))?;
        row_to_source(row)
    }

    async fn list(&self) -> Result<Vec<Source>> {
        let rows = sqlx::query_as::<_, SourceRow>("SELECT * FROM sources ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_source).collect()
    }

    async fn update(&self, source: &Source) -> Result<()> {
        let config = serde_json::to_string(&source.config).map_err(|e| StoreError::Other(e.to_string()))?;
        let result = sqlx::query::<Sqlite>(
            "UPDATE sources SET source_type = ?, name = ?, config = ?, auth_provider_id = ?, credentials_id = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&source.source_type)
        .bind(&source.name)
        .bind(config)
        .bind(&source.auth_provider_id)
        .bind(source.credentials_id.map(|c| c.as_str()))
        .bind(Utc::now().timestamp_millis())
        .bind(source.id.as_str())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Source", source.id.as_str()));
        }
        Ok(())
    }

    async fn delete(&self, id: SourceId) -> Result<()> {
        let result = sqlx::query::<Sqlite>("DELETE FROM sources WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Source", id.as_str()));
        }
        Ok(())
    }
}
