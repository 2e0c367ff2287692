//! Repository for `Document` (spec §3). `(source_id, uri)` is unique;
//! `upsert_by_uri` is what the sync pipeline calls so that re-syncing the
//! same `(source_id, uri)` reuses the stable `DocumentId` instead of
//! creating a duplicate (spec §8 idempotence property).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{Sqlite, SqlitePool};
use std::collections::HashMap;

use search_traits::{DocumentId, SourceId};

use crate::error::StoreError;
use crate::models::{Document, DocumentRow};
use crate::Result;

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts a new document, or updates the existing one for the same
    /// `(source_id, uri)` in place, preserving its `id`. Returns the
    /// persisted document (with its stable id).
    async fn upsert_by_uri(
        &self,
        source_id: SourceId,
        uri: &str,
        title: &str,
        content: &str,
        metadata: HashMap<String, JsonValue>,
    ) -> Result<Document>;

    async fn get(&self, id: DocumentId) -> Result<Document>;
    async fn find_by_uri(&self, source_id: SourceId, uri: &str) -> Result<Option<Document>>;
    async fn list_by_source(&self, source_id: SourceId) -> Result<Vec<Document>>;
    async fn delete(&self, id: DocumentId) -> Result<()>;
}

pub struct SqliteDocumentRepository {
    pool: SqlitePool,
}

impl SqliteDocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_document(row: DocumentRow) -> Result<Document> {
    Ok(Document {
        id: DocumentId::from_string(&row.id).map_err(|e| StoreError::InvalidInput {
            field: "id".to_string(),
            message: e.to_string(),
        })?,
        source_id: SourceId::from_string(&row.source_id).map_err(|e| StoreError::InvalidInput {
            field: "source_id".to_string(),
            message: e.to_string(),
        })?,
        uri: row.uri,
        title: row.title,
        content: row.content,
        metadata: serde_json::from_str(&row.metadata).map_err(|e| StoreError::Other(e.to_string()))?,
        created_at: DateTime::from_timestamp_millis(row.created_at).unwrap_or_default(),
        updated_at: DateTime::from_timestamp_millis(row.updated_at).unwrap_or_default(),
    })
}

#[async_trait]
impl DocumentRepository for SqliteDocumentRepository {
    async fn upsert_by_uri(
        &self,
        source_id: SourceId,
        uri: &str,
        title: &str,
        content: &str,
        metadata: HashMap<String, JsonValue>,
    ) -> Result<Document> {
        let metadata_json = serde_json::to_string(&metadata).map_err(|e| StoreError::Other(e.to_string()))?;
        let now = Utc::now();

        if let Some(existing) = self.find_by_uri(source_id, uri).await? {
            sqlx::query::<Sqlite>(
                "UPDATE documents SET title = ?, content = ?, metadata = ?, updated_at = ? WHERE id = ?",
            )
            .bind(title)
            .bind(content)
            .bind(&metadata_json)
            .bind(now.timestamp_millis())
            .bind(existing.id.as_str())
            .execute(&self.pool)
            .await?;

            return Ok(Document {
                title: title.to_string(),
                content: content.to_string(),
                metadata,
                updated_at: now,
                ..existing
            });
        }

        let id = DocumentId::new();
        sqlx::query::<Sqlite>(
            "INSERT INTO documents (id, source_id, uri, title, content, metadata, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(source_id.as_str())
        .bind(uri)
        .bind(title)
        .bind(content)
        .bind(&metadata_json)
        .bind(now.timestamp_millis())
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(Document {
            id,
            source_id,
            uri: uri.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            metadata,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get(&self, id: DocumentId) -> Result<Document> {
        let row = sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Document", id.as_str()))?;
        row_to_document(row)
    }

    async fn find_by_uri(&self, source_id: SourceId, uri: &str) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents WHERE source_id = ? AND uri = ?",
        )
        .bind(source_id.as_str())
        .bind(uri)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_document).transpose()
    }

    async fn list_by_source(&self, source_id: SourceId) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents WHERE source_id = ? ORDER BY uri ASC",
        )
        .bind(source_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_document).collect()
    }

    async fn delete(&self, id: DocumentId) -> Result<()> {
        // ON DELETE CASCADE on chunks.document_id takes care of chunk rows;
        // the caller (orchestrator/search service) is still responsible for
        // deleting the corresponding index entries, since those live
        // outside this store entirely.
        let result = sqlx::query::<Sqlite>("DELETE FROM documents WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Document", id.as_str()));
        }
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
    async fn upsert_by_uri_reuses_id_on_second_call() {
        let pool = create_test_pool().await.unwrap();
        let source_id = seed_source(&pool).await;
        let repo = SqliteDocumentRepository::new(pool);

        let first = repo
            .upsert_by_uri(source_id, "file:///a.txt", "a", "hello", HashMap::new())
            .await
            .unwrap();
        let second = repo
            .upsert_by_uri(source_id, "file:///a.txt", "a", "hello world", HashMap::new())
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.content, "hello world");
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn list_by_source_is_scoped_and_ordered() {
        let pool = create_test_pool().await.unwrap();
        let source_id = seed_source(&pool).await;
        let repo = SqliteDocumentRepository::new(pool);

        repo.upsert_by_uri(source_id, "file:///b.md", "b", "# title", HashMap::new())
            .await
            .unwrap();
        repo.upsert_by_uri(source_id, "file:///a.txt", "a", "hello", HashMap::new())
            .await
            .unwrap();

        let docs = repo.list_by_source(source_id).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].uri, "file:///a.txt");
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let pool = create_test_pool().await.unwrap();
        let source_id = seed_source(&pool).await;
        let repo = SqliteDocumentRepository::new(pool);

        let doc = repo
            .upsert_by_uri(source_id, "file:///a.txt", "a", "hello", HashMap::new())
            .await
            .unwrap();
        repo.delete(doc.id).await.unwrap();

        let err = repo.get(doc.id).await.unwrap_err();
        assert_eq!(err.kind(), search_traits::ErrorKind::NotFound);
        assert!(repo.list_by_source(source_id).await.unwrap().is_empty());
    }
}
