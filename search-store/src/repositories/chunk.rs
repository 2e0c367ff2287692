//! Repository for `Chunk` (spec §3). Chunks belong to exactly one
//! document and are ordered by `position`; `replace_for_document` is the
//! operation the per-document pipeline actually uses (§4.3 step 5): it
//! atomically swaps a document's whole chunk set, since re-chunking always
//! regenerates every chunk rather than diffing them.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool};

use search_traits::{ChunkId, DocumentId};

use crate::error::StoreError;
use crate::models::{decode_embedding, encode_embedding, Chunk, ChunkRow};
use crate::Result;

#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Replaces every chunk belonging to `document_id` with `chunks`, in one
    /// transaction. Chunk ids and positions are taken as given by the
    /// caller (deterministic id derivation happens in the pipeline crate).
    async fn replace_for_document(&self, document_id: DocumentId, chunks: Vec<Chunk>) -> Result<()>;

    async fn get(&self, id: ChunkId) -> Result<Chunk>;
    async fn list_by_document(&self, document_id: DocumentId) -> Result<Vec<Chunk>>;
    async fn delete_by_document(&self, document_id: DocumentId) -> Result<Vec<ChunkId>>;
}

pub struct SqliteChunkRepository {
    pool: SqlitePool,
}

impl SqliteChunkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_chunk(row: ChunkRow) -> Result<Chunk> {
    Ok(Chunk {
        id: ChunkId::from_string(&row.id).map_err(|e| StoreError::InvalidInput {
            field: "id".to_string(),
            message: e.to_string(),
        })?,
        document_id: DocumentId::from_string(&row.document_id).map_err(|e| StoreError::InvalidInput {
            field: "document_id".to_string(),
            message: e.to_string(),
        })?,
        content: row.content,
        position: row.position as u32,
        embedding: row.embedding.as_deref().map(decode_embedding),
    })
}

#[async_trait]
impl ChunkRepository for SqliteChunkRepository {
    async fn replace_for_document(&self, document_id: DocumentId, chunks: Vec<Chunk>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query::<Sqlite>("DELETE FROM chunks WHERE document_id = ?")
            .bind(document_id.as_str())
            .execute(&mut *tx)
            .await?;

        for chunk in &chunks {
            let embedding = chunk.embedding.as_deref().map(encode_embedding);
            sqlx::query::<Sqlite>(
                "INSERT INTO chunks (id, document_id, content, position, embedding) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(chunk.id.as_str())
            .bind(document_id.as_str())
            .bind(&chunk.content)
            .bind(chunk.position as i64)
            .bind(embedding)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: ChunkId) -> Result<Chunk> {
        let row = sqlx::query_as::<_, ChunkRow>("SELECT * FROM chunks WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Chunk", id.as_str()))?;
        row_to_chunk(row)
    }

    async fn list_by_document(&self, document_id: DocumentId) -> Result<Vec<Chunk>> {
        let rows = sqlx::query_as::<_, ChunkRow>(
            "SELECT * FROM chunks WHERE document_id = ? ORDER BY position ASC",
        )
        .bind(document_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_chunk).collect()
    }

    async fn delete_by_document(&self, document_id: DocumentId) -> Result<Vec<ChunkId>> {
        let ids = self
            .list_by_document(document_id)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        sqlx::query::<Sqlite>("DELETE FROM chunks WHERE document_id = ?")
            .bind(document_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::repositories::{
        DocumentRepository, SourceRepository, SqliteDocumentRepository, SqliteSourceRepository,
    };
    use crate::Source;
    use std::collections::HashMap;

    async fn seed_document(pool: &SqlitePool) -> DocumentId {
        let sources = SqliteSourceRepository::new(pool.clone());
        let source = Source::new("filesystem", "docs");
        sources.create(&source).await.unwrap();
        let documents = SqliteDocumentRepository::new(pool.clone());
        documents
            .upsert_by_uri(source.id, "file:///a.txt", "a", "hello world", HashMap::new())
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn replace_for_document_is_ordered_by_position() {
        let pool = create_test_pool().await.unwrap();
        let document_id = seed_document(&pool).await;
        let repo = SqliteChunkRepository::new(pool);

        let chunks = vec![
            Chunk {
                id: ChunkId::new(),
                document_id,
                content: "second".to_string(),
                position: 1,
                embedding: None,
            },
            Chunk {
                id: ChunkId::new(),
                document_id,
                content: "first".to_string(),
                position: 0,
                embedding: Some(vec![0.1, 0.2]),
            },
        ];
        repo.replace_for_document(document_id, chunks).await.unwrap();

        let fetched = repo.list_by_document(document_id).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].content, "first");
        assert_eq!(fetched[0].embedding, Some(vec![0.1, 0.2]));
        assert_eq!(fetched[1].content, "second");
    }

    #[tokio::test]
    async fn replace_for_document_drops_previous_chunks() {
        let pool = create_test_pool().await.unwrap();
        let document_id = seed_document(&pool).await;
        let repo = SqliteChunkRepository::new(pool);

        repo.replace_for_document(
            document_id,
            vec![Chunk {
                id: ChunkId::new(),
                document_id,
                content: "v1".to_string(),
                position: 0,
                embedding: None,
            }],
        )
        .await
        .unwrap();

        repo.replace_for_document(
            document_id,
            vec![Chunk {
                id: ChunkId::new(),
                document_id,
                content: "v2".to_string(),
                position: 0,
                embedding: None,
            }],
        )
        .await
        .unwrap();

        let fetched = repo.list_by_document(document_id).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].content, "v2");
    }
}
