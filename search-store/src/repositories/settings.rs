//! Repository for the singleton `AppSettings` row (spec §3, §4.8).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};

use crate::models::{
    AppSettings, AppSettingsRow, EmbeddingSettings, LlmSettings, SearchMode, VectorIndexSettings,
};
use crate::Result;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Returns the persisted settings, or `AppSettings::default()` if the
    /// singleton row has never been written.
    async fn get(&self) -> Result<AppSettings>;
    async fn save(&self, settings: &AppSettings) -> Result<()>;
}

pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_settings(row: AppSettingsRow) -> AppSettings {
    AppSettings {
        search_mode: SearchMode::from_str(&row.search_mode).unwrap_or(SearchMode::TextOnly),
        embedding: EmbeddingSettings {
            provider: row.embedding_provider,
            model: row.embedding_model,
            base_url: row.embedding_base_url,
            api_key: row.embedding_api_key,
        },
        llm: LlmSettings {
            provider: row.llm_provider,
            model: row.llm_model,
            base_url: row.llm_base_url,
            api_key: row.llm_api_key,
        },
        vector_index: VectorIndexSettings {
            enabled: row.vector_index_enabled != 0,
            dimensions: row.vector_index_dimensions as u32,
        },
        updated_at: DateTime::from_timestamp_millis(row.updated_at).unwrap_or_default(),
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepository {
    async fn get(&self) -> Result<AppSettings> {
        let row = sqlx::query_as::<_, AppSettingsRow>("SELECT * FROM app_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(row_to_settings).unwrap_or_default())
    }

    async fn save(&self, settings: &AppSettings) -> Result<()> {
        sqlx::query::<Sqlite>(
            "INSERT INTO app_settings (
                 id, search_mode,
                 embedding_provider, embedding_model, embedding_base_url, embedding_api_key,
                 llm_provider, llm_model, llm_base_url, llm_api_key,
                 vector_index_enabled, vector_index_dimensions, updated_at
             ) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                 search_mode = excluded.search_mode,
                 embedding_provider = excluded.embedding_provider,
                 embedding_model = excluded.embedding_model,
                 embedding_base_url = excluded.embedding_base_url,
                 embedding_api_key = excluded.embedding_api_key,
                 llm_provider = excluded.llm_provider,
                 llm_model = excluded.llm_model,
                 llm_base_url = excluded.llm_base_url,
                 llm_api_key = excluded.llm_api_key,
                 vector_index_enabled = excluded.vector_index_enabled,
                 vector_index_dimensions = excluded.vector_index_dimensions,
                 updated_at = excluded.updated_at",
        )
        .bind(settings.search_mode.as_str())
        .bind(&settings.embedding.provider)
        .bind(&settings.embedding.model)
        .bind(&settings.embedding.base_url)
        .bind(&settings.embedding.api_key)
        .bind(&settings.llm.provider)
        .bind(&settings.llm.model)
        .bind(&settings.llm.base_url)
        .bind(&settings.llm.api_key)
        .bind(settings.vector_index.enabled as i64)
        .bind(settings.vector_index.dimensions as i64)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn missing_row_yields_default_settings() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSettingsRepository::new(pool);
        let settings = repo.get().await.unwrap();
        assert_eq!(settings.search_mode, SearchMode::TextOnly);
        assert!(!settings.vector_index.enabled);
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSettingsRepository::new(pool);

        let mut settings = AppSettings::default();
        settings.search_mode = SearchMode::Hybrid;
        settings.vector_index = VectorIndexSettings { enabled: true, dimensions: 384 };
        settings.embedding.provider = Some("local".to_string());
        repo.save(&settings).await.unwrap();

        let fetched = repo.get().await.unwrap();
        assert_eq!(fetched.search_mode, SearchMode::Hybrid);
        assert_eq!(fetched.vector_index.dimensions, 384);
        assert_eq!(fetched.embedding.provider.as_deref(), Some("local"));
    }

    #[tokio::test]
    async fn save_twice_overwrites_the_singleton_row() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqliteSettingsRepository::new(pool);

        repo.save(&AppSettings::default()).await.unwrap();
        let mut second = AppSettings::default();
        second.search_mode = SearchMode::Full;
        repo.save(&second).await.unwrap();

        let fetched = repo.get().await.unwrap();
        assert_eq!(fetched.search_mode, SearchMode::Full);
    }
}
