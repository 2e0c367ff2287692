//! # Settings service (§4.8)
//!
//! Thin policy layer over `SettingsRepository`: dedicated setters enforce
//! the mode/provider cross-checks and auto-actions spec.md calls out,
//! instead of leaving every caller to remember them before calling
//! `save()` directly. Grounded on `search-sync::orchestrator`'s own
//! "validate, then mutate, then persist, then emit" shape.

use std::sync::Arc;

use tracing::instrument;

use search_runtime::events::{CoreEvent, EventBus, SettingsEvent};
use search_store::repositories::SettingsRepository;
use search_store::{AppSettings, EmbeddingSettings, LlmSettings, SearchMode};
use search_traits::{EmbeddingService, LlmService};

use crate::error::{Result, SettingsError};
use crate::models::{known_embedding_dimensions, ProviderKind};

pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
    events: Arc<EventBus>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>, events: Arc<EventBus>) -> Self {
        Self { repo, events }
    }

    pub async fn get(&self) -> Result<AppSettings> {
        Ok(self.repo.get().await?)
    }

    /// Cross-checks the mode against configured providers (§4.8): a mode
    /// that `requires_embedding`/`requires_llm` needs the matching
    /// provider name set, regardless of how the caller got here.
    pub fn validate(&self, settings: &AppSettings) -> Result<()> {
        if settings.search_mode.requires_embedding() && settings.embedding.provider.is_none() {
            return Err(SettingsError::MissingProvider {
                mode: settings.search_mode.as_str(),
                requirement: "an embedding provider",
            });
        }
        if settings.search_mode.requires_llm() && settings.llm.provider.is_none() {
            return Err(SettingsError::MissingProvider {
                mode: settings.search_mode.as_str(),
                requirement: "an LLM provider",
            });
        }
        Ok(())
    }

    /// Pings whichever live services the current settings require,
    /// surfacing connectivity problems before a search ever runs.
    pub async fn validate_live(
        &self,
        settings: &AppSettings,
        embedding: Option<&(dyn EmbeddingService)>,
        llm: Option<&(dyn LlmService)>,
    ) -> Result<()> {
        if settings.search_mode.requires_embedding() {
            let service = embedding
                .ok_or_else(|| SettingsError::LiveValidationFailed("no embedding service configured".into()))?;
            service.ping().await.map_err(|e| SettingsError::LiveValidationFailed(e.to_string()))?;
        }
        if settings.search_mode.requires_llm() {
            let service = llm
                .ok_or_else(|| SettingsError::LiveValidationFailed("no LLM service configured".into()))?;
            service.ping().await.map_err(|e| SettingsError::LiveValidationFailed(e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(skip(self, settings))]
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        self.validate(settings)?;
        self.repo.save(settings).await?;
        Ok(())
    }

    /// Setting mode to Hybrid or Full auto-enables the vector index
    /// (§4.8 invariant).
    #[instrument(skip(self))]
    pub async fn set_mode(&self, mode: SearchMode) -> Result<AppSettings> {
        let mut settings = self.repo.get().await?;
        settings.search_mode = mode;
        if matches!(mode, SearchMode::Hybrid | SearchMode::Full) {
            settings.vector_index.enabled = true;
        }
        self.validate(&settings)?;
        self.repo.save(&settings).await?;
        self.events
            .emit(CoreEvent::Settings(SettingsEvent::ModeChanged { mode: mode.as_str().to_string() }))
            .ok();
        Ok(settings)
    }

    /// Updates the embedding provider. Known models update
    /// `vector_index.dimensions` automatically; switching provider kind
    /// resets base-URL semantics: local providers must supply one, cloud
    /// providers never keep one (§4.8).
    #[instrument(skip(self, api_key))]
    pub async fn set_embedding_provider(
        &self,
        provider: impl Into<String>,
        model: impl Into<String>,
        kind: ProviderKind,
        base_url: Option<String>,
        api_key: Option<String>,
    ) -> Result<AppSettings> {
        let provider = provider.into();
        let model = model.into();

        let base_url = match kind {
            ProviderKind::Local => {
                let base_url = base_url
                    .ok_or_else(|| SettingsError::LocalProviderRequiresBaseUrl(provider.clone()))?;
                Some(base_url)
            }
            ProviderKind::Cloud => None,
        };

        let mut settings = self.repo.get().await?;
        let dimensions = known_embedding_dimensions(&model);
        if let Some(dimensions) = dimensions {
            settings.vector_index.dimensions = dimensions;
        }
        settings.embedding = EmbeddingSettings {
            provider: Some(provider.clone()),
            model: Some(model),
            base_url,
            api_key,
        };
        self.validate(&settings)?;
        self.repo.save(&settings).await?;
        self.events
            .emit(CoreEvent::Settings(SettingsEvent::EmbeddingProviderChanged { provider, dimensions }))
            .ok();
        Ok(settings)
    }

    /// Updates the LLM provider. Same base-URL reset rule as the
    /// embedding setter, no dimensions to track.
    #[instrument(skip(self, api_key))]
    pub async fn set_llm_provider(
        &self,
        provider: impl Into<String>,
        model: impl Into<String>,
        kind: ProviderKind,
        base_url: Option<String>,
        api_key: Option<String>,
    ) -> Result<AppSettings> {
        let provider = provider.into();

        let base_url = match kind {
            ProviderKind::Local => {
                let base_url = base_url
                    .ok_or_else(|| SettingsError::LocalProviderRequiresBaseUrl(provider.clone()))?;
                Some(base_url)
            }
            ProviderKind::Cloud => None,
        };

        let mut settings = self.repo.get().await?;
        settings.llm = LlmSettings {
            provider: Some(provider),
            model: Some(model.into()),
            base_url,
            api_key,
        };
        self.validate(&settings)?;
        self.repo.save(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use search_store::db::create_test_pool;
    use search_store::repositories::SqliteSettingsRepository;
    use search_traits::Result as TraitResult;

    async fn service() -> SettingsService {
        let pool = create_test_pool().await.unwrap();
        let repo = Arc::new(SqliteSettingsRepository::new(pool));
        SettingsService::new(repo, Arc::new(EventBus::new(16)))
    }

    #[tokio::test]
    async fn setting_hybrid_mode_without_an_embedding_provider_is_rejected() {
        let service = service().await;
        let err = service.set_mode(SearchMode::Hybrid).await.unwrap_err();
        assert!(matches!(err, SettingsError::MissingProvider { .. }));
    }

    #[tokio::test]
    async fn setting_embedding_provider_then_hybrid_mode_auto_enables_vector_index() {
        let service = service().await;
        service
            .set_embedding_provider("local", "nomic-embed-text", ProviderKind::Local, Some("http://localhost:11434".into()), None)
            .await
            .unwrap();
        let settings = service.set_mode(SearchMode::Hybrid).await.unwrap();
        assert!(settings.vector_index.enabled);
        assert_eq!(settings.vector_index.dimensions, 768);
    }

    #[tokio::test]
    async fn local_embedding_provider_without_base_url_is_rejected() {
        let service = service().await;
        let err = service
            .set_embedding_provider("local", "nomic-embed-text", ProviderKind::Local, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::LocalProviderRequiresBaseUrl(_)));
    }

    #[tokio::test]
    async fn cloud_provider_clears_any_supplied_base_url() {
        let service = service().await;
        let settings = service
            .set_embedding_provider(
                "openai",
                "text-embedding-3-small",
                ProviderKind::Cloud,
                Some("https://should-be-ignored.example".into()),
                Some("sk-test".into()),
            )
            .await
            .unwrap();
        assert!(settings.embedding.base_url.is_none());
        assert_eq!(settings.vector_index.dimensions, 1536);
    }

    struct FailingEmbeddingService;

    #[async_trait]
    impl EmbeddingService for FailingEmbeddingService {
        async fn embed(&self, _text: &str) -> TraitResult<Vec<f32>> {
            Ok(vec![0.0])
        }
        fn dimensions(&self) -> usize {
            1
        }
        fn model_name(&self) -> &str {
            "failing"
        }
        async fn ping(&self) -> TraitResult<()> {
            Err(search_traits::TraitError::new(search_traits::ErrorKind::EmbeddingUnavailable, "down"))
        }
    }

    #[tokio::test]
    async fn live_validation_surfaces_a_failing_embedding_ping() {
        let service = service().await;
        let mut settings = AppSettings::default();
        settings.search_mode = SearchMode::Hybrid;
        settings.embedding.provider = Some("local".to_string());

        let embedding = FailingEmbeddingService;
        let err = service
            .validate_live(&settings, Some(&embedding), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::LiveValidationFailed(_)));
    }
}
