//! # Embedding and LLM service ports (§6)
//!
//! Neither trait ships a concrete provider — that's an explicit non-goal.
//! `search-query`'s test module provides deterministic null implementations
//! to exercise mode-degradation paths without a network dependency.

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;

    /// Checks reachability; used by settings' live-validation hooks (§4.8).
    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait LlmService: Send + Sync {
    /// Rewrites a user query for better retrieval. Callers fall back to the
    /// original query on error (§4.4, §7).
    async fn rewrite_query(&self, query: &str) -> Result<String>;

    async fn summarise(&self, text: &str) -> Result<String>;

    async fn generate(&self, prompt: &str) -> Result<String>;

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Checks reachability; used by settings' live-validation hooks (§4.8).
    /// Defaults to a trivial `generate` call so providers that front a
    /// single completion endpoint don't need a dedicated health check.
    async fn ping(&self) -> Result<()> {
        self.generate("ping").await.map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}
