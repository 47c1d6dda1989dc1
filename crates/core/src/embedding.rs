//! Embedder trait: turns text into vectors for similarity search.

use async_trait::async_trait;
use crate::error::KnowledgeError;

/// Implementations: a provider-backed embedder (remote `/embeddings`
/// endpoint) and a local hashing embedder.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A short name for logs (e.g., "hashing", "openai:text-embedding-3-small").
    fn name(&self) -> &str;

    /// Embed a batch of texts. Returns one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, KnowledgeError>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> std::result::Result<Vec<f32>, KnowledgeError> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| KnowledgeError::EmbeddingFailed("embedder returned no vectors".into()))
    }
}
