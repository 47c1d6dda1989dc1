//! Embedders for documents and queries.
//!
//! - [`HashingEmbedder`]: offline feature hashing, the default.
//! - [`ProviderEmbedder`]: calls a provider's `/embeddings` endpoint.

use async_trait::async_trait;
use policydesk_core::embedding::Embedder;
use policydesk_core::error::KnowledgeError;
use policydesk_core::provider::{EmbeddingRequest, Provider};
use std::sync::Arc;
use tracing::debug;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

/// Bag-of-words embedder using the hashing trick.
///
/// Text is lowercased and split on non-alphanumeric characters; each token
/// increments one of `dimensions` buckets chosen by its FNV-1a hash. The
/// result is L2-normalized. Deterministic and needs no network.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub const DEFAULT_DIMENSIONS: usize = 512;

    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();
        for token in lowered.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let bucket = (fnv1a(token) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// Embedder backed by an LLM provider's embeddings API.
pub struct ProviderEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
    label: String,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        let model = model.into();
        let label = format!("{}:{}", provider.name(), model);
        Self {
            provider,
            model,
            label,
        }
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    fn name(&self) -> &str {
        &self.label
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: self.model.clone(),
            inputs: texts.to_vec(),
        };
        let response = self
            .provider
            .embed(request)
            .await
            .map_err(|e| KnowledgeError::EmbeddingFailed(e.to_string()))?;

        if response.embeddings.len() != texts.len() {
            return Err(KnowledgeError::EmbeddingFailed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        debug!(embedder = %self.label, count = texts.len(), "Embedded batch");
        Ok(response.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::cosine_similarity;
    use policydesk_core::error::ProviderError;
    use policydesk_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};

    #[tokio::test]
    async fn hashing_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed_one("Suspicious Activity Report").await.unwrap();
        let b = embedder.embed_one("suspicious activity report!").await.unwrap();

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn hashing_prefers_shared_vocabulary() {
        let embedder = HashingEmbedder::default();
        let vectors = embedder
            .embed(&[
                "margin calls and trading risk controls".to_string(),
                "medicaid eligibility income thresholds".to_string(),
                "what are the margin risk controls".to_string(),
            ])
            .await
            .unwrap();

        let finance = cosine_similarity(&vectors[2], &vectors[0]);
        let medicaid = cosine_similarity(&vectors[2], &vectors[1]);
        assert!(finance > medicaid);
    }

    #[tokio::test]
    async fn hashing_empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(8).embed_one("   ").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    struct FixedEmbeddingProvider {
        vectors: Vec<Vec<f32>>,
    }

    #[async_trait]
    impl Provider for FixedEmbeddingProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("completion".into()))
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            Ok(EmbeddingResponse {
                embeddings: self.vectors.iter().take(request.inputs.len()).cloned().collect(),
                model: request.model,
                usage: None,
            })
        }
    }

    #[tokio::test]
    async fn provider_embedder_passes_vectors_through() {
        let provider = Arc::new(FixedEmbeddingProvider {
            vectors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        });
        let embedder = ProviderEmbedder::new(provider, "text-embedding-3-small");
        assert_eq!(embedder.name(), "fixed:text-embedding-3-small");

        let out = embedder
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(out, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn provider_embedder_rejects_short_batches() {
        let provider = Arc::new(FixedEmbeddingProvider {
            vectors: vec![vec![1.0]],
        });
        let embedder = ProviderEmbedder::new(provider, "m");
        let err = embedder
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, KnowledgeError::EmbeddingFailed(_)));
    }
}
