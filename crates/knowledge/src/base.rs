//! Knowledge base: the embedded documents and single-best-match retrieval.

use crate::vector::VectorStore;
use policydesk_core::document::{Document, RetrievedDocument};
use policydesk_core::embedding::Embedder;
use policydesk_core::error::KnowledgeError;
use std::sync::Arc;
use tracing::{debug, info};

/// Documents embedded once at startup, queried for each user question.
pub struct KnowledgeBase {
    store: VectorStore,
    embedder: Arc<dyn Embedder>,
    min_similarity: Option<f32>,
}

impl KnowledgeBase {
    /// Embed all `documents` in one batch and index them.
    pub async fn build(
        documents: Vec<Document>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, KnowledgeError> {
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;

        if embeddings.len() != documents.len() {
            return Err(KnowledgeError::EmbeddingFailed(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }

        let mut store = VectorStore::new();
        for (document, embedding) in documents.into_iter().zip(embeddings) {
            store.add(document, embedding);
        }

        info!(documents = store.len(), embedder = embedder.name(), "Knowledge base ready");
        Ok(Self {
            store,
            embedder,
            min_similarity: None,
        })
    }

    /// Drop matches scoring below `min_similarity`.
    pub fn with_min_similarity(mut self, min_similarity: Option<f32>) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// Return the single most similar document, if any.
    pub async fn retrieve(&self, query: &str) -> Result<Option<RetrievedDocument>, KnowledgeError> {
        let query_embedding = self.embedder.embed_one(query).await?;
        let hit = self
            .store
            .search(&query_embedding, 1, self.min_similarity)
            .into_iter()
            .next();

        match &hit {
            Some(h) => debug!(source = %h.document.source, similarity = h.similarity, "Retrieved"),
            None => debug!("No document matched"),
        }
        Ok(hit)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
