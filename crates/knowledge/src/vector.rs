//! In-memory vector index with cosine-similarity search.

use policydesk_core::document::{Document, RetrievedDocument};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1]. Returns 0.0 if the lengths differ, either
/// vector is empty, or either has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (x, y)| {
            let (x, y) = (*x as f64, *y as f64);
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Documents paired with their embeddings, kept in insertion order.
#[derive(Debug, Default)]
pub struct VectorStore {
    entries: Vec<(Document, Vec<f32>)>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, document: Document, embedding: Vec<f32>) {
        self.entries.push((document, embedding));
    }

    /// Return up to `top_k` documents by descending similarity.
    ///
    /// Entries scoring below `min_similarity` (when set) are skipped. Equal
    /// scores keep insertion order.
    pub fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        min_similarity: Option<f32>,
    ) -> Vec<RetrievedDocument> {
        if top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (_, emb))| (i, cosine_similarity(emb, query_embedding)))
            .filter(|(_, sim)| min_similarity.is_none_or(|min| *sim >= min))
            .collect();

        // sort_by is stable, so ties stay in insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(i, similarity)| RetrievedDocument {
                document: self.entries[i].0.clone(),
                similarity,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
