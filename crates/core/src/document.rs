//! Source documents loaded at startup.

use serde::{Deserialize, Serialize};

/// A policy document read from the documents folder.
///
/// Created once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// `doc_{n}`, where `n` is the position in load order
    pub id: String,

    /// Full file contents
    pub text: String,

    /// File name the text came from (e.g. "aml_policy.txt")
    pub source: String,
}

impl Document {
    pub fn new(index: usize, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: format!("doc_{index}"),
            text: text.into(),
            source: source.into(),
        }
    }
}

/// A document returned by a similarity search, with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub document: Document,

    /// Cosine similarity to the query, in [-1, 1]
    pub similarity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_follows_load_index() {
        let doc = Document::new(3, "medicaid_rules.txt", "Income limits...");
        assert_eq!(doc.id, "doc_3");
        assert_eq!(doc.source, "medicaid_rules.txt");
    }
}
