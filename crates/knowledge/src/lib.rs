//! Knowledge layer for PolicyDesk: the documents folder, the embedders, and
//! the in-memory vector index answering single-nearest-neighbor queries.

pub mod base;
pub mod embedding;
pub mod loader;
pub mod vector;

pub use base::KnowledgeBase;
pub use embedding::{HashingEmbedder, ProviderEmbedder};
pub use loader::load_documents;
pub use vector::{VectorStore, cosine_similarity};
