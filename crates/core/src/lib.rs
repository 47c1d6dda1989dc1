//! # PolicyDesk Core
//!
//! Domain types, traits, and error definitions for the PolicyDesk RAG
//! assistant. This crate has no I/O of its own; it defines the model that
//! the other crates implement against.
//!
//! Every external collaborator (LLM backend, embedding model, agent tool) is
//! a trait here, so the orchestrator can be exercised with scripted stand-ins.

pub mod document;
pub mod domain;
pub mod embedding;
pub mod error;
pub mod history;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use document::{Document, RetrievedDocument};
pub use domain::Domain;
pub use embedding::Embedder;
pub use error::{Error, Result};
pub use history::{ConversationHistory, Turn};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
