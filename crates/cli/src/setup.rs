//! Startup wiring: provider, documents, embedder, knowledge base, assistant.

use std::sync::Arc;

use policydesk_agent::Assistant;
use policydesk_config::{AppConfig, EmbedderKind};
use policydesk_core::embedding::Embedder;
use policydesk_knowledge::{HashingEmbedder, KnowledgeBase, ProviderEmbedder, load_documents};
use policydesk_providers::ProviderRouter;
use tracing::{info, warn};

/// Build the assistant described by `config`.
///
/// Fails when the documents folder is missing or empty, when the embedding
/// provider is not configured, or when embedding the documents fails.
pub async fn build_assistant(config: &AppConfig) -> Result<Assistant, Box<dyn std::error::Error>> {
    let router = policydesk_providers::build_from_config(config);
    let provider = router.default().ok_or("No default provider configured")?;

    if config.api_key.is_none() && !config.providers.values().any(|p| p.api_key.is_some()) {
        warn!(
            "No API key configured. Set POLICYDESK_API_KEY, OPENROUTER_API_KEY or OPENAI_API_KEY, \
             or add api_key to {}",
            AppConfig::config_dir().join("config.toml").display()
        );
    }

    let documents = load_documents(&config.documents.folder, &config.documents.extension)?;
    let embedder = build_embedder(config, &router)?;
    let knowledge = KnowledgeBase::build(documents, embedder)
        .await?
        .with_min_similarity(config.embedding.min_similarity);

    info!(
        provider = %config.default_provider,
        model = %config.default_model,
        documents = knowledge.len(),
        "Assistant ready"
    );
    Ok(Assistant::from_config(config, provider, knowledge))
}

fn build_embedder(
    config: &AppConfig,
    router: &ProviderRouter,
) -> Result<Arc<dyn Embedder>, Box<dyn std::error::Error>> {
    match config.embedding.kind {
        EmbedderKind::Hashing => Ok(Arc::new(HashingEmbedder::new(config.embedding.dimensions))),
        EmbedderKind::Provider => {
            let name = config
                .embedding
                .provider
                .as_deref()
                .unwrap_or(&config.default_provider);
            let provider = router
                .get(name)
                .ok_or_else(|| format!("Embedding provider '{name}' is not configured"))?;
            Ok(Arc::new(ProviderEmbedder::new(provider, &config.embedding.model)))
        }
    }
}
