//! Configuration loading, validation, and management for PolicyDesk.
//!
//! Loads configuration from `~/.policydesk/config.toml` (or an explicit path)
//! with environment variable overrides. Every field has a default, so a
//! missing file is not an error. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model used by the domain agents and the coordinator
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    #[serde(default)]
    pub documents: DocumentsConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub agents: AgentsConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    1024
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("documents", &self.documents)
            .field("embedding", &self.embedding)
            .field("routing", &self.routing)
            .field("agents", &self.agents)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Where the policy documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_documents_folder")]
    pub folder: PathBuf,

    /// Only files whose name ends with this suffix are loaded
    #[serde(default = "default_documents_extension")]
    pub extension: String,
}

fn default_documents_folder() -> PathBuf {
    PathBuf::from("./documents/")
}
fn default_documents_extension() -> String {
    ".txt".into()
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            folder: default_documents_folder(),
            extension: default_documents_extension(),
        }
    }
}

/// Which embedder backs the vector store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderKind {
    /// Local feature-hashing embedder, no network
    Hashing,
    /// The `/embeddings` endpoint of a configured provider
    Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedder_kind")]
    pub kind: EmbedderKind,

    /// Provider to call when `kind = "provider"` (defaults to `default_provider`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector width of the hashing embedder
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Nearest neighbors scoring below this are treated as no match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f32>,
}

fn default_embedder_kind() -> EmbedderKind {
    EmbedderKind::Hashing
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_dimensions() -> usize {
    512
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            kind: default_embedder_kind(),
            provider: None,
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            min_similarity: None,
        }
    }
}

/// Keyword lists for the fast-path domain classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_finance_keywords")]
    pub finance_keywords: Vec<String>,

    #[serde(default = "default_medicaid_keywords")]
    pub medicaid_keywords: Vec<String>,
}

fn default_finance_keywords() -> Vec<String> {
    ["aml", "kyc", "trade", "trading", "risk", "compliance", "sar", "margin"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_medicaid_keywords() -> Vec<String> {
    ["medicaid", "coverage", "benefit", "income", "eligibility", "prior authorization"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            finance_keywords: default_finance_keywords(),
            medicaid_keywords: default_medicaid_keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Maximum tool-call rounds per domain-agent answer
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,

    /// Temperature for the fallback classifier
    #[serde(default)]
    pub coordinator_temperature: f32,
}

fn default_max_tool_iterations() -> u32 {
    5
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
            coordinator_temperature: 0.0,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from `path`, or from `~/.policydesk/config.toml`
    /// when no path is given, then apply environment overrides:
    /// - `POLICYDESK_API_KEY`, `OPENROUTER_API_KEY`, `OPENAI_API_KEY` (first set wins)
    /// - `POLICYDESK_PROVIDER`, `POLICYDESK_MODEL`, `POLICYDESK_DOCUMENTS`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("POLICYDESK_API_KEY")
                .or_else(|| lookup("OPENROUTER_API_KEY"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("POLICYDESK_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("POLICYDESK_MODEL") {
            self.default_model = model;
        }

        if let Some(folder) = lookup("POLICYDESK_DOCUMENTS") {
            self.documents.folder = PathBuf::from(folder);
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs_home().join(".policydesk")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.agents.coordinator_temperature) {
            return Err(ConfigError::ValidationError(
                "agents.coordinator_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(ConfigError::ValidationError(
                "embedding.dimensions must be > 0".into(),
            ));
        }

        if let Some(min) = self.embedding.min_similarity {
            if !(-1.0..=1.0).contains(&min) {
                return Err(ConfigError::ValidationError(
                    "embedding.min_similarity must be between -1.0 and 1.0".into(),
                ));
            }
        }

        if self.routing.finance_keywords.iter().all(|k| k.trim().is_empty())
            || self.routing.medicaid_keywords.iter().all(|k| k.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "routing keyword lists must not be empty".into(),
            ));
        }

        if self.agents.max_tool_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agents.max_tool_iterations must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            documents: DocumentsConfig::default(),
            embedding: EmbeddingConfig::default(),
            routing: RoutingConfig::default(),
            agents: AgentsConfig::default(),
            providers: HashMap::new(),
        }
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
