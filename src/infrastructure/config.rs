use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::application::AnswerPrompts;
use crate::domain::{ChunkingConfig, DistanceMetric, DomainError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
pub const DEFAULT_PROMPTS_PATH: &str = "config/prompts.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub chunking: ChunkingConfig,
    pub rag: RagConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreBackend {
    #[default]
    Qdrant,
    Memory,
}

impl FromStr for VectorStoreBackend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "qdrant" => Ok(Self::Qdrant),
            "memory" => Ok(Self::Memory),
            other => Err(DomainError::config(format!(
                "unknown vector store backend '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: VectorStoreBackend,
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub distance: DistanceMetric,
    pub timeout_seconds: u64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: VectorStoreBackend::Qdrant,
            url: "http://localhost:6334".to_string(),
            api_key: None,
            collection: "docs".to_string(),
            distance: DistanceMetric::Cosine,
            timeout_seconds: 30,
        }
    }
}

impl VectorStoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
    pub timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-large".to_string(),
            dimension: 3072,
            batch_size: 256,
            timeout_seconds: 60,
        }
    }
}

impl EmbeddingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Anthropic,
}

impl FromStr for LlmProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(DomainError::config(format!("unknown llm provider '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
    /// Delete every point of a source before re-ingesting it.
    pub replace_existing: bool,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            replace_existing: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub answer: AnswerPrompts,
}

impl AppConfig {
    /// Loads `RAG_CONFIG` / `RAG_PROMPTS` (or the default paths), then applies
    /// environment overrides and validates the result.
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("RAG_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let prompts_path =
            std::env::var("RAG_PROMPTS").unwrap_or_else(|_| DEFAULT_PROMPTS_PATH.into());

        let mut config = Self::from_files(Path::new(&config_path), Path::new(&prompts_path))?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Missing files fall back to built-in defaults; malformed files are errors.
    pub fn from_files(config_path: &Path, prompts_path: &Path) -> Result<Self> {
        let config = match read_optional(config_path)? {
            Some(yaml) => Self::parse_config(&yaml)?,
            None => {
                tracing::info!(path = %config_path.display(), "config file not found, using defaults");
                Config::default()
            }
        };
        let prompts = match read_optional(prompts_path)? {
            Some(yaml) => Self::parse_prompts(&yaml)?,
            None => PromptsConfig::default(),
        };

        Ok(Self { config, prompts })
    }

    pub fn parse_config(yaml: &str) -> Result<Config> {
        serde_yaml::from_str(yaml).map_err(|e| DomainError::config(format!("invalid config: {e}")))
    }

    pub fn parse_prompts(yaml: &str) -> Result<PromptsConfig> {
        serde_yaml::from_str(yaml)
            .map_err(|e| DomainError::config(format!("invalid prompts: {e}")))
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let cfg = &mut self.config;

        if let Some(host) = lookup("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            cfg.server.port = parse_env("SERVER_PORT", &port)?;
        }
        if let Some(backend) = lookup("VECTOR_STORE_BACKEND") {
            cfg.vector_store.backend = backend.parse()?;
        }
        if let Some(url) = lookup("QDRANT_URL") {
            cfg.vector_store.url = url;
        }
        if let Some(key) = lookup("QDRANT_API_KEY") {
            cfg.vector_store.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(collection) = lookup("QDRANT_COLLECTION") {
            cfg.vector_store.collection = collection;
        }
        if let Some(model) = lookup("EMBEDDING_MODEL") {
            cfg.embedding.model = model;
        }
        if let Some(dimension) = lookup("EMBEDDING_DIMENSION") {
            cfg.embedding.dimension = parse_env("EMBEDDING_DIMENSION", &dimension)?;
        }
        if let Some(provider) = lookup("LLM_PROVIDER") {
            cfg.llm.provider = provider.parse()?;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            cfg.llm.model = model;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let cfg = &self.config;

        if cfg.embedding.dimension == 0 {
            return Err(DomainError::config("embedding.dimension must be greater than zero"));
        }
        if cfg.embedding.batch_size == 0 {
            return Err(DomainError::config("embedding.batch_size must be greater than zero"));
        }
        if cfg.rag.top_k == 0 {
            return Err(DomainError::config("rag.top_k must be greater than zero"));
        }
        if cfg.vector_store.collection.is_empty() {
            return Err(DomainError::config("vector_store.collection must not be empty"));
        }
        for (name, secs) in [
            ("vector_store.timeout_seconds", cfg.vector_store.timeout_seconds),
            ("embedding.timeout_seconds", cfg.embedding.timeout_seconds),
            ("llm.timeout_seconds", cfg.llm.timeout_seconds),
        ] {
            if secs == 0 {
                return Err(DomainError::config(format!("{name} must be greater than zero")));
            }
        }
        cfg.chunking.validate()?;
        self.prompts.answer.validate()
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DomainError::config(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| DomainError::config(format!("{key} has invalid value '{value}'")))
}
