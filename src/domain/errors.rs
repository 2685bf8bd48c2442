use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Document load error: {0}")]
    DocumentLoad(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    pub fn document_load(msg: impl Into<String>) -> Self {
        Self::DocumentLoad(msg.into())
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn vector_store(msg: impl Into<String>) -> Self {
        Self::VectorStore(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable snake_case name of the variant, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DocumentLoad(_) => "document_load",
            Self::Embedding(_) => "embedding",
            Self::VectorStore(_) => "vector_store",
            Self::Generation(_) => "generation",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
