pub mod config;
pub mod embedding;
pub mod llm;
pub mod loader;
pub mod vector_store;

pub use config::{AppConfig, Config, PromptsConfig};
pub use embedding::TextEmbedding;
pub use llm::{build_llm, AnthropicLlm, OpenAiLlm};
pub use loader::FileDocumentLoader;
pub use vector_store::{build_vector_store, InMemoryVectorStore, QdrantVectorStore};
