mod document_loader;
mod embedding;
mod llm;
mod vector_store;

pub use document_loader::DocumentLoader;
pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub(crate) use vector_store::check_dimension;
pub use vector_store::VectorStore;
